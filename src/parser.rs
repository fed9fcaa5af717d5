//! Parses the program file format: signed decimal integers separated by
//! commas or newlines, with optional surrounding whitespace. The same grammar
//! reads the phase-setting list given on the command line.

use nom::{
  branch::alt,
  bytes::complete::tag,
  character::complete::{char as one_char, digit1, line_ending, multispace0, space0},
  combinator::{map_res, opt, recognize},
  multi::separated_list1,
  sequence::{delimited, pair, preceded},
  IResult,
};

use crate::errors::{MachineError, Result};

fn integer(input: &str) -> IResult<&str, i64> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    str::parse
  )(input)
}

fn separator(input: &str) -> IResult<&str, &str> {
  preceded(space0, alt((tag(","), line_ending)))(input)
}

fn element(input: &str) -> IResult<&str, i64> {
  delimited(space0, integer, space0)(input)
}

/**
  Parses a whole program source into its cells. Anything left unconsumed
  beyond trailing whitespace means some token was not an integer, which is
  fatal before any machine runs.
*/
pub fn parse_program(text: &str) -> Result<Vec<i64>> {
  let parsed: IResult<&str, Vec<i64>> =
    preceded(multispace0, separated_list1(separator, element))(text);

  match parsed {
    Ok((rest, program)) if rest.trim().is_empty() => Ok(program),
    Ok((rest, _)) => Err(MachineError::Parse { token: offending_token(rest) }),
    Err(_)        => Err(MachineError::Parse { token: offending_token(text) })
  }
}

/// Extracts the first non-separator token of the unparsable remainder for
/// the error message.
fn offending_token(rest: &str) -> String {
  rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace())
      .split(|c: char| c == ',' || c.is_whitespace())
      .next()
      .unwrap_or("")
      .to_string()
}
