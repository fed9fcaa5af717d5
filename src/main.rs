//! An Intcode virtual machine: a stored program of signed integers that is
//! both code and data, executed by a resumable fetch-decode-execute engine,
//! together with an amplifier pipeline driver that wires several machines
//! into a feedback ring and searches every phase-setting permutation for the
//! best final signal.

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

mod errors;
mod instruction;
mod ivm;
mod memory;
mod parser;
mod permutations;
mod pipeline;

use std::io::{self, BufRead, Write};
use std::process::exit;

use crate::errors::{MachineError, Result};
use crate::ivm::{Status, IVM};

const USAGE: &str = "\
Usage: intcode <input-file> [phase-settings]

Runs the Intcode program in <input-file>. With no further arguments the
program runs interactively: every Input instruction prompts for one integer
on a line of its own and every Output instruction prints one line.

With a comma separated list of phase settings (e.g. 5,6,7,8,9), every
permutation of the settings is instead tried as an amplifier feedback ring,
and the winning phase order and its signal are printed.";

fn main() {
  env_logger::init();

  let arguments: Vec<String> = std::env::args().collect();
  if arguments.len() < 2 {
    eprintln!("{}", USAGE);
    exit(1);
  }

  if let Err(error) = run(&arguments) {
    eprintln!("Error: {}", error);
    exit(1);
  }
}

fn run(arguments: &[String]) -> Result<()> {
  let text    = std::fs::read_to_string(&arguments[1])?;
  let program = parser::parse_program(&text)?;

  match arguments.get(2) {
    None             => run_interactive(&program),
    Some(phase_text) => run_search(&program, phase_text)
  }
}

/// Drives a single machine, prompting on suspension and printing outputs as
/// they appear.
fn run_interactive(program: &[i64]) -> Result<()> {
  let mut machine = IVM::new(program);
  loop {
    let status = match machine.process() {

      Ok(status) => status,

      Err(error) => {
        // Dump the machine state alongside the fault.
        eprintln!("{}", machine);
        return Err(error);
      }

    };

    for value in machine.drain_output() {
      println!("{}", value);
    }

    match status {
      Status::Halted => return Ok(()),
      _              => machine.push_input(read_input_line()?)
    }
  }
}

fn read_input_line() -> Result<i64> {
  print!("Enter input:");
  io::stdout().flush()?;

  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let token = line.trim();
  token.parse::<i64>()
       .map_err(|_| MachineError::Parse { token: token.to_string() })
}

fn run_search(program: &[i64], phase_text: &str) -> Result<()> {
  let phases = parser::parse_program(phase_text)?;
  let result = pipeline::search_feedback(program, &phases)?;
  println!("{}", result);
  Ok(())
}
