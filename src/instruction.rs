/*!

  Instruction decoding.

  An instruction occupies one cell for its opcode plus one cell per parameter.
  The low two decimal digits of the opcode cell select the operation, and the
  next three digits give the addressing mode of each parameter, least
  significant digit first:

    [mode3][mode2][mode1][opcode: 2 digits]

  Since the discriminants below are the literal opcode values a program
  stores, the low digits of a cell convert directly to an `Opcode` variant,
  and a mode digit converts directly to a `ParameterMode` variant. A cell
  whose digits fit neither is a fault, never a silent default.

*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, IntoStaticStr};

use crate::errors::{MachineError, Result};

/**
  Opcodes of the virtual machine. The order the opcodes are listed below is
  not significant; the explicit discriminants are.
*/
#[derive(
  StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq, PartialEq,    Debug,         Hash
)]
#[repr(u8)]
pub enum Opcode {
  Add                = 1,   // dest = a + b
  Multiply           = 2,   // dest = a * b
  Input              = 3,   // dest = dequeue(input), or suspend
  Output             = 4,   // enqueue(output, a)
  JumpIfTrue         = 5,   // ip = b if a != 0
  JumpIfFalse        = 6,   // ip = b if a == 0
  LessThan           = 7,   // dest = 1 if a < b else 0
  Equals             = 8,   // dest = 1 if a == b else 0
  RelativeBaseOffset = 9,   // relative base += a

  Halt               = 99,
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Returns the number of parameter cells following the opcode cell.
  pub fn arity(&self) -> usize {
    match self {
      | Opcode::Add
      | Opcode::Multiply
      | Opcode::LessThan
      | Opcode::Equals             => 3,

      | Opcode::JumpIfTrue
      | Opcode::JumpIfFalse        => 2,

      | Opcode::Input
      | Opcode::Output
      | Opcode::RelativeBaseOffset => 1,

      Opcode::Halt                 => 0
    }
  }

  /// Returns the width of the whole instruction in cells, opcode included.
  pub fn width(&self) -> usize {
    1 + self.arity()
  }
}

/// Per-parameter addressing rule. The discriminants are the mode digits.
#[derive(
  StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq, PartialEq,    Debug,         Hash
)]
#[repr(u8)]
pub enum ParameterMode {
  /// The encoded value is an address; the parameter is the cell it names.
  Position  = 0,
  /// The encoded value is the parameter itself.
  Immediate = 1,
  /// The encoded value is an offset from the relative base register.
  Relative  = 2
}

/// One decoded instruction cell: the operation together with the addressing
/// mode of each of its (up to three) parameters.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Instruction {
  pub opcode :  Opcode,
  pub modes  :  [ParameterMode; 3]
}

impl Instruction {

  /**
    Decodes one raw cell fetched from `address` (the address is carried only
    for error context). Every mode digit is extracted with a modulo, the
    third included; a bitwise AND against 10 only coincidentally agrees with
    the modulo for small cells and must not be used.
  */
  pub fn decode(cell: i64, address: usize) -> Result<Instruction> {
    let opcode =
      u8::try_from(cell % 100)
        .ok()
        .and_then(|code| Opcode::try_from(code).ok())
        .ok_or(MachineError::IllegalOpcode { code: cell, address })?;

    let mut modes   = [ParameterMode::Position; 3];
    let mut divisor = 100i64;
    for mode in modes.iter_mut() {
      let digit = (cell / divisor) % 10;
      *mode =
        u8::try_from(digit)
          .ok()
          .and_then(|digit| ParameterMode::try_from(digit).ok())
          .ok_or(MachineError::IllegalMode { digit, address })?;
      divisor *= 10;
    }

    Ok(Instruction { opcode, modes })
  }

  /// Returns the addressing mode of parameter `n`, counting from 1.
  pub fn mode(&self, n: usize) -> ParameterMode {
    self.modes[n - 1]
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.opcode.arity() {

      0 => {
        write!(f, "{}", self.opcode)
      }

      arity => {
        let modes =
          self.modes[..arity]
              .iter()
              .map(|mode| <&'static str>::from(*mode))
              .collect::<Vec<&str>>()
              .join(", ");
        write!(f, "{}({})", self.opcode, modes)
      }

    }
  }
}
