//! Structures and functions for the Intcode Virtual Machine, the resumable
//! fetch-decode-execute engine at the core of the repository.
//!
//! A machine owns its memory, its instruction pointer and relative base, and
//! a pair of FIFO queues for input and output. `process` runs until the
//! program halts, faults, or blocks on an empty input queue; a blocked
//! machine resumes from the exact position it suspended at once input is
//! replenished. This is what lets several machines be interleaved
//! cooperatively by an external driver with no concurrency primitive.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};
use strum_macros::Display as StrumDisplay;

use crate::errors::{MachineError, Result};
use crate::instruction::{Instruction, Opcode, ParameterMode};
use crate::memory::Memory;

/// How many leading memory cells the `Display` impl renders.
const DISPLAY_WINDOW: usize = 32;

/// Where `process` left the machine. `Blocked` is resumable; `Halted` and
/// `Faulted` are terminal.
#[derive(StrumDisplay, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Status {
  /// Constructed, `process` never called.
  Ready,
  /// Suspended at an `Input` instruction with an empty input queue.
  Blocked,
  /// Reached opcode 99.
  Halted,
  /// Stopped on an error; the error was returned by `process`.
  Faulted
}

pub struct IVM {

  // Flags
  started : bool,   // Has `process` ever run?
  status  : Status,

  // Memory store
  memory : Memory,

  // Registers //
  ip            : usize, // Instruction Pointer, a cursor into memory
  relative_base : i64,   // Offset added to relative-mode parameters

  // I/O queues
  input  : VecDeque<i64>,
  output : VecDeque<i64>

}

impl IVM {

  // region Construction and accessors

  pub fn new(program: &[i64]) -> IVM {
    IVM {
      started       :  false,
      status        :  Status::Ready,
      memory        :  Memory::from_program(program),
      ip            :  0,
      relative_base :  0,
      input         :  VecDeque::new(),
      output        :  VecDeque::new()
    }
  }

  pub fn started(&self) -> bool {
    self.started
  }

  pub fn halted(&self) -> bool {
    self.status == Status::Halted
  }

  pub fn status(&self) -> Status {
    self.status
  }

  pub fn instruction_pointer(&self) -> usize {
    self.ip
  }

  pub fn relative_base(&self) -> i64 {
    self.relative_base
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  /// Queues one value for a future `Input` instruction.
  pub fn push_input(&mut self, value: i64) {
    self.input.push_back(value);
  }

  /// Returns the number of queued input values not yet consumed.
  pub fn pending_input(&self) -> usize {
    self.input.len()
  }

  /// Removes and returns the oldest unconsumed output value.
  pub fn pop_output(&mut self) -> Option<i64> {
    self.output.pop_front()
  }

  /// Removes and returns everything emitted since the last drain, oldest
  /// value first.
  pub fn drain_output(&mut self) -> Vec<i64> {
    self.output.drain(..).collect()
  }

  // endregion

  // region Execution

  /**
    Runs the fetch-decode-execute loop until the machine blocks on an empty
    input queue, halts, or faults; it never yields otherwise.

    A `Blocked` machine resumes exactly where it suspended on the next call:
    the `Input` instruction it stopped at is not consumed, so the instruction
    pointer and relative base carry over unchanged. `Halted` and `Faulted`
    machines are inert and further calls return the terminal status.
  */
  pub fn process(&mut self) -> Result<Status> {
    match self.status {
      Status::Halted | Status::Faulted => return Ok(self.status),
      _ => {}
    }
    self.started = true;

    match self.run() {

      Ok(status) => {
        self.status = status;
        #[cfg(feature = "trace_computation")] println!("{}", self);
        Ok(status)
      }

      Err(error) => {
        self.status = Status::Faulted;
        Err(error)
      }

    }
  }

  fn run(&mut self) -> Result<Status> {
    loop {
      let cell        = self.memory.read(self.ip as i64)?;
      let instruction = Instruction::decode(cell, self.ip)?;

      #[cfg(feature = "trace_computation")]
      println!("{:>6}  {}", self.ip, instruction);

      match instruction.opcode {

        Opcode::Add => {
          let a    = self.parameter(&instruction, 1)?;
          let b    = self.parameter(&instruction, 2)?;
          let dest = self.destination(&instruction, 3)?;
          self.memory.write(dest, a + b)?;
          self.ip += instruction.opcode.width();
        }

        Opcode::Multiply => {
          let a    = self.parameter(&instruction, 1)?;
          let b    = self.parameter(&instruction, 2)?;
          let dest = self.destination(&instruction, 3)?;
          self.memory.write(dest, a * b)?;
          self.ip += instruction.opcode.width();
        }

        Opcode::Input => {
          match self.input.pop_front() {

            Some(value) => {
              let dest = self.destination(&instruction, 1)?;
              self.memory.write(dest, value)?;
              self.ip += instruction.opcode.width();
            }

            // The instruction is not consumed; a later call resumes here.
            None => {
              return Ok(Status::Blocked);
            }

          }
        }

        Opcode::Output => {
          let a = self.parameter(&instruction, 1)?;
          self.output.push_back(a);
          self.ip += instruction.opcode.width();
        }

        Opcode::JumpIfTrue => {
          let a      = self.parameter(&instruction, 1)?;
          let target = self.parameter(&instruction, 2)?;
          match a != 0 {
            true  => self.jump(target)?,
            false => self.ip += instruction.opcode.width()
          }
        }

        Opcode::JumpIfFalse => {
          let a      = self.parameter(&instruction, 1)?;
          let target = self.parameter(&instruction, 2)?;
          match a == 0 {
            true  => self.jump(target)?,
            false => self.ip += instruction.opcode.width()
          }
        }

        Opcode::LessThan => {
          let a    = self.parameter(&instruction, 1)?;
          let b    = self.parameter(&instruction, 2)?;
          let dest = self.destination(&instruction, 3)?;
          self.memory.write(dest, match a < b { true => 1, false => 0 })?;
          self.ip += instruction.opcode.width();
        }

        Opcode::Equals => {
          let a    = self.parameter(&instruction, 1)?;
          let b    = self.parameter(&instruction, 2)?;
          let dest = self.destination(&instruction, 3)?;
          self.memory.write(dest, match a == b { true => 1, false => 0 })?;
          self.ip += instruction.opcode.width();
        }

        Opcode::RelativeBaseOffset => {
          self.relative_base += self.parameter(&instruction, 1)?;
          self.ip += instruction.opcode.width();
        }

        Opcode::Halt => {
          return Ok(Status::Halted);
        }

      } // end match on opcode
    }
  }

  fn jump(&mut self, target: i64) -> Result<()> {
    match target >= 0 {
      true  => {
        self.ip = target as usize;
        Ok(())
      }
      false => Err(MachineError::NegativeAddress(target))
    }
  }

  /// Resolves parameter `n` (counting from 1) to a value per its mode.
  /// Immediate parameters never touch memory.
  fn parameter(&self, instruction: &Instruction, n: usize) -> Result<i64> {
    let encoded = self.memory.read((self.ip + n) as i64)?;
    match instruction.mode(n) {
      ParameterMode::Position  => self.memory.read(encoded),
      ParameterMode::Immediate => Ok(encoded),
      ParameterMode::Relative  => self.memory.read(self.relative_base + encoded)
    }
  }

  /**
    Resolves parameter `n` to a write address. Destinations are addresses by
    definition, so immediate mode is a fault here.
  */
  fn destination(&self, instruction: &Instruction, n: usize) -> Result<i64> {
    let encoded = self.memory.read((self.ip + n) as i64)?;
    match instruction.mode(n) {
      ParameterMode::Position  => Ok(encoded),
      ParameterMode::Relative  => Ok(self.relative_base + encoded),
      ParameterMode::Immediate => Err(MachineError::ImmediateDestination { address: self.ip })
    }
  }

  // endregion

  // region Display methods

  fn make_memory_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    let cells = self.memory.cells();
    let end   = cells.len().min(DISPLAY_WINDOW);
    for (address, cell) in cells[..end].iter().enumerate() {
      match address == self.ip {

        true  => {
          table.add_row(
            row![r->format!("* --> M[{}] =", address), format!("{}", cell)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("M[{}] =", address), format!("{}", cell)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion

}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for IVM {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    writeln!(
      f,
      "Status: {}\tIP: {}\tRelative base: {}",
      self.status, self.ip, self.relative_base
    )?;
    writeln!(
      f,
      "Input: {:?}\tOutput: {:?}",
      self.input, self.output
    )?;
    write!(f, "{}", self.make_memory_table())
  }
}


#[cfg(test)]
mod test {
  use super::*;

  fn run_to_halt(program: &[i64]) -> IVM {
    let mut machine = IVM::new(program);
    assert_eq!(machine.process().unwrap(), Status::Halted);
    machine
  }

  fn run_with_input(program: &[i64], input: i64) -> Vec<i64> {
    let mut machine = IVM::new(program);
    machine.push_input(input);
    assert_eq!(machine.process().unwrap(), Status::Halted);
    machine.drain_output()
  }

  #[test]
  fn halts_immediately_on_opcode_99() {
    let program = [99, 1, 2, 3];
    let machine = run_to_halt(&program);
    assert_eq!(machine.memory().cells(), &program);
    assert_eq!(machine.instruction_pointer(), 0);
    assert!(machine.started());
    assert!(machine.halted());
  }

  #[test]
  fn add_and_multiply_in_position_mode() {
    let machine = run_to_halt(&[1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]);
    assert_eq!(machine.memory().read(0).unwrap(), 3500);
    assert_eq!(machine.memory().read(3).unwrap(), 70);
  }

  #[test]
  fn self_referential_add() {
    let machine = run_to_halt(&[1, 0, 0, 0, 99]);
    assert_eq!(machine.memory().read(0).unwrap(), 2);
  }

  #[test]
  fn immediate_parameters_use_the_raw_value() {
    let machine = run_to_halt(&[1002, 4, 3, 4, 33]);
    assert_eq!(machine.memory().read(4).unwrap(), 99);

    let machine = run_to_halt(&[1101, 100, -1, 4, 0]);
    assert_eq!(machine.memory().read(4).unwrap(), 99);
  }

  #[test]
  fn blocks_on_empty_input_and_resumes_in_place() {
    // Two inputs in a row; only one value is supplied at a time.
    let mut machine = IVM::new(&[3, 0, 3, 1, 99]);
    assert_eq!(machine.process().unwrap(), Status::Blocked);
    assert_eq!(machine.instruction_pointer(), 0);
    assert!(machine.started());

    machine.push_input(7);
    assert_eq!(machine.process().unwrap(), Status::Blocked);
    // Exactly one Input instruction ran: the value landed, the pointer moved
    // one instruction, the queue drained.
    assert_eq!(machine.memory().read(0).unwrap(), 7);
    assert_eq!(machine.instruction_pointer(), 2);
    assert_eq!(machine.pending_input(), 0);

    machine.push_input(8);
    assert_eq!(machine.process().unwrap(), Status::Halted);
    assert_eq!(machine.memory().read(1).unwrap(), 8);
  }

  #[test]
  fn relative_base_survives_a_suspension() {
    let mut machine = IVM::new(&[109, 19, 3, 0, 4, 0, 99]);
    assert_eq!(machine.process().unwrap(), Status::Blocked);
    assert_eq!(machine.relative_base(), 19);
    assert_eq!(machine.instruction_pointer(), 2);

    machine.push_input(5);
    assert_eq!(machine.process().unwrap(), Status::Halted);
    assert_eq!(machine.relative_base(), 19);
    assert_eq!(machine.drain_output(), vec![5]);
  }

  #[test]
  fn echo_program_copies_input_to_output() {
    assert_eq!(run_with_input(&[3, 0, 4, 0, 99], 42), vec![42]);
  }

  #[test]
  fn comparison_and_jump_program() {
    // Outputs 999 / 1000 / 1001 for input below / equal to / above 8.
    let program = [
      3, 21, 1008, 21, 8, 20, 1005, 20, 22, 107, 8, 21, 20, 1006, 20, 31,
      1106, 0, 36, 98, 0, 0, 1002, 21, 125, 20, 4, 20, 1105, 1, 46, 104,
      999, 1105, 1, 46, 1101, 1000, 1, 20, 4, 20, 1105, 1, 46, 98, 99
    ];
    assert_eq!(run_with_input(&program, 7), vec![999]);
    assert_eq!(run_with_input(&program, 8), vec![1000]);
    assert_eq!(run_with_input(&program, 9), vec![1001]);
  }

  #[test]
  fn relative_mode_quine_reproduces_itself() {
    let program = [
      109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99
    ];
    let mut machine = IVM::new(&program);
    assert_eq!(machine.process().unwrap(), Status::Halted);
    assert_eq!(machine.drain_output(), program.to_vec());
  }

  #[test]
  fn sixty_four_bit_cells() {
    let mut machine = run_to_halt(&[1102, 34_915_192, 34_915_192, 7, 4, 7, 99, 0]);
    let emitted = machine.pop_output().unwrap();
    assert_eq!(emitted.to_string().len(), 16);

    let mut machine = run_to_halt(&[104, 1_125_899_906_842_205, 99]);
    assert_eq!(machine.pop_output(), Some(1_125_899_906_842_205));
  }

  #[test]
  fn unknown_opcode_faults_and_stays_faulted() {
    let mut machine = IVM::new(&[98, 0, 0, 0]);
    match machine.process() {
      Err(MachineError::IllegalOpcode { code: 98, address: 0 }) => {}
      other => panic!("expected IllegalOpcode, got {:?}", other)
    }
    assert_eq!(machine.status(), Status::Faulted);
    // Terminal: further calls are no-ops.
    assert_eq!(machine.process().unwrap(), Status::Faulted);
  }

  #[test]
  fn immediate_destination_faults() {
    let mut machine = IVM::new(&[11101, 1, 1, 0, 99]);
    assert!(matches!(
      machine.process(),
      Err(MachineError::ImmediateDestination { address: 0 })
    ));
    assert_eq!(machine.status(), Status::Faulted);
  }

  #[test]
  fn halted_machine_ignores_further_processing() {
    let mut machine = run_to_halt(&[99]);
    machine.push_input(1);
    assert_eq!(machine.process().unwrap(), Status::Halted);
    assert_eq!(machine.pending_input(), 1);
  }
}
