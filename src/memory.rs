//! The memory store backing a running program: a growable, zero-initialized,
//! randomly addressable region of signed integer cells. The program's cells
//! are loaded starting at address 0; everything past them reads as zero until
//! written.

use std::convert::TryFrom;

use crate::errors::{MachineError, Result};

/**
  Upper bound on growth, in cells. Growing lazily costs nothing for small
  programs, and this ceiling still admits every known program while keeping a
  runaway write from exhausting the host.
*/
pub const MEMORY_CEILING: usize = 1 << 24;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
  cells: Vec<i64>
}

impl Memory {

  pub fn from_program(program: &[i64]) -> Memory {
    Memory { cells: program.to_vec() }
  }

  /// Returns the number of cells materialized so far.
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  /// Returns the materialized region, for display and inspection.
  pub fn cells(&self) -> &[i64] {
    &self.cells
  }

  /**
    Reads one cell. Addresses past the materialized region read as zero
    without growing anything. Negative addresses are fatal.
  */
  pub fn read(&self, address: i64) -> Result<i64> {
    let index = Memory::index_of(address)?;
    match index < self.cells.len() {
      true  => Ok(self.cells[index]),
      false => Ok(0)
    }
  }

  /**
    Writes one cell, materializing zero-filled cells up to the address if it
    has never been touched. Addresses at or past `MEMORY_CEILING` are refused.
  */
  pub fn write(&mut self, address: i64, value: i64) -> Result<()> {
    let index = Memory::index_of(address)?;
    if index >= MEMORY_CEILING {
      return Err(MachineError::OutOfBounds { address, ceiling: MEMORY_CEILING });
    }
    if index >= self.cells.len() {
      self.cells.resize(index + 1, 0);
    }
    self.cells[index] = value;
    Ok(())
  }

  fn index_of(address: i64) -> Result<usize> {
    usize::try_from(address).map_err(|_| MachineError::NegativeAddress(address))
  }

}


#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn loads_program_at_address_zero() {
    let memory = Memory::from_program(&[5, -6, 7]);
    assert_eq!(memory.read(0).unwrap(), 5);
    assert_eq!(memory.read(1).unwrap(), -6);
    assert_eq!(memory.read(2).unwrap(), 7);
    assert_eq!(memory.len(), 3);
  }

  #[test]
  fn unwritten_cells_read_as_zero() {
    let memory = Memory::from_program(&[1, 2, 3]);
    assert_eq!(memory.read(3).unwrap(), 0);
    assert_eq!(memory.read(1_000_000).unwrap(), 0);
    // Reads never grow the store.
    assert_eq!(memory.len(), 3);
  }

  #[test]
  fn writes_far_past_the_program_grow_the_store() {
    let mut memory = Memory::from_program(&[1, 2, 3]);
    memory.write(10_000, 42).unwrap();
    assert_eq!(memory.read(10_000).unwrap(), 42);
    assert_eq!(memory.read(9_999).unwrap(), 0);
    assert_eq!(memory.len(), 10_001);
  }

  #[test]
  fn negative_addresses_are_fatal() {
    let mut memory = Memory::from_program(&[1]);
    assert!(matches!(memory.read(-1), Err(MachineError::NegativeAddress(-1))));
    assert!(matches!(memory.write(-5, 0), Err(MachineError::NegativeAddress(-5))));
  }

  #[test]
  fn writes_past_the_ceiling_are_refused() {
    let mut memory = Memory::from_program(&[]);
    let address = MEMORY_CEILING as i64;
    assert!(matches!(
      memory.write(address, 1),
      Err(MachineError::OutOfBounds { .. })
    ));
  }
}
