//! The error taxonomy of the machine and its drivers.

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, MachineError>;

/// Everything that can go wrong while loading or running a program.
#[derive(Debug, Error)]
pub enum MachineError {
  /// A token in the program source is not a valid integer. Fatal before any
  /// machine runs.
  #[error("`{token}` is not an integer")]
  Parse { token: String },

  /// An instruction resolved a negative address.
  #[error("negative address {0}")]
  NegativeAddress(i64),

  /// A write would grow memory past the growth ceiling.
  #[error("address {address} is beyond the {ceiling} cell ceiling")]
  OutOfBounds { address: i64, ceiling: usize },

  /// The cell at `address` does not decode to a known opcode.
  #[error("illegal opcode in cell {code} at address {address}")]
  IllegalOpcode { code: i64, address: usize },

  /// A parameter mode digit other than 0, 1 or 2.
  #[error("illegal parameter mode {digit} at address {address}")]
  IllegalMode { digit: i64, address: usize },

  /// The destination parameter of a write decoded to immediate mode.
  #[error("immediate-mode destination at address {address}")]
  ImmediateDestination { address: usize },

  /// Every live pipeline stage is blocked and every queue is empty, so no
  /// further input can ever arrive.
  #[error("pipeline deadlock: every stage is blocked with empty queues")]
  Deadlock,

  /// A pipeline run, or an entire search, finished without producing a value.
  #[error("no output was produced")]
  NoOutput,

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
