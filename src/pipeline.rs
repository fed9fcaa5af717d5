//! The amplifier pipeline: several machines running one shared program, each
//! stage's output relayed to the next stage's input. The pipeline can run as
//! a straight chain or be closed into a feedback ring that is driven
//! round-robin until every stage halts. An exhaustive search tries every
//! permutation of the phase settings and keeps the best configuration.

use std::fmt::{Display, Formatter};

use log::{debug, warn};

use crate::errors::{MachineError, Result};
use crate::ivm::{Status, IVM};
use crate::permutations::Permutations;

/// The winning configuration of a search and the signal it produced.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SearchResult {
  pub phases : Vec<i64>,
  pub signal : i64
}

impl Display for SearchResult {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let phases =
      self.phases
          .iter()
          .map(i64::to_string)
          .collect::<Vec<String>>()
          .join(",");
    write!(f, "[{}] {}", phases, self.signal)
  }
}

/**
  Runs the program once per phase as a straight chain: each stage is fed its
  phase setting and the previous stage's final output, and the last stage's
  output is the result. Every stage is expected to halt after one pass; a
  stage left waiting for input can never be fed again, which is a deadlock.
*/
pub fn run_serial(program: &[i64], phases: &[i64], seed: i64) -> Result<i64> {
  let mut carry = seed;
  for &phase in phases {
    let mut stage = IVM::new(program);
    stage.push_input(phase);
    stage.push_input(carry);

    match stage.process()? {
      Status::Halted => {}
      _ => return Err(MachineError::Deadlock)
    }
    carry = stage.drain_output()
                 .pop()
                 .ok_or(MachineError::NoOutput)?;
  }
  Ok(carry)
}

/**
  Runs the program as a feedback ring: one stage per phase, each stage's
  output queue relayed into the next stage's input queue, the last stage
  wrapping around to the first. Stage 0 additionally receives `seed` as the
  ring's initial value.

  Stages are driven round-robin; each takes a turn of `process`, runs until
  it blocks or halts, and everything it emitted is passed downstream. The
  ring terminates once every stage has halted, and the result is the last
  value the final stage emitted over the whole run. A value emitted in the
  same turn its stage halts still counts, and a stage that halts without new
  output never clobbers the value it produced earlier.
*/
pub fn run_feedback_loop(program: &[i64], phases: &[i64], seed: i64) -> Result<i64> {
  let mut stages: Vec<IVM> =
    phases.iter()
          .map(|&phase| {
            let mut stage = IVM::new(program);
            stage.push_input(phase);
            stage
          })
          .collect();
  if stages.is_empty() {
    return Err(MachineError::NoOutput);
  }
  stages[0].push_input(seed);

  let mut final_signal: Option<i64> = None;
  loop {
    let mut emitted_this_round = 0;
    let mut halted_this_round  = 0;

    for k in 0..stages.len() {
      if stages[k].halted() {
        continue;
      }

      let status  = stages[k].process()?;
      let emitted = stages[k].drain_output();
      emitted_this_round += emitted.len();
      if status == Status::Halted {
        halted_this_round += 1;
      }

      if k == stages.len() - 1 {
        if let Some(&last) = emitted.last() {
          final_signal = Some(last);
        }
      }

      let next = (k + 1) % stages.len();
      for value in emitted {
        stages[next].push_input(value);
      }
    }

    if stages.iter().all(IVM::halted) {
      return final_signal.ok_or(MachineError::NoOutput);
    }

    // Ring-wide starvation: nothing was emitted, nobody halted, and every
    // live stage is blocked with an empty queue. Spinning further could
    // never make progress.
    let starved =
      emitted_this_round == 0
        && halted_this_round == 0
        && stages.iter().all(|stage| stage.halted() || stage.pending_input() == 0);
    if starved {
      return Err(MachineError::Deadlock);
    }
  }
}

/**
  Evaluates the feedback ring for every ordering of `phases`, seeding the
  ring with 0, and keeps the first ordering attaining the maximum signal.

  A configuration that faults or deadlocks is logged and skipped; one bad
  configuration does not abort the whole search.
*/
pub fn search_feedback(program: &[i64], phases: &[i64]) -> Result<SearchResult> {
  let mut best: Option<SearchResult> = None;

  for ordering in Permutations::new(phases.to_vec()) {
    let signal = match run_feedback_loop(program, &ordering, 0) {

      Ok(signal) => signal,

      Err(error) => {
        warn!("phase order {:?} skipped: {}", ordering, error);
        continue;
      }

    };
    debug!("phase order {:?} produced signal {}", ordering, signal);

    match &best {
      Some(result) if signal <= result.signal => {}
      _ => best = Some(SearchResult { phases: ordering, signal })
    }
  }

  best.ok_or(MachineError::NoOutput)
}
