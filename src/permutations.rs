//! Lazy enumeration of every ordering of a fixed sequence using Heap's
//! swap-generation algorithm.

/**
  Iterator over all `n!` orderings of its input, the input order itself first.

  Enumeration state (the working arrangement, the counter array, and the
  has-the-identity-been-emitted flag) is wholly owned by the instance, so
  independent generators never interfere with one another. The identity flag
  in particular must not live in shared or static storage: that would drop
  the first arrangement from every traversal after the first.
*/
#[derive(Clone, Debug)]
pub struct Permutations<T> {
  arrangement : Vec<T>,
  counters    : Vec<usize>,
  index       : usize,
  emitted_identity : bool
}

impl<T: Clone> Permutations<T> {
  pub fn new(arrangement: Vec<T>) -> Permutations<T> {
    let length = arrangement.len();
    Permutations {
      arrangement,
      counters         :  vec![0; length],
      index            :  0,
      emitted_identity :  false
    }
  }
}

impl<T: Clone> Iterator for Permutations<T> {
  type Item = Vec<T>;

  fn next(&mut self) -> Option<Vec<T>> {
    if !self.emitted_identity {
      self.emitted_identity = true;
      return Some(self.arrangement.clone());
    }

    while self.index < self.arrangement.len() {
      match self.counters[self.index] < self.index {

        true  => {
          match self.index % 2 == 0 {
            true  => self.arrangement.swap(0, self.index),
            false => self.arrangement.swap(self.counters[self.index], self.index)
          }
          self.counters[self.index] += 1;
          self.index = 0;
          return Some(self.arrangement.clone());
        }

        false => {
          self.counters[self.index] = 0;
          self.index += 1;
        }

      }
    }

    None
  }
}
