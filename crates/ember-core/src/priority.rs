//! Priority renumbering for an owner's contact list.
//!
//! For a fixed owner the set of contact priorities is always exactly
//! `{1, …, N}`. Inserting, moving, or deleting a contact perturbs that set;
//! the planners here compute the single contiguous block of siblings that
//! has to slide by one to restore it. Backends apply the returned [`Shift`]
//! and write the target row inside one transaction.

use crate::{Error, Result};

/// A block of sibling priorities `from..=to` that moves by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
  pub from:  u32,
  pub to:    u32,
  /// Either `+1` or `-1`.
  pub delta: i32,
}

impl Shift {
  pub fn contains(&self, priority: u32) -> bool {
    (self.from..=self.to).contains(&priority)
  }

  /// The priority `priority` ends up at once this shift is applied.
  pub fn apply(&self, priority: u32) -> u32 {
    if self.contains(priority) {
      priority.saturating_add_signed(self.delta)
    } else {
      priority
    }
  }
}

/// Plan inserting a new contact at `desired` into a list of `count`.
///
/// Every sibling at or after `desired` moves back one place. Appending at
/// `count + 1` needs no shift.
pub fn plan_insert(count: u32, desired: u32) -> Result<Option<Shift>> {
  let max = count + 1;
  if desired < 1 || desired > max {
    return Err(Error::InvalidPriority { requested: desired, max });
  }
  Ok((desired <= count).then_some(Shift { from: desired, to: count, delta: 1 }))
}

/// Plan moving the contact at `old` to `new` in a list of `count`.
///
/// Only the siblings between the two positions move; everything else keeps
/// its place, so relative order outside the rotated block is preserved.
pub fn plan_move(count: u32, old: u32, new: u32) -> Result<Option<Shift>> {
  if new < 1 || new > count {
    return Err(Error::InvalidPriority { requested: new, max: count });
  }
  if old < 1 || old > count {
    return Err(Error::InvariantViolation(format!(
      "stored priority {old} is outside 1..={count}"
    )));
  }
  Ok(match new.cmp(&old) {
    std::cmp::Ordering::Less => Some(Shift { from: new, to: old - 1, delta: 1 }),
    std::cmp::Ordering::Greater => Some(Shift { from: old + 1, to: new, delta: -1 }),
    std::cmp::Ordering::Equal => None,
  })
}

/// Plan removing the contact at `priority` from a list of `count`.
///
/// Every sibling after it moves forward one place.
pub fn plan_delete(count: u32, priority: u32) -> Result<Option<Shift>> {
  if priority < 1 || priority > count {
    return Err(Error::InvariantViolation(format!(
      "stored priority {priority} is outside 1..={count}"
    )));
  }
  Ok((priority < count).then_some(Shift { from: priority + 1, to: count, delta: -1 }))
}

/// Check that `priorities` is exactly `{1, …, N}` in some order.
pub fn check_contiguous(priorities: impl IntoIterator<Item = u32>) -> Result<()> {
  let mut sorted: Vec<u32> = priorities.into_iter().collect();
  sorted.sort_unstable();
  for (expected, actual) in (1..).zip(&sorted) {
    if *actual != expected {
      return Err(Error::InvariantViolation(format!(
        "expected priorities 1..={}, found {sorted:?}",
        sorted.len()
      )));
    }
  }
  Ok(())
}
