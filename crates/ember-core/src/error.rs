//! Error types for `ember-core`.

use thiserror::Error;

use crate::contact::SurrogateId;

/// Failures of the contact-ordering layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("priority {requested} is outside the allowed range 1..={max}")]
  InvalidPriority { requested: u32, max: u32 },

  #[error("contact not found: {0}")]
  ContactNotFound(SurrogateId),

  #[error("contact {0} belongs to another person")]
  Forbidden(SurrogateId),

  /// The stored priorities stopped being exactly `1..=N`. Never expected in
  /// a correct deployment; the write that observed it is rolled back.
  #[error("priority invariant violated: {0}")]
  InvariantViolation(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
