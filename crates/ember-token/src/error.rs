//! Error types for the ember-token crate.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// Not three base64url segments, undecodable JSON, or no `exp` claim.
  #[error("malformed token: {0}")]
  Malformed(String),

  #[error("token signature does not match")]
  BadSignature,

  #[error("token has expired")]
  Expired,

  /// The claims could not be turned into a token.
  #[error("cannot encode claims: {0}")]
  Encoding(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
