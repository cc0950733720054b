//! Error type for `ember-store-sqlite`.

use ember_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ember_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A stored value could not be turned back into a domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Domain errors raised inside a connection closure travel out boxed in
/// [`tokio_rusqlite::Error::Other`]; unwrap them back into [`Error::Core`].
impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Other(boxed) => match boxed.downcast::<ember_core::Error>() {
        Ok(core) => Self::Core(*core),
        Err(other) => Self::Database(tokio_rusqlite::Error::Other(other)),
      },
      other => Self::Database(other),
    }
  }
}

impl StoreError for Error {
  fn as_core(&self) -> Option<&ember_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}
