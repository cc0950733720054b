//! Bearer-token issuance and validation for Ember.
//!
//! Tokens are compact JWTs signed with HS256 over a shared secret. The
//! claims are an arbitrary flat JSON object plus the registered `exp` claim.
//! Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use ember_token::{TokenConfig, TokenService, decode_claims};
//! use serde_json::json;
//!
//! let tokens = TokenService::new(TokenConfig::new(b"secret".to_vec()));
//! let token = tokens.issue(&json!({ "username": "george" })).unwrap();
//! tokens.validate(&token).unwrap();
//! println!("{:?}", decode_claims(&token).unwrap()["username"]);
//! ```

pub mod error;

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
pub use error::{Error, Result};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// A decoded claims object.
pub type Claims = Map<String, Value>;

const EXP: &str = "exp";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Everything a [`TokenService`] needs. Built by the caller and injected.
#[derive(Clone)]
pub struct TokenConfig {
  /// Shared HMAC secret.
  pub secret:      Vec<u8>,
  /// Lifetime used by [`TokenService::issue`].
  pub default_ttl: Duration,
}

impl TokenConfig {
  /// A config with the default 15-minute lifetime.
  pub fn new(secret: impl Into<Vec<u8>>) -> Self {
    Self { secret: secret.into(), default_ttl: Duration::minutes(15) }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.default_ttl = ttl;
    self
  }
}

impl fmt::Debug for TokenConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenConfig")
      .field("secret", &"<redacted>")
      .field("default_ttl", &self.default_ttl)
      .finish()
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Issues and validates tokens for one secret.
#[derive(Clone)]
pub struct TokenService {
  encoding:    EncodingKey,
  decoding:    DecodingKey,
  validation:  Validation,
  default_ttl: Duration,
}

impl TokenService {
  pub fn new(config: TokenConfig) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&[EXP]);

    Self {
      encoding: EncodingKey::from_secret(&config.secret),
      decoding: DecodingKey::from_secret(&config.secret),
      validation,
      default_ttl: config.default_ttl,
    }
  }

  pub fn default_ttl(&self) -> Duration { self.default_ttl }

  /// Issue a token for `claims` that expires after the default lifetime.
  pub fn issue<C: Serialize + ?Sized>(&self, claims: &C) -> Result<String> {
    self.issue_with_ttl(claims, self.default_ttl)
  }

  /// Issue a token for `claims` that expires `ttl` from now.
  ///
  /// `claims` must serialise to a JSON object. Any `exp` it carries is
  /// replaced. A negative `ttl` yields a token that is already expired.
  pub fn issue_with_ttl<C: Serialize + ?Sized>(
    &self,
    claims: &C,
    ttl: Duration,
  ) -> Result<String> {
    let mut payload = match serde_json::to_value(claims) {
      Ok(Value::Object(map)) => map,
      Ok(other) => {
        return Err(Error::Encoding(format!(
          "claims must be a JSON object, got {}",
          json_kind(&other)
        )));
      }
      Err(e) => return Err(Error::Encoding(e.to_string())),
    };
    let exp = (Utc::now() + ttl).timestamp();
    payload.insert(EXP.to_owned(), Value::from(exp));

    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
      .map_err(|e| Error::Encoding(e.to_string()))
  }

  /// Check structure, signature, and expiry, in that order.
  pub fn validate(&self, token: &str) -> Result<()> {
    jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|_| ())
      .map_err(classify)
  }
}

fn classify(err: jsonwebtoken::errors::Error) -> Error {
  match err.kind() {
    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Error::BadSignature,
    ErrorKind::ExpiredSignature => Error::Expired,
    _ => Error::Malformed(err.to_string()),
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

// ─── Claims ──────────────────────────────────────────────────────────────────

/// Read the claims segment of `token` without checking the signature or
/// expiry. Call [`TokenService::validate`] first.
pub fn decode_claims(token: &str) -> Result<Claims> {
  let mut segments = token.split('.');
  let (Some(_), Some(claims), Some(_), None) =
    (segments.next(), segments.next(), segments.next(), segments.next())
  else {
    return Err(Error::Malformed("expected three dot-separated segments".into()));
  };

  let bytes = URL_SAFE_NO_PAD
    .decode(claims)
    .map_err(|e| Error::Malformed(format!("claims segment: {e}")))?;
  serde_json::from_slice(&bytes)
    .map_err(|e| Error::Malformed(format!("claims segment: {e}")))
}

/// [`decode_claims`] into a typed value.
pub fn decode_claims_as<T: DeserializeOwned>(token: &str) -> Result<T> {
  let claims = decode_claims(token)?;
  serde_json::from_value(Value::Object(claims))
    .map_err(|e| Error::Malformed(e.to_string()))
}
