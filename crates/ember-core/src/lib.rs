//! Core types and trait definitions for the Ember emergency-contact service.
//!
//! This crate has no HTTP or database dependencies. It holds the domain
//! model, the field validation rules, the priority renumbering planner, and
//! the [`store::EmergencyStore`] abstraction that storage backends implement.

// Implementors use native `async fn` for the RPITIT store methods.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod error;
pub mod identity;
pub mod priority;
pub mod profile;
pub mod reference;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
