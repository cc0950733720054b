//! The `EmergencyStore` trait.
//!
//! Implemented by storage backends (e.g. `ember-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::{convert::Infallible, future::Future};

use crate::{
  contact::{Contact, NewContact, SurrogateId, Upsert},
  identity::{Identity, Pidm},
  profile::{Indicator, NotificationSettings, Profile},
  reference::{Nation, Relation, State},
};

/// Backend errors that may wrap a domain [`crate::Error`].
///
/// Lets callers map ordering and ownership failures to client errors without
/// knowing the backend's concrete error type.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn as_core(&self) -> Option<&crate::Error>;
}

impl StoreError for Infallible {
  fn as_core(&self) -> Option<&crate::Error> { match *self {} }
}

/// Abstraction over an Ember storage backend.
///
/// Every contact mutation runs as one serialised transaction per owner: the
/// priority shift and the target row commit together or not at all, and
/// afterwards the owner's priorities are exactly `1..=N`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EmergencyStore: Send + Sync {
  type Error: StoreError;

  // ── Identities ────────────────────────────────────────────────────────

  /// Insert or replace a directory identity.
  fn add_identity(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn find_identity_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// All contacts owned by `owner`, ascending by priority.
  fn list_contacts(
    &self,
    owner: Pidm,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  fn find_contact(
    &self,
    id: SurrogateId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Create or update a contact for `owner`, renumbering siblings.
  ///
  /// - No surrogate id: a new contact with a store-assigned id, inserted at
  ///   `input.priority` (`1..=N+1`).
  /// - An id owned by `owner`: fields replaced, moved to `input.priority`
  ///   (`1..=N`).
  /// - An id owned by someone else: [`crate::Error::Forbidden`].
  /// - An unknown id: created under that id.
  fn upsert_contact(
    &self,
    owner: Pidm,
    input: NewContact,
  ) -> impl Future<Output = Result<(Contact, Upsert), Self::Error>> + Send + '_;

  /// Delete a contact and close the gap it leaves.
  ///
  /// Fails with [`crate::Error::ContactNotFound`] for an unknown id and
  /// [`crate::Error::Forbidden`] when `owner` does not own it.
  fn delete_contact(
    &self,
    owner: Pidm,
    id: SurrogateId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Profile ───────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    owner: Pidm,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Set the evacuation flag, creating the profile if needed.
  fn set_evacuation_assistance(
    &self,
    owner: Pidm,
    flag: Indicator,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Replace the notification channels, creating the profile if needed.
  fn set_notifications(
    &self,
    owner: Pidm,
    settings: NotificationSettings,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  // ── Reference data ────────────────────────────────────────────────────

  fn list_relations(
    &self,
  ) -> impl Future<Output = Result<Vec<Relation>, Self::Error>> + Send + '_;

  fn list_nations(
    &self,
  ) -> impl Future<Output = Result<Vec<Nation>, Self::Error>> + Send + '_;

  fn list_states(
    &self,
  ) -> impl Future<Output = Result<Vec<State>, Self::Error>> + Send + '_;

  fn find_relation(
    &self,
    code: String,
  ) -> impl Future<Output = Result<Option<Relation>, Self::Error>> + Send + '_;

  fn find_nation(
    &self,
    code: String,
  ) -> impl Future<Output = Result<Option<Nation>, Self::Error>> + Send + '_;

  fn find_state(
    &self,
    code: String,
  ) -> impl Future<Output = Result<Option<State>, Self::Error>> + Send + '_;
}
