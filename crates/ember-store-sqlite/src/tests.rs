//! Integration tests for `SqliteStore` against an in-memory database.

use ember_core::{
  contact::{Address, ContactName, NewContact, Phone, RelationCode, SurrogateId, Upsert},
  identity::{Identity, Pidm},
  profile::{Indicator, NotificationSettings},
  store::{EmergencyStore, StoreError},
};

use crate::{Error, SqliteStore};

const OWNER: Pidm = Pidm(1001);
const OTHER: Pidm = Pidm(2002);

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn contact(first_name: &str, priority: u32) -> NewContact {
  NewContact {
    surrogate_id: None,
    priority,
    relation: Some(RelationCode::Friend),
    name: ContactName {
      first_name:     first_name.into(),
      last_name:      "Heffley".into(),
      middle_initial: None,
    },
    address: None,
    phone: None,
  }
}

/// `(first_name, priority)` for every contact of `owner`, in priority order.
async fn ranking(s: &SqliteStore, owner: Pidm) -> Vec<(String, u32)> {
  s.list_contacts(owner)
    .await
    .unwrap()
    .into_iter()
    .map(|c| (c.name.first_name, c.priority))
    .collect()
}

fn ranked(entries: &[(&str, u32)]) -> Vec<(String, u32)> {
  entries.iter().map(|&(n, p)| (n.to_owned(), p)).collect()
}

fn core_error(err: &Error) -> Option<&ember_core::Error> { err.as_core() }

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn identity_lookup_by_username() {
  let s = store().await;
  s.add_identity(Identity {
    pidm:           OWNER,
    username:       "gheffley".into(),
    email:          Some("gheffley@pdx.edu".into()),
    first_name:     Some("Greg".into()),
    last_name:      Some("Heffley".into()),
    middle_initial: None,
  })
  .await
  .unwrap();

  let found = s.find_identity_by_username("gheffley".into()).await.unwrap();
  assert_eq!(found.map(|i| i.pidm), Some(OWNER));
  assert!(s.find_identity_by_username("nobody".into()).await.unwrap().is_none());
}

// ─── Insert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_contact_gets_an_assigned_id() {
  let s = store().await;
  let (created, outcome) = s.upsert_contact(OWNER, contact("Rodrick", 1)).await.unwrap();
  assert_eq!(outcome, Upsert::Created);
  assert_eq!(created.priority, 1);
  assert_eq!(created.pidm, OWNER);
  assert_eq!(created.relation, Some(RelationCode::Friend));

  let fetched = s.find_contact(created.surrogate_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn three_inserts_at_the_front_stack_in_reverse() {
  let s = store().await;
  for name in ["first", "second", "third"] {
    s.upsert_contact(OWNER, contact(name, 1)).await.unwrap();
  }
  assert_eq!(
    ranking(&s, OWNER).await,
    ranked(&[("third", 1), ("second", 2), ("first", 3)])
  );
}

#[tokio::test]
async fn insert_in_the_middle_shifts_only_later_siblings() {
  let s = store().await;
  for (name, p) in [("a", 1), ("b", 2), ("c", 3)] {
    s.upsert_contact(OWNER, contact(name, p)).await.unwrap();
  }
  s.upsert_contact(OWNER, contact("x", 2)).await.unwrap();
  assert_eq!(
    ranking(&s, OWNER).await,
    ranked(&[("a", 1), ("x", 2), ("b", 3), ("c", 4)])
  );
}

#[tokio::test]
async fn insert_past_the_end_is_rejected_without_changes() {
  let s = store().await;
  s.upsert_contact(OWNER, contact("a", 1)).await.unwrap();

  let err = s.upsert_contact(OWNER, contact("b", 3)).await.unwrap_err();
  assert_eq!(
    core_error(&err),
    Some(&ember_core::Error::InvalidPriority { requested: 3, max: 2 })
  );
  assert_eq!(ranking(&s, OWNER).await, ranked(&[("a", 1)]));
}

#[tokio::test]
async fn caller_chosen_unknown_id_creates() {
  let s = store().await;
  let input = NewContact { surrogate_id: Some(SurrogateId(77)), ..contact("a", 1) };
  let (created, outcome) = s.upsert_contact(OWNER, input).await.unwrap();
  assert_eq!(outcome, Upsert::Created);
  assert_eq!(created.surrogate_id, SurrogateId(77));

  let (next, _) = s.upsert_contact(OWNER, contact("b", 2)).await.unwrap();
  assert_eq!(next.surrogate_id, SurrogateId(78));
}

#[tokio::test]
async fn owners_are_numbered_independently() {
  let s = store().await;
  s.upsert_contact(OWNER, contact("mine", 1)).await.unwrap();
  s.upsert_contact(OTHER, contact("theirs", 1)).await.unwrap();
  assert_eq!(ranking(&s, OWNER).await, ranked(&[("mine", 1)]));
  assert_eq!(ranking(&s, OTHER).await, ranked(&[("theirs", 1)]));
}

// ─── Update / move ───────────────────────────────────────────────────────────

#[tokio::test]
async fn update_moves_and_replaces_fields() {
  let s = store().await;
  let mut ids = Vec::new();
  for (name, p) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
    ids.push(s.upsert_contact(OWNER, contact(name, p)).await.unwrap().0.surrogate_id);
  }

  let moved = NewContact {
    surrogate_id: Some(ids[3]),
    address: Some(Address {
      street_line1: "1825 SW Broadway".into(),
      street_line2: None,
      street_line3: None,
      city:         "Portland".into(),
      state_code:   Some("OR".into()),
      zip:          Some("97201".into()),
      nation_code:  None,
    }),
    phone: Some(Phone {
      country_code: None,
      area:         "503".into(),
      number:       "5552345".into(),
      extension:    None,
    }),
    ..contact("d2", 2)
  };
  let (updated, outcome) = s.upsert_contact(OWNER, moved).await.unwrap();
  assert_eq!(outcome, Upsert::Updated);
  assert_eq!(updated.surrogate_id, ids[3]);
  assert_eq!(updated.address.as_ref().map(|a| a.city.as_str()), Some("Portland"));
  assert_eq!(updated.phone.as_ref().map(|p| p.number.as_str()), Some("5552345"));

  assert_eq!(
    ranking(&s, OWNER).await,
    ranked(&[("a", 1), ("d2", 2), ("b", 3), ("c", 4)])
  );

  // And back down again.
  let back = NewContact { surrogate_id: Some(ids[0]), ..contact("a", 4) };
  s.upsert_contact(OWNER, back).await.unwrap();
  assert_eq!(
    ranking(&s, OWNER).await,
    ranked(&[("d2", 1), ("b", 2), ("c", 3), ("a", 4)])
  );
}

#[tokio::test]
async fn update_cannot_move_past_the_end() {
  let s = store().await;
  let (a, _) = s.upsert_contact(OWNER, contact("a", 1)).await.unwrap();
  s.upsert_contact(OWNER, contact("b", 2)).await.unwrap();

  let input = NewContact { surrogate_id: Some(a.surrogate_id), ..contact("a", 3) };
  let err = s.upsert_contact(OWNER, input).await.unwrap_err();
  assert_eq!(
    core_error(&err),
    Some(&ember_core::Error::InvalidPriority { requested: 3, max: 2 })
  );
}

#[tokio::test]
async fn updating_someone_elses_contact_is_forbidden() {
  let s = store().await;
  let (theirs, _) = s.upsert_contact(OTHER, contact("theirs", 1)).await.unwrap();

  let input = NewContact { surrogate_id: Some(theirs.surrogate_id), ..contact("mine", 1) };
  let err = s.upsert_contact(OWNER, input).await.unwrap_err();
  assert_eq!(
    core_error(&err),
    Some(&ember_core::Error::Forbidden(theirs.surrogate_id))
  );
  assert_eq!(ranking(&s, OTHER).await, ranked(&[("theirs", 1)]));
  assert!(ranking(&s, OWNER).await.is_empty());
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_the_middle_closes_the_gap() {
  let s = store().await;
  let mut ids = Vec::new();
  for (name, p) in [("one", 1), ("two", 2), ("three", 3)] {
    ids.push(s.upsert_contact(OWNER, contact(name, p)).await.unwrap().0.surrogate_id);
  }

  s.delete_contact(OWNER, ids[1]).await.unwrap();
  assert_eq!(ranking(&s, OWNER).await, ranked(&[("one", 1), ("three", 2)]));
  assert!(s.find_contact(ids[1]).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_errors() {
  let s = store().await;
  let (theirs, _) = s.upsert_contact(OTHER, contact("theirs", 1)).await.unwrap();

  let err = s.delete_contact(OWNER, SurrogateId(999)).await.unwrap_err();
  assert_eq!(
    core_error(&err),
    Some(&ember_core::Error::ContactNotFound(SurrogateId(999)))
  );

  let err = s.delete_contact(OWNER, theirs.surrogate_id).await.unwrap_err();
  assert_eq!(
    core_error(&err),
    Some(&ember_core::Error::Forbidden(theirs.surrogate_id))
  );
  assert_eq!(ranking(&s, OTHER).await, ranked(&[("theirs", 1)]));
}

// ─── Invariant ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn broken_ordering_rolls_back_every_write() {
  let s = store().await;
  s.upsert_contact(OWNER, contact("a", 1)).await.unwrap();
  let (b, _) = s.upsert_contact(OWNER, contact("b", 2)).await.unwrap();

  let b_id = b.surrogate_id;
  s.conn
    .call(move |conn| {
      conn.execute("UPDATE contacts SET priority = 5 WHERE surrogate_id = ?1", [b_id.0])?;
      Ok(())
    })
    .await
    .unwrap();
  let corrupted = ranked(&[("a", 1), ("b", 5)]);

  let err = s.upsert_contact(OWNER, contact("c", 1)).await.unwrap_err();
  assert!(matches!(
    core_error(&err),
    Some(ember_core::Error::InvariantViolation(_))
  ));
  assert_eq!(ranking(&s, OWNER).await, corrupted);

  let a_id = s.list_contacts(OWNER).await.unwrap()[0].surrogate_id;
  let err = s.delete_contact(OWNER, a_id).await.unwrap_err();
  assert!(matches!(
    core_error(&err),
    Some(ember_core::Error::InvariantViolation(_))
  ));
  assert_eq!(ranking(&s, OWNER).await, corrupted);
  assert!(s.find_contact(a_id).await.unwrap().is_some());
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn profile_is_created_lazily_with_campus_email() {
  let s = store().await;
  s.add_identity(Identity {
    pidm:           OWNER,
    username:       "gheffley".into(),
    email:          Some("gheffley@pdx.edu".into()),
    first_name:     None,
    last_name:      None,
    middle_initial: None,
  })
  .await
  .unwrap();

  assert!(s.get_profile(OWNER).await.unwrap().is_none());

  let profile = s.set_evacuation_assistance(OWNER, Indicator::Yes).await.unwrap();
  assert_eq!(profile.evacuation_assistance, Some(Indicator::Yes));
  assert_eq!(profile.campus_email.as_deref(), Some("gheffley@pdx.edu"));
  assert_eq!(profile.sms_status, None);

  let profile = s.set_evacuation_assistance(OWNER, Indicator::No).await.unwrap();
  assert_eq!(profile.evacuation_assistance, Some(Indicator::No));
  assert_eq!(s.get_profile(OWNER).await.unwrap(), Some(profile));
}

#[tokio::test]
async fn notifications_keep_evacuation_flag_and_clear_device_on_opt_in() {
  let s = store().await;
  s.set_evacuation_assistance(OWNER, Indicator::Yes).await.unwrap();

  let opted_out = s
    .set_notifications(OWNER, NotificationSettings {
      external_email:  Some("george@gmail.com".into()),
      primary_phone:   Some("5035552345".into()),
      alternate_phone: None,
      sms_status:      Indicator::No,
      sms_device:      Some("2438574938".into()),
    })
    .await
    .unwrap();
  assert_eq!(opted_out.sms_device.as_deref(), Some("2438574938"));
  assert_eq!(opted_out.evacuation_assistance, Some(Indicator::Yes));

  let opted_in = s
    .set_notifications(OWNER, NotificationSettings {
      external_email:  None,
      primary_phone:   Some("5035552345".into()),
      alternate_phone: None,
      sms_status:      Indicator::Yes,
      sms_device:      Some("2438574938".into()),
    })
    .await
    .unwrap();
  assert_eq!(opted_in.sms_status, Some(Indicator::Yes));
  assert_eq!(opted_in.sms_device, None);
  assert_eq!(opted_in.external_email, None);
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reference_tables_are_seeded() {
  let s = store().await;

  let relations = s.list_relations().await.unwrap();
  assert_eq!(relations.len(), 7);
  assert!(
    relations
      .iter()
      .any(|r| r.code == "S" && r.description.as_deref() == Some("Spouse"))
  );

  assert!(s.list_nations().await.unwrap().iter().any(|n| n.code == "LUS"));
  assert_eq!(s.list_states().await.unwrap().len(), 51);

  assert_eq!(
    s.find_relation("G".into()).await.unwrap().and_then(|r| r.description),
    Some("Guardian".into())
  );
  assert!(s.find_relation("Q".into()).await.unwrap().is_none());
  assert!(s.find_nation("LUS".into()).await.unwrap().is_some());
  assert!(s.find_nation("XXX".into()).await.unwrap().is_none());
  assert_eq!(
    s.find_state("OR".into()).await.unwrap().and_then(|st| st.name),
    Some("Oregon".into())
  );
}
