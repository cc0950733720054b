//! [`SqliteStore`], the SQLite implementation of [`EmergencyStore`].

use std::path::Path;

use chrono::Utc;
use ember_core::{
  contact::{Contact, NewContact, RelationCode, SurrogateId, Upsert},
  identity::{Identity, Pidm},
  priority::{self, Shift},
  profile::{Indicator, NotificationSettings, Profile},
  reference::{Nation, Relation, State},
  store::EmergencyStore,
};
use rusqlite::{OptionalExtension as _, Transaction, TransactionBehavior};
use strum::IntoEnumIterator as _;

use crate::{
  Result,
  encode::{
    CONTACT_COLUMNS, IDENTITY_COLUMNS, PROFILE_COLUMNS, RawContact, RawProfile,
    encode_dt, identity_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Ember store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        let mut insert = conn.prepare(
          "INSERT OR IGNORE INTO relations (code, description) VALUES (?1, ?2)",
        )?;
        for relation in RelationCode::iter() {
          insert.execute(rusqlite::params![relation.code(), relation.description()])?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_reference<T: Send + 'static>(
    &self,
    sql: &'static str,
    build: fn(String, Option<String>) -> T,
  ) -> Result<Vec<T>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |r| Ok(build(r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn find_reference<T: Send + 'static>(
    &self,
    sql: &'static str,
    code: String,
    build: fn(String, Option<String>) -> T,
  ) -> Result<Option<T>> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, [&code], |r| Ok(build(r.get(0)?, r.get(1)?)))
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  async fn read_profile(&self, owner: Pidm) -> Result<Option<Profile>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_profile(conn, owner)?))
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }
}

// ─── Transaction helpers ─────────────────────────────────────────────────────

/// Carry a domain error out of a connection closure. Unwrapped again by
/// `From<tokio_rusqlite::Error> for Error`.
fn rule(err: ember_core::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(err))
}

fn immediate(conn: &mut rusqlite::Connection) -> rusqlite::Result<Transaction<'_>> {
  conn.transaction_with_behavior(TransactionBehavior::Immediate)
}

fn count_contacts(tx: &Transaction<'_>, owner: Pidm) -> rusqlite::Result<u32> {
  tx.query_row(
    "SELECT COUNT(*) FROM contacts WHERE pidm = ?1",
    [owner.0],
    |r| r.get(0),
  )
}

fn apply_shift(
  tx: &Transaction<'_>,
  owner: Pidm,
  shift: Option<Shift>,
) -> rusqlite::Result<()> {
  if let Some(Shift { from, to, delta }) = shift {
    tx.execute(
      "UPDATE contacts SET priority = priority + ?1
       WHERE pidm = ?2 AND priority BETWEEN ?3 AND ?4",
      rusqlite::params![delta, owner.0, from, to],
    )?;
  }
  Ok(())
}

/// Re-read the owner's priorities and refuse to commit unless they are
/// exactly `1..=N`.
fn verify_order(tx: &Transaction<'_>, owner: Pidm) -> tokio_rusqlite::Result<()> {
  let mut stmt = tx.prepare("SELECT priority FROM contacts WHERE pidm = ?1")?;
  let priorities = stmt
    .query_map([owner.0], |r| r.get::<_, u32>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  priority::check_contiguous(priorities).map_err(|e| {
    tracing::error!(pidm = %owner, error = %e, "contact ordering broken; rolling back");
    rule(e)
  })
}

fn select_contact(
  conn: &rusqlite::Connection,
  id: SurrogateId,
) -> rusqlite::Result<Option<RawContact>> {
  conn
    .query_row(
      &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE surrogate_id = ?1"),
      [id.0],
      RawContact::from_row,
    )
    .optional()
}

fn select_profile(
  conn: &rusqlite::Connection,
  owner: Pidm,
) -> rusqlite::Result<Option<RawProfile>> {
  conn
    .query_row(
      &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE pidm = ?1"),
      [owner.0],
      RawProfile::from_row,
    )
    .optional()
}

/// Insert or overwrite every column of one contact row.
fn write_contact(
  tx: &Transaction<'_>,
  id: SurrogateId,
  owner: Pidm,
  input: &NewContact,
  activity_date: &str,
) -> rusqlite::Result<()> {
  let address = input.address.as_ref();
  let phone = input.phone.as_ref();
  tx.execute(
    "INSERT INTO contacts (
       surrogate_id, pidm, priority, relation,
       first_name, last_name, middle_initial,
       street_line1, street_line2, street_line3, city, state_code, zip, nation_code,
       phone_country_code, phone_area, phone_number, phone_ext,
       activity_date
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
     ON CONFLICT(surrogate_id) DO UPDATE SET
       priority = excluded.priority,
       relation = excluded.relation,
       first_name = excluded.first_name,
       last_name = excluded.last_name,
       middle_initial = excluded.middle_initial,
       street_line1 = excluded.street_line1,
       street_line2 = excluded.street_line2,
       street_line3 = excluded.street_line3,
       city = excluded.city,
       state_code = excluded.state_code,
       zip = excluded.zip,
       nation_code = excluded.nation_code,
       phone_country_code = excluded.phone_country_code,
       phone_area = excluded.phone_area,
       phone_number = excluded.phone_number,
       phone_ext = excluded.phone_ext,
       activity_date = excluded.activity_date",
    rusqlite::params![
      id.0,
      owner.0,
      input.priority,
      input.relation.map(RelationCode::code),
      input.name.first_name,
      input.name.last_name,
      input.name.middle_initial,
      address.map(|a| &a.street_line1),
      address.and_then(|a| a.street_line2.as_ref()),
      address.and_then(|a| a.street_line3.as_ref()),
      address.map(|a| &a.city),
      address.and_then(|a| a.state_code.as_ref()),
      address.and_then(|a| a.zip.as_ref()),
      address.and_then(|a| a.nation_code.as_ref()),
      phone.and_then(|p| p.country_code.as_ref()),
      phone.map(|p| &p.area),
      phone.map(|p| &p.number),
      phone.and_then(|p| p.extension.as_ref()),
      activity_date,
    ],
  )?;
  Ok(())
}

// ─── EmergencyStore impl ─────────────────────────────────────────────────────

impl EmergencyStore for SqliteStore {
  type Error = crate::Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn add_identity(&self, identity: Identity) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT OR REPLACE INTO identities ({IDENTITY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
          ),
          rusqlite::params![
            identity.pidm.0,
            identity.username,
            identity.email,
            identity.first_name,
            identity.last_name,
            identity.middle_initial,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_identity_by_username(&self, username: String) -> Result<Option<Identity>> {
    let identity = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE username = ?1"),
              [&username],
              identity_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(identity)
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn list_contacts(&self, owner: Pidm) -> Result<Vec<Contact>> {
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts WHERE pidm = ?1 ORDER BY priority"
        ))?;
        let rows = stmt
          .query_map([owner.0], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn find_contact(&self, id: SurrogateId) -> Result<Option<Contact>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_contact(conn, id)?))
      .await?;
    raw.map(RawContact::into_contact).transpose()
  }

  async fn upsert_contact(
    &self,
    owner: Pidm,
    input: NewContact,
  ) -> Result<(Contact, Upsert)> {
    let now = encode_dt(Utc::now());

    let (raw, outcome) = self
      .conn
      .call(move |conn| {
        let tx = immediate(conn)?;
        let count = count_contacts(&tx, owner)?;

        let existing: Option<(i64, u32)> = match input.surrogate_id {
          Some(id) => tx
            .query_row(
              "SELECT pidm, priority FROM contacts WHERE surrogate_id = ?1",
              [id.0],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?,
          None => None,
        };

        let (id, outcome) = match (input.surrogate_id, existing) {
          (Some(id), Some((pidm, _))) if pidm != owner.0 => {
            return Err(rule(ember_core::Error::Forbidden(id)));
          }
          (Some(id), Some((_, old))) => {
            let shift = priority::plan_move(count, old, input.priority).map_err(rule)?;
            apply_shift(&tx, owner, shift)?;
            (id, Upsert::Updated)
          }
          (requested, _) => {
            let shift = priority::plan_insert(count, input.priority).map_err(rule)?;
            apply_shift(&tx, owner, shift)?;
            let id = match requested {
              Some(id) => id,
              None => SurrogateId(tx.query_row(
                "SELECT COALESCE(MAX(surrogate_id), 0) + 1 FROM contacts",
                [],
                |r| r.get(0),
              )?),
            };
            (id, Upsert::Created)
          }
        };

        write_contact(&tx, id, owner, &input, &now)?;
        verify_order(&tx, owner)?;

        let raw = select_contact(&tx, id)?.ok_or_else(|| {
          rule(ember_core::Error::InvariantViolation(format!(
            "contact {id} vanished during upsert"
          )))
        })?;
        tx.commit()?;
        Ok((raw, outcome))
      })
      .await?;

    Ok((raw.into_contact()?, outcome))
  }

  async fn delete_contact(&self, owner: Pidm, id: SurrogateId) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = immediate(conn)?;

        let (pidm, position): (i64, u32) = tx
          .query_row(
            "SELECT pidm, priority FROM contacts WHERE surrogate_id = ?1",
            [id.0],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?
          .ok_or_else(|| rule(ember_core::Error::ContactNotFound(id)))?;
        if pidm != owner.0 {
          return Err(rule(ember_core::Error::Forbidden(id)));
        }

        let count = count_contacts(&tx, owner)?;
        let shift = priority::plan_delete(count, position).map_err(rule)?;
        tx.execute("DELETE FROM contacts WHERE surrogate_id = ?1", [id.0])?;
        apply_shift(&tx, owner, shift)?;
        verify_order(&tx, owner)?;

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Profile ───────────────────────────────────────────────────────────────

  async fn get_profile(&self, owner: Pidm) -> Result<Option<Profile>> {
    self.read_profile(owner).await
  }

  async fn set_evacuation_assistance(
    &self,
    owner: Pidm,
    flag: Indicator,
  ) -> Result<Profile> {
    let now = encode_dt(Utc::now());
    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (pidm, evacuation_assistance, campus_email, activity_date)
           VALUES (?1, ?2, (SELECT email FROM identities WHERE pidm = ?1), ?3)
           ON CONFLICT(pidm) DO UPDATE SET
             evacuation_assistance = excluded.evacuation_assistance,
             activity_date = excluded.activity_date",
          rusqlite::params![owner.0, flag.as_str(), now],
        )?;
        select_profile(conn, owner)?
          .ok_or_else(|| tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows))
      })
      .await?;
    raw.into_profile()
  }

  async fn set_notifications(
    &self,
    owner: Pidm,
    settings: NotificationSettings,
  ) -> Result<Profile> {
    let now = encode_dt(Utc::now());
    let sms_device = match settings.sms_status {
      Indicator::Yes => None,
      Indicator::No => settings.sms_device,
    };

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             pidm, external_email, campus_email, primary_phone, alternate_phone,
             sms_status, sms_device, activity_date
           ) VALUES (?1, ?2, (SELECT email FROM identities WHERE pidm = ?1), ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT(pidm) DO UPDATE SET
             external_email = excluded.external_email,
             primary_phone = excluded.primary_phone,
             alternate_phone = excluded.alternate_phone,
             sms_status = excluded.sms_status,
             sms_device = excluded.sms_device,
             activity_date = excluded.activity_date",
          rusqlite::params![
            owner.0,
            settings.external_email,
            settings.primary_phone,
            settings.alternate_phone,
            settings.sms_status.as_str(),
            sms_device,
            now,
          ],
        )?;
        select_profile(conn, owner)?
          .ok_or_else(|| tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows))
      })
      .await?;
    raw.into_profile()
  }

  // ── Reference data ────────────────────────────────────────────────────────

  async fn list_relations(&self) -> Result<Vec<Relation>> {
    self
      .query_reference(
        "SELECT code, description FROM relations ORDER BY code",
        |code, description| Relation { code, description },
      )
      .await
  }

  async fn list_nations(&self) -> Result<Vec<Nation>> {
    self
      .query_reference("SELECT code, name FROM nations ORDER BY name", |code, name| {
        Nation { code, name }
      })
      .await
  }

  async fn list_states(&self) -> Result<Vec<State>> {
    self
      .query_reference("SELECT code, name FROM states ORDER BY name", |code, name| {
        State { code, name }
      })
      .await
  }

  async fn find_relation(&self, code: String) -> Result<Option<Relation>> {
    self
      .find_reference(
        "SELECT code, description FROM relations WHERE code = ?1",
        code,
        |code, description| Relation { code, description },
      )
      .await
  }

  async fn find_nation(&self, code: String) -> Result<Option<Nation>> {
    self
      .find_reference(
        "SELECT code, name FROM nations WHERE code = ?1",
        code,
        |code, name| Nation { code, name },
      )
      .await
  }

  async fn find_state(&self, code: String) -> Result<Option<State>> {
    self
      .find_reference(
        "SELECT code, name FROM states WHERE code = ?1",
        code,
        |code, name| State { code, name },
      )
      .await
  }
}
