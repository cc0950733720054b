//! SQL schema for the Ember SQLite store.
//!
//! Executed once at connection startup. Idempotent, so reopening an existing
//! file is harmless.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Directory feed. Read-only from the service's point of view.
CREATE TABLE IF NOT EXISTS identities (
    pidm           INTEGER PRIMARY KEY,
    username       TEXT NOT NULL UNIQUE,
    email          TEXT,
    first_name     TEXT,
    last_name      TEXT,
    middle_initial TEXT
);

CREATE TABLE IF NOT EXISTS relations (
    code        TEXT PRIMARY KEY,
    description TEXT
);

CREATE TABLE IF NOT EXISTS nations (
    code TEXT PRIMARY KEY,
    name TEXT
);

CREATE TABLE IF NOT EXISTS states (
    code TEXT PRIMARY KEY,
    name TEXT
);

-- Per owner, priority is always exactly 1..N. Not declared UNIQUE: the
-- range UPDATE that renumbers siblings passes through duplicate states.
CREATE TABLE IF NOT EXISTS contacts (
    surrogate_id       INTEGER PRIMARY KEY,
    pidm               INTEGER NOT NULL,
    priority           INTEGER NOT NULL CHECK (priority >= 1),
    relation           TEXT REFERENCES relations(code),
    first_name         TEXT NOT NULL,
    last_name          TEXT NOT NULL,
    middle_initial     TEXT,
    street_line1       TEXT,
    street_line2       TEXT,
    street_line3       TEXT,
    city               TEXT,
    state_code         TEXT,
    zip                TEXT,
    nation_code        TEXT,
    phone_country_code TEXT,
    phone_area         TEXT,
    phone_number       TEXT,
    phone_ext          TEXT,
    activity_date      TEXT NOT NULL   -- RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS contacts_owner_idx ON contacts(pidm, priority);

-- At most one per person; never deleted.
CREATE TABLE IF NOT EXISTS profiles (
    pidm                  INTEGER PRIMARY KEY,
    evacuation_assistance TEXT CHECK (evacuation_assistance IN ('Y', 'N')),
    external_email        TEXT,
    campus_email          TEXT,
    primary_phone         TEXT,
    alternate_phone       TEXT,
    sms_status            TEXT CHECK (sms_status IN ('Y', 'N')),
    sms_device            TEXT,
    activity_date         TEXT NOT NULL,
    CHECK (sms_status IS NOT 'Y' OR sms_device IS NULL)
);

INSERT OR IGNORE INTO nations (code, name) VALUES
    ('LUS', 'United States of America'),
    ('LCA', 'Canada'),
    ('LMX', 'Mexico'),
    ('LUK', 'United Kingdom'),
    ('LIE', 'Ireland'),
    ('LFR', 'France'),
    ('LDE', 'Germany'),
    ('LJP', 'Japan'),
    ('LCN', 'China'),
    ('LKR', 'Korea, Republic of'),
    ('LIN', 'India'),
    ('LVN', 'Vietnam'),
    ('LAU', 'Australia');

INSERT OR IGNORE INTO states (code, name) VALUES
    ('AL', 'Alabama'),        ('AK', 'Alaska'),         ('AZ', 'Arizona'),
    ('AR', 'Arkansas'),       ('CA', 'California'),     ('CO', 'Colorado'),
    ('CT', 'Connecticut'),    ('DE', 'Delaware'),       ('DC', 'District of Columbia'),
    ('FL', 'Florida'),        ('GA', 'Georgia'),        ('HI', 'Hawaii'),
    ('ID', 'Idaho'),          ('IL', 'Illinois'),       ('IN', 'Indiana'),
    ('IA', 'Iowa'),           ('KS', 'Kansas'),         ('KY', 'Kentucky'),
    ('LA', 'Louisiana'),      ('ME', 'Maine'),          ('MD', 'Maryland'),
    ('MA', 'Massachusetts'),  ('MI', 'Michigan'),       ('MN', 'Minnesota'),
    ('MS', 'Mississippi'),    ('MO', 'Missouri'),       ('MT', 'Montana'),
    ('NE', 'Nebraska'),       ('NV', 'Nevada'),         ('NH', 'New Hampshire'),
    ('NJ', 'New Jersey'),     ('NM', 'New Mexico'),     ('NY', 'New York'),
    ('NC', 'North Carolina'), ('ND', 'North Dakota'),   ('OH', 'Ohio'),
    ('OK', 'Oklahoma'),       ('OR', 'Oregon'),         ('PA', 'Pennsylvania'),
    ('RI', 'Rhode Island'),   ('SC', 'South Carolina'), ('SD', 'South Dakota'),
    ('TN', 'Tennessee'),      ('TX', 'Texas'),          ('UT', 'Utah'),
    ('VT', 'Vermont'),        ('VA', 'Virginia'),       ('WA', 'Washington'),
    ('WV', 'West Virginia'),  ('WI', 'Wisconsin'),      ('WY', 'Wyoming');

PRAGMA user_version = 1;
";
