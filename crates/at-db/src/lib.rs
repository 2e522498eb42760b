//! Storage layer for the attendance tracker.
//!
//! Provides persistence for employees, punches and sessions using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The HTTP server wraps it in a
//! `Mutex<Database>`.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in ISO 8601 format with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). This ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)
//!
//! ## Action Storage
//!
//! The `action_type` column is free TEXT. Rows written by this crate always hold
//! one of the four recognized actions, but rows from elsewhere may not; those
//! surface as punches with no recognized action (see [`StoredPunch`]).

use std::path::Path;

use at_core::credentials::{hash_password, verify_password};
use at_core::{ActionType, Email, Employee, EmployeeId, Principal, Punch, Role};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// An employee with this email already exists.
    #[error("an employee with email {0} already exists")]
    DuplicateEmail(String),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp in {table} row {id}: {timestamp}")]
    TimestampParse {
        table: &'static str,
        id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored employee row failed validation.
    #[error("invalid employee row {employee_id}: {source}")]
    InvalidEmployee {
        employee_id: i64,
        #[source]
        source: at_core::ValidationError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An employee to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub email: Email,
    /// Plain-text local password, hashed before storage. `None` for accounts
    /// that only sign in through SSO.
    pub password: Option<String>,
    pub role: Role,
}

/// A punch as stored in the `attendance` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredPunch {
    pub id: i64,
    pub employee_id: EmployeeId,
    /// Raw action text; not necessarily a recognized [`ActionType`].
    pub action_type: String,
    pub timestamp: DateTime<Utc>,
}

impl Punch for StoredPunch {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn action(&self) -> Option<ActionType> {
        self.action_type.parse().ok()
    }
}

/// Accounts created by [`Database::seed_sample_employees`].
const SAMPLE_EMPLOYEES: [(&str, &str, &str, Role); 2] = [
    ("Jane Doe", "jane.doe@example.com", "password123", Role::Employee),
    ("Admin User", "admin@example.com", "adminpass", Role::Admin),
];

type EmployeeRow = (i64, String, String, String);
type PunchRow = (i64, i64, String, String);

const EMPLOYEE_COLUMNS: &str = "id, name, email, role";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT,
                role TEXT NOT NULL DEFAULT 'employee'
            );

            -- Attendance table: append-only punches
            -- action_type: 'login', 'logout', 'break_start' or 'break_end'
            -- timestamp: ISO 8601 format (e.g., '2024-01-15T10:30:00.000Z')
            CREATE TABLE IF NOT EXISTS attendance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id INTEGER NOT NULL,
                action_type TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                FOREIGN KEY (employee_id) REFERENCES employees(id)
            );

            CREATE INDEX IF NOT EXISTS idx_attendance_employee_time
                ON attendance(employee_id, timestamp);

            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                employee_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
            );
            ",
        )?;
        Ok(())
    }

    /// Creates an employee, hashing the password if one is given.
    pub fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee, DbError> {
        if self.find_employee_by_email(&employee.email)?.is_some() {
            return Err(DbError::DuplicateEmail(employee.email.to_string()));
        }
        let password_hash = employee.password.as_deref().map(hash_password);
        self.conn.execute(
            "INSERT INTO employees (name, email, password_hash, role) VALUES (?, ?, ?, ?)",
            params![
                employee.name,
                employee.email.as_str(),
                password_hash,
                employee.role.as_str(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(employee_id = id, email = %employee.email, "inserted employee");
        Ok(Employee {
            id: EmployeeId::new(id),
            name: employee.name.clone(),
            email: employee.email.clone(),
            role: employee.role,
        })
    }

    /// Looks up an employee by id.
    pub fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>, DbError> {
        let row: Option<EmployeeRow> = self
            .conn
            .query_row(
                &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"),
                [id.get()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        row.map(employee_from_row).transpose()
    }

    /// Looks up an employee by email.
    pub fn find_employee_by_email(&self, email: &Email) -> Result<Option<Employee>, DbError> {
        let row: Option<EmployeeRow> = self
            .conn
            .query_row(
                &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = ?"),
                [email.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        row.map(employee_from_row).transpose()
    }

    /// Returns the employee if `password` matches their local credential.
    ///
    /// Employees without a local password (SSO-only) never match.
    pub fn verify_credentials(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Option<Employee>, DbError> {
        let stored: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT password_hash FROM employees WHERE email = ?",
                [email.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        match stored.flatten() {
            Some(hash) if verify_password(password, &hash) => self.find_employee_by_email(email),
            _ => Ok(None),
        }
    }

    /// Lists all employees ordered by id.
    pub fn list_employees(&self) -> Result<Vec<Employee>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(employee_from_row(row?)?);
        }
        Ok(employees)
    }

    /// Returns the employee with this email, creating an SSO-only employee if
    /// none exists.
    pub fn find_or_create_sso_employee(
        &self,
        email: &Email,
        name: &str,
    ) -> Result<Employee, DbError> {
        if let Some(existing) = self.find_employee_by_email(email)? {
            return Ok(existing);
        }
        tracing::info!(%email, "provisioning employee from SSO profile");
        self.insert_employee(&NewEmployee {
            name: name.to_string(),
            email: email.clone(),
            password: None,
            role: Role::Employee,
        })
    }

    /// Appends a punch for an employee.
    ///
    /// The timestamp is stored with millisecond precision; the returned punch
    /// carries the stored value.
    pub fn record_punch(
        &self,
        employee_id: EmployeeId,
        action: ActionType,
        at: DateTime<Utc>,
    ) -> Result<StoredPunch, DbError> {
        let timestamp = at.trunc_subsecs(3);
        self.conn.execute(
            "INSERT INTO attendance (employee_id, action_type, timestamp) VALUES (?, ?, ?)",
            params![employee_id.get(), action.as_str(), format_timestamp(timestamp)],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(punch_id = id, %employee_id, %action, "recorded punch");
        Ok(StoredPunch {
            id,
            employee_id,
            action_type: action.as_str().to_string(),
            timestamp,
        })
    }

    /// Lists all punches of an employee ordered by timestamp then id.
    pub fn list_punches(&self, employee_id: EmployeeId) -> Result<Vec<StoredPunch>, DbError> {
        self.list_punches_between(employee_id, None, None)
    }

    /// Lists an employee's punches within an optional time range.
    ///
    /// The range is inclusive of `since` and exclusive of `until`. A missing
    /// bound is unbounded.
    pub fn list_punches_between(
        &self,
        employee_id: EmployeeId,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredPunch>, DbError> {
        if let (Some(since), Some(until)) = (since, until) {
            if until <= since {
                return Ok(Vec::new());
            }
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT id, employee_id, action_type, timestamp
            FROM attendance
            WHERE employee_id = ?1
              AND (?2 IS NULL OR timestamp >= ?2)
              AND (?3 IS NULL OR timestamp < ?3)
            ORDER BY timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                employee_id.get(),
                since.map(format_timestamp),
                until.map(format_timestamp),
            ],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )?;
        let mut punches = Vec::new();
        for row in rows {
            punches.push(punch_from_row(row?)?);
        }
        Ok(punches)
    }

    /// Returns the most recent punch of an employee.
    pub fn last_punch(&self, employee_id: EmployeeId) -> Result<Option<StoredPunch>, DbError> {
        let row: Option<PunchRow> = self
            .conn
            .query_row(
                "
                SELECT id, employee_id, action_type, timestamp
                FROM attendance
                WHERE employee_id = ?
                ORDER BY timestamp DESC, id DESC
                LIMIT 1
                ",
                [employee_id.get()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        row.map(punch_from_row).transpose()
    }

    /// Opens a session for an employee and returns its token.
    pub fn create_session(&self, employee_id: EmployeeId) -> Result<String, DbError> {
        let token = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO sessions (token, employee_id, created_at) VALUES (?, ?, ?)",
            params![token, employee_id.get(), format_timestamp(Utc::now())],
        )?;
        Ok(token)
    }

    /// Resolves a session token to the signed-in principal.
    pub fn resolve_session(&self, token: &str) -> Result<Option<Principal>, DbError> {
        let row: Option<EmployeeRow> = self
            .conn
            .query_row(
                "
                SELECT e.id, e.name, e.email, e.role
                FROM sessions s
                JOIN employees e ON e.id = s.employee_id
                WHERE s.token = ?
                ",
                [token],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let employee = employee_from_row(row)?;
        Ok(Some(Principal {
            employee_id: employee.id,
            name: employee.name,
            role: employee.role,
        }))
    }

    /// Ends a session. Returns whether a session was removed.
    pub fn delete_session(&self, token: &str) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?", [token])?;
        Ok(removed > 0)
    }

    /// Creates the sample employee and admin accounts if missing.
    ///
    /// Returns the names of the accounts that were added.
    pub fn seed_sample_employees(&self) -> Result<Vec<String>, DbError> {
        let mut added = Vec::new();
        for (name, email, password, role) in SAMPLE_EMPLOYEES {
            let email = Email::new(email).map_err(|source| DbError::InvalidEmployee {
                employee_id: 0,
                source,
            })?;
            if self.find_employee_by_email(&email)?.is_some() {
                continue;
            }
            self.insert_employee(&NewEmployee {
                name: name.to_string(),
                email,
                password: Some(password.to_string()),
                role,
            })?;
            tracing::info!(name, "sample employee added");
            added.push(name.to_string());
        }
        Ok(added)
    }
}

fn employee_from_row((id, name, email, role): EmployeeRow) -> Result<Employee, DbError> {
    let invalid = |source| DbError::InvalidEmployee {
        employee_id: id,
        source,
    };
    Ok(Employee {
        id: EmployeeId::new(id),
        name,
        email: Email::new(email).map_err(invalid)?,
        role: role.parse().map_err(invalid)?,
    })
}

fn punch_from_row((id, employee_id, action_type, timestamp): PunchRow) -> Result<StoredPunch, DbError> {
    Ok(StoredPunch {
        id,
        employee_id: EmployeeId::new(employee_id),
        action_type,
        timestamp: parse_timestamp(&timestamp, "attendance", id)?,
    })
}

fn parse_timestamp(timestamp: &str, table: &'static str, id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            table,
            id: id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
