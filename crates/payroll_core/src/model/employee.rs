//! Employee payroll domain model.
//!
//! # Responsibility
//! - Define the canonical employee record shared by all storage backends.
//! - Provide the creation request model used before a store assigns an id.
//!
//! # Invariants
//! - `id` is assigned by a database store and never re-used.
//! - `name` is the de facto lookup key for roster operations; it is not
//!   required to be unique, and first-match-wins semantics apply.
//! - `salary` is finite and non-negative for every persisted record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier assigned by a database store.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EmployeeId = i64;

/// Canonical payroll record as held in the roster and every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Store-assigned identifier. Not used for roster lookups.
    pub id: EmployeeId,
    /// Employee name, the roster lookup key.
    pub name: String,
    /// Current salary. Finite and >= 0.
    pub salary: f64,
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Free-form gender label, aggregated over by salary reports.
    pub gender: String,
}

/// Creation request for a record that has no identity yet.
///
/// Database stores consume this and hand back a full [`EmployeeRecord`]
/// carrying the assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub salary: f64,
    pub start_date: NaiveDate,
    pub gender: String,
}

pub type ValidationResult = Result<(), EmployeeValidationError>;

/// Validation failure raised before any write reaches a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeValidationError {
    EmptyName,
    InvalidSalary,
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "employee name must not be empty"),
            Self::InvalidSalary => write!(f, "employee salary must be finite and >= 0"),
        }
    }
}

impl Error for EmployeeValidationError {}

impl EmployeeRecord {
    /// Builds a record with a known identity, typically from a store row.
    pub fn new(
        id: EmployeeId,
        name: impl Into<String>,
        salary: f64,
        start_date: NaiveDate,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            salary,
            start_date,
            gender: gender.into(),
        }
    }

    /// Checks the model invariants shared by all write and read paths.
    pub fn validate(&self) -> ValidationResult {
        validate_fields(&self.name, self.salary)
    }
}

impl NewEmployee {
    pub fn new(
        name: impl Into<String>,
        salary: f64,
        start_date: NaiveDate,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            salary,
            start_date,
            gender: gender.into(),
        }
    }

    /// Checks the model invariants before a store assigns an id.
    pub fn validate(&self) -> ValidationResult {
        validate_fields(&self.name, self.salary)
    }
}

fn validate_fields(name: &str, salary: f64) -> ValidationResult {
    if name.trim().is_empty() {
        return Err(EmployeeValidationError::EmptyName);
    }
    if !salary.is_finite() || salary < 0.0 {
        return Err(EmployeeValidationError::InvalidSalary);
    }
    Ok(())
}
