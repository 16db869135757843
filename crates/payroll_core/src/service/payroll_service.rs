//! Payroll service facade.
//!
//! # Responsibility
//! - Hold the in-memory roster for one session.
//! - Route each operation to the file store or one of the two database
//!   stores based on caller-supplied selectors.
//! - Reconcile the roster with persisted state after salary updates.
//!
//! # Invariants
//! - The facade contains no storage logic; it composes stores by
//!   delegation only.
//! - After a successful `update_salary`, the first roster record
//!   matching the name carries the new salary.
//! - Selector combinations with no backend mapping fail with
//!   `ServiceError::Unsupported` instead of silently doing nothing.

use crate::model::employee::{EmployeeRecord, NewEmployee};
use crate::repo::employee_store::{EmployeeStore, RepoError, UpdateMode};
use crate::repo::roster_file::RosterFile;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter, Write as _};

/// Backend selector for roster I/O operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoTarget {
    Console,
    File,
    Database,
}

impl Display for IoTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Console => "console",
            Self::File => "file",
            Self::Database => "database",
        };
        write!(f, "{label}")
    }
}

/// Chooses which of the two equivalent database schemas an operation
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    Denormalised,
    Normalised,
}

impl Display for SchemaVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Denormalised => "denormalised",
            Self::Normalised => "normalised",
        };
        write!(f, "{label}")
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure surface of the payroll facade.
#[derive(Debug)]
pub enum ServiceError {
    /// A persistence update affected zero rows.
    UpdateFailed { name: String },
    /// A lookup found no matching record where one was required.
    NotFound { name: String },
    /// The operation has no backend mapping for the given target.
    Unsupported {
        operation: &'static str,
        target: IoTarget,
    },
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpdateFailed { name } => {
                write!(f, "salary update for `{name}` affected no rows")
            }
            Self::NotFound { name } => {
                write!(f, "no stored record found for `{name}`")
            }
            Self::Unsupported { operation, target } => {
                write!(f, "operation `{operation}` is not supported for target `{target}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Service facade dispatching payroll operations across interchangeable
/// backends.
///
/// Stores are injected at construction; each is independently
/// constructible and testable with a fake. Roster lookups are keyed by
/// `name` with first-match-wins semantics; name uniqueness is not
/// enforced.
pub struct PayrollService<D, N, F>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    denormalised: D,
    normalised: N,
    file: F,
    roster: Vec<EmployeeRecord>,
}

impl<D, N, F> PayrollService<D, N, F>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    /// Creates a facade with an empty roster.
    pub fn new(denormalised: D, normalised: N, file: F) -> Self {
        Self::with_roster(denormalised, normalised, file, Vec::new())
    }

    /// Creates a facade seeded with an existing roster.
    pub fn with_roster(
        denormalised: D,
        normalised: N,
        file: F,
        roster: Vec<EmployeeRecord>,
    ) -> Self {
        Self {
            denormalised,
            normalised,
            file,
            roster,
        }
    }

    /// The in-memory roster held for the current session.
    pub fn roster(&self) -> &[EmployeeRecord] {
        &self.roster
    }

    /// Persists a new employee through the denormalised store and appends
    /// the created record to the roster.
    pub fn add_employee(&mut self, employee: &NewEmployee) -> ServiceResult<EmployeeRecord> {
        let record = self.denormalised.create(employee)?;
        info!(
            "event=add_employee module=service status=ok id={} name={}",
            record.id, record.name
        );
        self.roster.push(record.clone());
        Ok(record)
    }

    /// Reads a roster snapshot from the selected backend.
    ///
    /// The Database branch replaces the in-memory roster with the full
    /// store contents. The File branch returns a detached list and leaves
    /// the roster untouched.
    pub fn read_roster(
        &mut self,
        source: IoTarget,
        variant: SchemaVariant,
    ) -> ServiceResult<Vec<EmployeeRecord>> {
        match source {
            IoTarget::File => {
                let snapshot = self.file.read_all()?;
                info!(
                    "event=read_roster module=service status=ok source=file count={}",
                    snapshot.len()
                );
                Ok(snapshot)
            }
            IoTarget::Database => {
                let records = self.db_store(variant).read_all()?;
                self.roster = records;
                info!(
                    "event=read_roster module=service status=ok source=database variant={variant} count={}",
                    self.roster.len()
                );
                Ok(self.roster.clone())
            }
            IoTarget::Console => Err(unsupported_target("read_roster", source)),
        }
    }

    /// Writes the current roster to the selected backend.
    pub fn write_roster(&self, target: IoTarget) -> ServiceResult<()> {
        match target {
            IoTarget::Console => {
                println!("{}", render_roster(&self.roster));
                Ok(())
            }
            IoTarget::File => {
                self.file.write_all(&self.roster)?;
                info!(
                    "event=write_roster module=service status=ok target=file count={}",
                    self.roster.len()
                );
                Ok(())
            }
            IoTarget::Database => Err(unsupported_target("write_roster", target)),
        }
    }

    /// Returns the record count of the selected backend.
    pub fn count_entries(&self, source: IoTarget) -> ServiceResult<usize> {
        match source {
            IoTarget::File => Ok(self.file.count()?),
            other => Err(unsupported_target("count_entries", other)),
        }
    }

    /// Updates the stored salary for `name`, then reconciles the roster.
    ///
    /// Fails with [`ServiceError::UpdateFailed`] when the store reports
    /// zero affected rows; the roster is left untouched in that case.
    /// When the store update succeeds but no roster record matches, the
    /// roster stays stale for that name and the divergence is logged.
    pub fn update_salary(
        &mut self,
        name: &str,
        salary: f64,
        mode: UpdateMode,
        variant: SchemaVariant,
    ) -> ServiceResult<()> {
        let affected = self.db_store(variant).update_salary(name, salary, mode)?;
        if affected == 0 {
            error!(
                "event=update_salary module=service status=error variant={variant} name={name} error_code=update_failed"
            );
            return Err(ServiceError::UpdateFailed {
                name: name.to_string(),
            });
        }

        match self.roster.iter_mut().find(|record| record.name == name) {
            Some(record) => {
                record.salary = salary;
                info!(
                    "event=update_salary module=service status=ok variant={variant} name={name} affected={affected}"
                );
            }
            None => {
                warn!(
                    "event=roster_stale module=service status=warn variant={variant} name={name} affected={affected}"
                );
            }
        }

        Ok(())
    }

    /// Checks whether the roster record for `name` matches the store's
    /// first record for that name, field-wise.
    ///
    /// Fails with [`ServiceError::NotFound`] when the store holds no
    /// record for `name`. A missing roster record compares unequal.
    pub fn is_in_sync_with_store(
        &self,
        name: &str,
        variant: SchemaVariant,
    ) -> ServiceResult<bool> {
        let stored = self.db_store(variant).find_by_name(name)?;
        let Some(first) = stored.first() else {
            return Err(ServiceError::NotFound {
                name: name.to_string(),
            });
        };

        Ok(self.find_in_roster(name) == Some(first))
    }

    /// Returns stored records whose start date lies in `[from, to]`.
    pub fn records_in_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ServiceResult<Vec<EmployeeRecord>> {
        Ok(self.denormalised.range_by_start_date(from, to)?)
    }

    /// Returns the mean salary per distinct gender label held in the
    /// database.
    pub fn average_salary_by_gender(
        &self,
        source: IoTarget,
    ) -> ServiceResult<HashMap<String, f64>> {
        match source {
            IoTarget::Database => Ok(self.denormalised.average_salary_by_gender()?),
            other => Err(unsupported_target("average_salary_by_gender", other)),
        }
    }

    fn db_store(&self, variant: SchemaVariant) -> &dyn EmployeeStore {
        match variant {
            SchemaVariant::Denormalised => &self.denormalised,
            SchemaVariant::Normalised => &self.normalised,
        }
    }

    fn find_in_roster(&self, name: &str) -> Option<&EmployeeRecord> {
        self.roster.iter().find(|record| record.name == name)
    }
}

fn unsupported_target(operation: &'static str, target: IoTarget) -> ServiceError {
    warn!(
        "event={operation} module=service status=error target={target} error_code=unsupported_target"
    );
    ServiceError::Unsupported { operation, target }
}

/// Renders a roster in the human-readable form used by console output.
pub fn render_roster(roster: &[EmployeeRecord]) -> String {
    let mut out = format!("payroll roster ({} entries)", roster.len());
    for record in roster {
        let _ = write!(
            out,
            "\n  id={} name={} salary={:.2} start_date={} gender={}",
            record.id, record.name, record.salary, record.start_date, record.gender
        );
    }
    out
}
