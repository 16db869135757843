//! Employee store contract and SQLite implementations.
//!
//! # Responsibility
//! - Define the persistence operations the payroll facade relies on.
//! - Provide the denormalised and normalised SQLite stores behind one
//!   shared contract.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `update_salary` reports the affected row count; zero is a valid
//!   return at this layer, not an error.

use crate::db::DbError;
use crate::model::employee::{EmployeeRecord, EmployeeValidationError, NewEmployee};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DENORMALISED_SELECT_SQL: &str = "SELECT
    id,
    name,
    salary,
    start_date,
    gender
FROM employee_payroll";

const NORMALISED_SELECT_SQL: &str = "SELECT
    employees.id AS id,
    employees.name AS name,
    salaries.amount AS salary,
    employees.start_date AS start_date,
    employees.gender AS gender
FROM employees
JOIN salaries ON salaries.employee_id = employees.id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error shared by database and flat-file stores.
#[derive(Debug)]
pub enum RepoError {
    Validation(EmployeeValidationError),
    Db(DbError),
    Io(std::io::Error),
    Serde(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted employee data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// How a salary update statement is executed against SQLite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// One-shot statement, compiled per call.
    Direct,
    /// Cached prepared statement, reused across calls.
    Prepared,
}

/// Persistence contract the payroll facade delegates database work to.
pub trait EmployeeStore {
    /// Returns every stored record, ordered by id.
    fn read_all(&self) -> RepoResult<Vec<EmployeeRecord>>;
    /// Returns all records matching `name`, ordered by id.
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<EmployeeRecord>>;
    /// Sets the salary for every record matching `name` and returns the
    /// affected row count.
    fn update_salary(&self, name: &str, salary: f64, mode: UpdateMode) -> RepoResult<usize>;
    /// Persists a new employee and returns the record with its assigned id.
    fn create(&self, employee: &NewEmployee) -> RepoResult<EmployeeRecord>;
    /// Returns records whose start date lies in `[from, to]`, ordered by id.
    fn range_by_start_date(&self, from: NaiveDate, to: NaiveDate)
        -> RepoResult<Vec<EmployeeRecord>>;
    /// Returns the arithmetic mean salary per distinct gender label.
    fn average_salary_by_gender(&self) -> RepoResult<HashMap<String, f64>>;
}

/// Store over the single-table `employee_payroll` schema.
pub struct SqliteDenormalisedStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDenormalisedStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeStore for SqliteDenormalisedStore<'_> {
    fn read_all(&self) -> RepoResult<Vec<EmployeeRecord>> {
        collect_employees(
            self.conn,
            &format!("{DENORMALISED_SELECT_SQL} ORDER BY id;"),
            params![],
        )
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<EmployeeRecord>> {
        collect_employees(
            self.conn,
            &format!("{DENORMALISED_SELECT_SQL} WHERE name = ?1 ORDER BY id;"),
            params![name],
        )
    }

    fn update_salary(&self, name: &str, salary: f64, mode: UpdateMode) -> RepoResult<usize> {
        const SQL: &str = "UPDATE employee_payroll SET salary = ?1 WHERE name = ?2;";
        let changed = match mode {
            UpdateMode::Direct => self.conn.execute(SQL, params![salary, name])?,
            UpdateMode::Prepared => {
                let mut stmt = self.conn.prepare_cached(SQL)?;
                stmt.execute(params![salary, name])?
            }
        };
        Ok(changed)
    }

    fn create(&self, employee: &NewEmployee) -> RepoResult<EmployeeRecord> {
        employee.validate()?;

        self.conn.execute(
            "INSERT INTO employee_payroll (name, salary, start_date, gender)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                employee.name,
                employee.salary,
                employee.start_date,
                employee.gender,
            ],
        )?;

        Ok(EmployeeRecord::new(
            self.conn.last_insert_rowid(),
            employee.name.clone(),
            employee.salary,
            employee.start_date,
            employee.gender.clone(),
        ))
    }

    fn range_by_start_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<EmployeeRecord>> {
        collect_employees(
            self.conn,
            &format!("{DENORMALISED_SELECT_SQL} WHERE start_date BETWEEN ?1 AND ?2 ORDER BY id;"),
            params![from, to],
        )
    }

    fn average_salary_by_gender(&self) -> RepoResult<HashMap<String, f64>> {
        collect_gender_averages(
            self.conn,
            "SELECT gender, AVG(salary) FROM employee_payroll GROUP BY gender;",
        )
    }
}

/// Store over the split `employees`/`salaries` schema.
///
/// Carries the exact record contract of the denormalised store; the
/// schema split is invisible to callers.
pub struct SqliteNormalisedStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNormalisedStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeStore for SqliteNormalisedStore<'_> {
    fn read_all(&self) -> RepoResult<Vec<EmployeeRecord>> {
        collect_employees(
            self.conn,
            &format!("{NORMALISED_SELECT_SQL} ORDER BY employees.id;"),
            params![],
        )
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<EmployeeRecord>> {
        collect_employees(
            self.conn,
            &format!("{NORMALISED_SELECT_SQL} WHERE employees.name = ?1 ORDER BY employees.id;"),
            params![name],
        )
    }

    fn update_salary(&self, name: &str, salary: f64, mode: UpdateMode) -> RepoResult<usize> {
        const SQL: &str = "UPDATE salaries
             SET amount = ?1
             WHERE employee_id IN (SELECT id FROM employees WHERE name = ?2);";
        let changed = match mode {
            UpdateMode::Direct => self.conn.execute(SQL, params![salary, name])?,
            UpdateMode::Prepared => {
                let mut stmt = self.conn.prepare_cached(SQL)?;
                stmt.execute(params![salary, name])?
            }
        };
        Ok(changed)
    }

    fn create(&self, employee: &NewEmployee) -> RepoResult<EmployeeRecord> {
        employee.validate()?;

        // Identity and salary rows must land together or not at all,
        // otherwise the join contract would silently drop the record.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO employees (name, gender, start_date) VALUES (?1, ?2, ?3);",
            params![employee.name, employee.gender, employee.start_date],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO salaries (employee_id, amount) VALUES (?1, ?2);",
            params![id, employee.salary],
        )?;
        tx.commit()?;

        Ok(EmployeeRecord::new(
            id,
            employee.name.clone(),
            employee.salary,
            employee.start_date,
            employee.gender.clone(),
        ))
    }

    fn range_by_start_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<EmployeeRecord>> {
        collect_employees(
            self.conn,
            &format!(
                "{NORMALISED_SELECT_SQL}
                 WHERE employees.start_date BETWEEN ?1 AND ?2
                 ORDER BY employees.id;"
            ),
            params![from, to],
        )
    }

    fn average_salary_by_gender(&self) -> RepoResult<HashMap<String, f64>> {
        collect_gender_averages(
            self.conn,
            "SELECT employees.gender, AVG(salaries.amount)
             FROM employees
             JOIN salaries ON salaries.employee_id = employees.id
             GROUP BY employees.gender;",
        )
    }
}

fn collect_employees(
    conn: &Connection,
    sql: &str,
    bind: impl rusqlite::Params,
) -> RepoResult<Vec<EmployeeRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(bind)?;
    let mut employees = Vec::new();

    while let Some(row) = rows.next()? {
        employees.push(parse_employee_row(row)?);
    }

    Ok(employees)
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<EmployeeRecord> {
    let record = EmployeeRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        salary: row.get("salary")?,
        start_date: row.get("start_date")?,
        gender: row.get("gender")?,
    };

    record.validate().map_err(|err| {
        RepoError::InvalidData(format!("employee row id={}: {err}", record.id))
    })?;

    Ok(record)
}

fn collect_gender_averages(conn: &Connection, sql: &str) -> RepoResult<HashMap<String, f64>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut averages = HashMap::new();

    while let Some(row) = rows.next()? {
        let gender: String = row.get(0)?;
        let average: f64 = row.get(1)?;
        averages.insert(gender, average);
    }

    Ok(averages)
}
