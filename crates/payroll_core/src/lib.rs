//! Core domain logic for the employee payroll service.
//! This crate is the single source of truth for payroll invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::employee::{
    EmployeeId, EmployeeRecord, EmployeeValidationError, NewEmployee,
};
pub use repo::employee_store::{
    EmployeeStore, RepoError, RepoResult, SqliteDenormalisedStore, SqliteNormalisedStore,
    UpdateMode,
};
pub use repo::roster_file::{JsonRosterFile, RosterFile};
pub use service::payroll_service::{
    render_roster, IoTarget, PayrollService, SchemaVariant, ServiceError, ServiceResult,
};
