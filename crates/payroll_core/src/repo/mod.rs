//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contracts the payroll facade delegates to.
//! - Isolate SQLite and flat-file details from service orchestration.
//!
//! # Invariants
//! - Store writes must enforce model validation before persistence.
//! - Store reads return semantic errors (`InvalidData`) for corrupt
//!   persisted rows instead of masking them.

pub mod employee_store;
pub mod roster_file;
