//! Payroll domain model.
//!
//! # Responsibility
//! - Define canonical data structures shared by every storage backend.
//! - Keep one record shape so file and database stores stay
//!   interchangeable behind the service facade.
//!
//! # Invariants
//! - Records are validated before any write reaches a backend.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod employee;
