//! Payroll use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep console/CLI layers decoupled from storage details.

pub mod payroll_service;
