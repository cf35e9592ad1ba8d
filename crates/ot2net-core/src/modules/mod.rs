//! Configuration, logging and audit persistence.

pub mod audit_db;
pub mod config;
pub mod logger;

pub use audit_db::{AuditLog, SqliteAuditLog};
