//! Core types and trait definitions for the invasive-species hotline
//! notification subsystem.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod comment;
pub mod error;
pub mod links;
pub mod mailer;
pub mod query;
pub mod report;
pub mod store;
pub mod subscription;
pub mod user;

pub use error::{MailError, QueryParseError};
