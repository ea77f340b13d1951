//! Notification matching and dispatch engine for the invasive-species
//! hotline.
//!
//! The view/form layer commits its write (report, comment, invite,
//! subscription reassignment) and then calls one [`Engine`] trigger; the
//! engine queues the work and returns immediately. A worker loop drains the
//! queue and runs each dispatch asynchronously, so the triggering request
//! never observes — or waits on — notification outcomes.

pub mod config;
pub mod dispatch;
pub mod email;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod links;
pub mod mailers;
pub mod recipients;

pub use config::NotifyConfig;
pub use dispatch::{Dispatcher, RunSummary};
pub use engine::{Engine, Event};
pub use error::{Error, Result};
