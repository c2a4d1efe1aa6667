//! smsguard: terminal client for an SMS spam-classification service.
//!
//! Two controllers sit on top of a shared service client:
//!
//! - [`checker::Checker`] classifies a single message (`POST /predict`).
//! - [`history::HistoryController`] loads, filters, summarises, clears and
//!   exports past predictions (`GET`/`DELETE /history`).
//!
//! Both render through pure view models so the terminal binding in [`cli`]
//! only prints.

pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod logging;
pub mod model;
pub mod service;
pub mod view;
