//! HTTP and tool-call gateway for the alert core.
//!
//! The REST surface lives in [`api`], the LLM tool catalogue and dispatcher in
//! [`tools`]; both are thin adapters over `alertdesk_alert`.

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod sample_seed;
pub mod state;
pub mod tools;
