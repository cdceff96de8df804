//! Compliance-audit management core: the audit lifecycle state machine,
//! closure validation, standard-weight configuration, and progress
//! aggregation, exposed behind port traits so adapters stay thin.

pub mod audits;
pub mod config;
pub mod error;
pub mod telemetry;
