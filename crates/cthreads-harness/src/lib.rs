//! Conformance harness for cthreads.
//!
//! This crate provides:
//! - Properties: observable guarantees of each primitive, run against the
//!   backend compiled for the host
//! - Structured logging: one JSONL record per property run
//! - Configuration: thread/iteration knobs with an environment-selected profile

#![forbid(unsafe_code)]

pub mod config;
pub mod conformance;
pub mod structured_log;

pub use config::{HarnessConfig, Profile};
pub use conformance::{ConformanceSuite, Property, PropertyResult, SuiteReport};
pub use structured_log::{HarnessError, LogEmitter, LogEntry};
