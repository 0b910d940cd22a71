//! Aggregation and submission workflows behind the medical compensation explorer.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
