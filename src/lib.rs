//! Climate Hub library.
//!
//! This library provides the core functionality for collecting
//! temperature/humidity telemetry from a Home Assistant instance,
//! retaining it with a bounded window, and aggregating sensors into
//! per-location groups for a dashboard.

pub mod classify;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetcher;
pub mod grouping;
pub mod model;
pub mod source;
pub mod storage;
