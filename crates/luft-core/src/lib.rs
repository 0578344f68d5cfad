//! Core ingestion and day-resolution pipeline for the PM2.5 forecast map
//!
//! This crate folds loosely-typed sensor rows into consolidated per-sensor
//! records, derives the forecast day index, and resolves the single value
//! to display for a (sensor, day) pair. It performs no I/O: sources hand
//! in rows, presentation layers consume records and resolved values.

pub mod alias;
pub mod days;
pub mod display;
pub mod observer;
pub mod row;
pub mod store;

pub use days::*;
pub use display::*;
pub use observer::*;
pub use row::*;
pub use store::*;
