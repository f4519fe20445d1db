//! shopgrid library
//!
//! This module exposes the catalog client, query cache, view state and
//! rendering for the binary and for integration tests.

pub mod app;
pub mod cli;
pub mod data;
pub mod filter;
pub mod logging;
pub mod query;
pub mod ui;
