//! Internal helpers.

pub mod config;
