//! Quarry CLI - search container image registries.

pub mod commands;
pub mod output;
