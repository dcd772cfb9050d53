//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Database: SQLite store
//! - Plugins: Dynamic plugin loading
//! - Adapters: Platform integrations

pub mod adapters;
pub mod config;
pub mod database;
pub mod plugins;
