/*!
 * Core Module
 * Shared error handling and configuration
 */

pub mod config;
pub mod errors;

// Re-export for convenience
pub use config::ManagerConfig;
pub use errors::*;
