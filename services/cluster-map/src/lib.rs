//! Customer cluster map service library.
//!
//! Exposes the loader, configuration and replay modules for testing.

pub mod config;
pub mod loader;
pub mod replay;
