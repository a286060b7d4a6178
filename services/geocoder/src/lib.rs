//! Coordinate backfill for customer CSV exports.
//!
//! Exposes the table, template, geocoder and backfill modules for testing.

pub mod backfill;
pub mod geocode;
pub mod table;
pub mod template;
