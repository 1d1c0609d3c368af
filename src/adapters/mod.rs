//! Infrastructure adapters. Implement ports.
//!
//! Stores, exporters, terminal UI. Map errors to DomainError.

pub mod export;
pub mod persistence;
pub mod ui;
