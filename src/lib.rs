//! joc-report: journey-of-change outcomes report with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;

#[cfg(test)]
pub(crate) mod fixtures;
