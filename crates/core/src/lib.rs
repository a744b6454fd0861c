//! Core of the trending video service: the record model, view-count
//! normalization, read queries and the background refresh orchestrator.
//!
//! Adapters implement the traits in [`ports`]; nothing in this crate touches
//! HTTP or knows where the backing file lives.

pub mod application;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod ports;
pub mod refresh;
