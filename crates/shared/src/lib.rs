//! Shared utilities and common types for the Lastmile backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Coordinate and telemetry field validation
//! - Cursor-based pagination helpers

pub mod pagination;
pub mod validation;
