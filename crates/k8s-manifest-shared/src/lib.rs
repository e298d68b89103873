//! This crate contains shared helpers and utilities used across other crates in this workspace.

pub mod yaml;
