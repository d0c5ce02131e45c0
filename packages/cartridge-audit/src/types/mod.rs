//! Data types for package analysis.

pub mod config;
pub mod finding;
pub mod inventory;
pub mod module;
pub mod objects;
pub mod package;
pub mod resource;
