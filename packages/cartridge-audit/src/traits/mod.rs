//! Core trait abstractions for package analysis.
//!
//! These traits define the external collaborators an application plugs in:
//! decompression of the package and the accessibility audit engine.

pub mod archive;
pub mod audit;
