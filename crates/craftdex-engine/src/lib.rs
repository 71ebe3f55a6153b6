//! Craftdex Engine - loading and configuration around the recipe service.
//!
//! This crate reads a catalog snapshot from disk, resolves configuration,
//! and exposes the command-line surface used by the `craftdex` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod catalog_loader;
pub mod cli;
pub mod config;
