//! vitrine: storefront search request compiler.
//!
//! Loads layered container configuration, resolves logical field names
//! through the index mapping and compiles search calls into engine request
//! bodies. This crate holds the command-line front end; the compilation
//! itself lives in the `vitrine-*` library crates.

#![warn(missing_docs)]

pub mod cli;
