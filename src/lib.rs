#![warn(
    clippy::pedantic,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

//! `demitasse` reads JVM class files into an immutable in-memory model and provides the typed
//! slot model (operand stacks, local variables, frames) that a bytecode interpreter runs on.
//!
//! ```no_run
//! use demitasse::jvm::Class;
//!
//! let bytes = std::fs::read("Hello.class")?;
//! let class = Class::parse(&bytes)?;
//! println!("{} extends {:?}", class.binary_name()?, class.super_class()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//! ## Features
#![doc = document_features::document_features!()]

pub mod jvm;
pub(crate) mod macros;
pub mod runtime;
pub mod types;

/// Test utilities
#[cfg(test)]
pub mod tests;
