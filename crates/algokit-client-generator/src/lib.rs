//! # AlgoKit client generator
//!
//! Generates typed Python application clients from ARC-32 and ARC-56
//! application specifications. The generated module wraps the
//! `algokit_utils` v3 `AppClient`, `AppFactory` and `TransactionComposer`
//! APIs with dataclasses and per-method builders derived from the contract.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use algokit_client_generator::{ClientGenerator, GeneratorConfig, GenerationMode};
//!
//! let generator = ClientGenerator::new(
//!     GeneratorConfig::default().with_mode(GenerationMode::Minimal),
//! );
//! generator.generate_to_file("HelloWorld.arc56.json", "hello_world_client.py")?;
//! ```
//!
//! ## Modules
//!
//! - [`document`] - The line-oriented document model generators emit into
//! - [`naming`] - Identifier sanitization and collision-free name allocation
//! - [`type_mapping`] - ABI and AVM types to Python annotations
//! - [`spec_model`] - Structs, classified methods and state resolved from a spec
//! - [`context`] - Everything one generation run decides up front
//! - [`build_helper`] - Batch generation over directories of specs
//!
//! Generation runs as a pipeline: the spec is normalized to ARC-56, a
//! [`GeneratorContext`] resolves names and types once, and a fixed list of
//! section generators renders the module in order.

#![forbid(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod build_helper;
pub mod config;
pub mod context;
pub mod document;
mod driver;
pub mod error;
mod generators;
pub mod naming;
pub mod spec_model;
pub mod type_mapping;

pub use build_helper::{BatchReport, BuildConfig};
pub use config::{GenerationMode, GeneratorConfig, NamingPolicy};
pub use context::GeneratorContext;
pub use document::{Document, Part};
pub use driver::ClientGenerator;
pub use error::{GeneratorError, GeneratorResult};
pub use naming::{Sanitizer, SymbolPool};
pub use type_mapping::{TypeMapper, TypePosition, ValueType};
