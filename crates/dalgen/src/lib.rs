//! # dalgen
//!
//! Schema-driven generator of C++ data-access classes.
//!
//! Given a class schema (typed attributes, relationships, single or multiple inheritance and
//! optional method implementations), dalgen emits one header and one body unit per class:
//! typed accessors backed by a runtime object store, printing, lazy initialization and
//! name-indexed dispatch. Classes generated by earlier runs are located through the manifest
//! each run leaves behind, or through explicit user overrides.
//!
//! ## Pipeline
//!
//! ```text
//! schema files ──► Schema
//!                    │
//!   generation set ──┤
//!                    ▼
//!  overrides + manifests ──► ClassResolver ──► ClassInfoMap (frozen)
//!                                                  │
//!                                                  ▼
//!                                  Emitter (.hpp / .cpp / dump) ──► files + manifest
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use dalgen::{Generator, GeneratorConfig};
//!
//! # fn main() -> dalgen::Result<()> {
//! let config = GeneratorConfig::new()
//!     .with_schema_file("schema/hw.json")
//!     .with_namespace("hw")
//!     .with_include_prefix("hw/dal")
//!     .with_output_dir("generated");
//!
//! let report = Generator::new(config).run()?;
//! println!("generated {} classes", report.class_count());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod emit;
pub mod error;
pub mod extract;
pub mod generator;
pub mod resolver;
pub mod sanitize;
pub mod schema;

// Re-export main types
pub use config::{GeneratorConfig, RuntimeContract};
pub use emit::{Emitter, GeneratedUnit, NamespaceTree};
pub use error::{GenError, ReferenceError, Result};
pub use extract::TextBlocks;
pub use generator::{GenerationReport, Generator, RenderedOutput};
pub use resolver::{ClassInfo, ClassInfoMap, ClassResolver, Manifest, UserOverride};
pub use sanitize::{alnum_name, capitalize_name};
pub use schema::{Schema, SchemaClass};
