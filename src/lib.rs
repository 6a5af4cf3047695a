//! # OctoFHIR ModelGen
//!
//! Compiles FHIR StructureDefinitions into nested, strongly-typed model trees
//! and computes the full dependency closure of a requested set of
//! definitions.
//!
//! ## Features
//!
//! - **Path trees**: flat dotted element paths become nested attribute trees
//! - **Inline composites**: `BackboneElement`/`Element` structures become named types
//! - **Choice types**: polymorphic `[x]` elements keep their declared alternatives
//! - **Both dialects**: base types from root type codes or `baseDefinition` URLs
//! - **Dependency closure**: superclasses and referenced composites, transitively
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use octofhir_modelgen::*;
//!
//! # fn example(bundle_json: &str) -> Result<()> {
//! let index = DefinitionIndex::from_json(bundle_json)?;
//! let catalog = TypeCatalog::fhir();
//!
//! let mut emitter = CollectingEmitter::new();
//! let processed = compile_closure(&["Patient"], &index, &catalog, &mut emitter)?;
//!
//! println!("{} definitions processed", processed.len());
//! for compiled in &emitter.definitions {
//!     println!("{} extends {}", compiled.item.name, compiled.item.superclass);
//! }
//! # Ok(())
//! # }
//! ```

pub mod converter;
pub mod core;
pub mod emit;
pub mod error;
pub mod provider;
pub mod types;
pub mod utils;

pub use converter::{CompilerConfig, ModelCompiler, compile_closure, compile_one};
pub use emit::{CollectingEmitter, JsonModelEmitter, ModelEmitter, ModelManifest};
pub use error::Result; // Our Result type takes precedence
pub use error::ModelGenError;
pub use provider::{DefinitionEntry, DefinitionIndex, SchemaDialect};
pub use types::*;
