//! Emission collaborators.
//!
//! The compiler hands every primitive and compiled definition to a
//! [`ModelEmitter`]; what happens to them (rendering, serialization,
//! collection) is up to the emitter.

mod json;

pub use json::{JsonModelEmitter, MANIFEST_FILE, ModelManifest};

use crate::error::Result;
use crate::types::{CompiledDefinition, PrimitiveDescriptor};

/// Receives compiled output in processing order.
pub trait ModelEmitter {
    fn emit_primitive(&mut self, primitive: &PrimitiveDescriptor) -> Result<()>;

    /// Called once per compiled definition, with its composites and dependencies.
    fn emit_definition(&mut self, compiled: &CompiledDefinition) -> Result<()>;

    /// Called after the closure with the final, sorted processed names.
    fn finish(&mut self, _processed: &[String]) -> Result<()> {
        Ok(())
    }
}

/// Keeps everything it is handed in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingEmitter {
    pub primitives: Vec<PrimitiveDescriptor>,
    pub definitions: Vec<CompiledDefinition>,
    pub finished: Option<Vec<String>>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Definition names in emission order.
    pub fn emitted_names(&self) -> Vec<&str> {
        self.definitions.iter().map(CompiledDefinition::name).collect()
    }

    pub fn definition(&self, name: &str) -> Option<&CompiledDefinition> {
        self.definitions.iter().find(|compiled| compiled.name() == name)
    }
}

impl ModelEmitter for CollectingEmitter {
    fn emit_primitive(&mut self, primitive: &PrimitiveDescriptor) -> Result<()> {
        self.primitives.push(primitive.clone());
        Ok(())
    }

    fn emit_definition(&mut self, compiled: &CompiledDefinition) -> Result<()> {
        self.definitions.push(compiled.clone());
        Ok(())
    }

    fn finish(&mut self, processed: &[String]) -> Result<()> {
        self.finished = Some(processed.to_vec());
        Ok(())
    }
}
