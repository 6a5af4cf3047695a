mod choice_types;
mod closure;
mod dependencies;
mod path_tree;
mod primitives;
mod superclass;

pub use choice_types::*;
pub use closure::*;
pub use dependencies::*;
pub use path_tree::*;
pub use primitives::*;
pub use superclass::*;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::emit::ModelEmitter;
use crate::error::{ModelGenError, Result};
use crate::provider::{DefinitionIndex, SchemaDialect};
use crate::types::{
    CompiledDefinition, CompositeDescriptor, CompositeKey, ItemDescriptor, PrimitiveDescriptor,
    TypeCatalog,
};

/// Identifiers an attribute name may not take verbatim.
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Definition whose missing superclass is not an error
    pub ultimate_base: String,
    pub reserved_words: Vec<String>,
    pub escape_suffix: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            ultimate_base: "Resource".to_string(),
            reserved_words: RUST_KEYWORDS.iter().map(|w| w.to_string()).collect(),
            escape_suffix: "_".to_string(),
        }
    }
}

impl CompilerConfig {
    pub fn with_ultimate_base(mut self, name: impl Into<String>) -> Self {
        self.ultimate_base = name.into();
        self
    }

    pub fn with_reserved_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_escape_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.escape_suffix = suffix.into();
        self
    }
}

/// Compiles definitions of one schema source against one type catalog.
///
/// The schema dialect is fixed when the compiler is created, so every
/// definition of a run resolves its superclass the same way.
#[derive(Debug)]
pub struct ModelCompiler<'a> {
    index: &'a DefinitionIndex,
    catalog: &'a TypeCatalog,
    config: CompilerConfig,
    naming: AttributeNaming,
    dialect: SchemaDialect,
}

impl<'a> ModelCompiler<'a> {
    pub fn new(index: &'a DefinitionIndex, catalog: &'a TypeCatalog) -> Self {
        Self::with_config(index, catalog, CompilerConfig::default())
    }

    pub fn with_config(
        index: &'a DefinitionIndex,
        catalog: &'a TypeCatalog,
        config: CompilerConfig,
    ) -> Self {
        let dialect = index.dialect();
        tracing::debug!(
            "Compiler ready: {} definitions, {:?} dialect",
            index.len(),
            dialect
        );
        Self {
            index,
            catalog,
            naming: AttributeNaming::new(&config),
            config,
            dialect,
        }
    }

    pub fn dialect(&self) -> SchemaDialect {
        self.dialect
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TypeCatalog {
        self.catalog
    }

    /// Compiles a single definition without following its dependencies.
    pub fn compile(&self, name: &str) -> Result<CompiledDefinition> {
        if name.trim().is_empty() {
            return Err(ModelGenError::validation("definition name is empty"));
        }
        let entry = self.index.require(name)?;
        let superclasses = SuperclassResolver::new(self.dialect, &self.config.ultimate_base);
        PathTreeBuilder::new(self.catalog, &self.naming, &superclasses).build(entry)
    }

    /// Compiles `roots` and their transitive dependencies, handing each
    /// compiled definition to `emitter` in processing order.
    pub fn compile_closure<S, E>(&self, roots: &[S], emitter: &mut E) -> Result<Vec<String>>
    where
        S: AsRef<str>,
        E: ModelEmitter + ?Sized,
    {
        ClosureDriver::new(self, emitter).run(roots)
    }

    pub fn compile_primitives(&self) -> Vec<PrimitiveDescriptor> {
        compile_primitives(self.index, self.catalog)
    }

    /// Full generation run: primitives, then the closure, then the index.
    pub fn generate<S, E>(&self, roots: &[S], emitter: &mut E) -> Result<Vec<String>>
    where
        S: AsRef<str>,
        E: ModelEmitter + ?Sized,
    {
        closure::validate_roots(roots)?;
        for primitive in self.compile_primitives() {
            emitter.emit_primitive(&primitive)?;
        }
        let processed = self.compile_closure(roots, emitter)?;
        emitter.finish(&processed)?;
        Ok(processed)
    }
}

/// Compiles one definition with the default compiler settings.
pub fn compile_one(
    name: &str,
    index: &DefinitionIndex,
    catalog: &TypeCatalog,
) -> Result<(
    ItemDescriptor,
    IndexMap<CompositeKey, CompositeDescriptor>,
    BTreeSet<String>,
)> {
    ModelCompiler::new(index, catalog)
        .compile(name)
        .map(CompiledDefinition::into_parts)
}

/// Compiles the dependency closure of `roots` with the default compiler settings.
pub fn compile_closure<S, E>(
    roots: &[S],
    index: &DefinitionIndex,
    catalog: &TypeCatalog,
    emitter: &mut E,
) -> Result<Vec<String>>
where
    S: AsRef<str>,
    E: ModelEmitter + ?Sized,
{
    ModelCompiler::new(index, catalog).compile_closure(roots, emitter)
}
