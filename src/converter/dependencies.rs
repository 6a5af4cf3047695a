use std::collections::BTreeSet;

use crate::types::catalog::OBJECT_SENTINEL;
use crate::types::{TypeCatalog, TypeClass};

/// What one compiled definition requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedDependencies {
    pub primitives: BTreeSet<String>,
    pub composites: BTreeSet<String>,
    /// Composite types referenced plus the superclass
    pub dependencies: BTreeSet<String>,
}

/// Accumulates type requirements while a single definition is compiled.
#[derive(Debug)]
pub struct DependencyCollector<'a> {
    catalog: &'a TypeCatalog,
    collected: CollectedDependencies,
}

impl<'a> DependencyCollector<'a> {
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self {
            catalog,
            collected: CollectedDependencies::default(),
        }
    }

    /// Classifies a declared type code. Codes outside the catalog are kept
    /// on the attribute but never become dependencies.
    pub fn record_type(&mut self, code: &str) -> TypeClass {
        let class = self.catalog.classify(code);
        match class {
            TypeClass::Primitive => {
                self.collected.primitives.insert(code.to_string());
            }
            TypeClass::Composite => {
                self.collected.composites.insert(code.to_string());
                self.collected.dependencies.insert(code.to_string());
            }
            TypeClass::Unknown => {
                tracing::debug!("Type '{}' is not in the catalog", code);
            }
        }
        class
    }

    /// Adds the superclass unless it is a primitive or the `object` sentinel.
    pub fn record_superclass(&mut self, superclass: &str) {
        if superclass == OBJECT_SENTINEL || self.catalog.is_primitive(superclass) {
            return;
        }
        self.collected.dependencies.insert(superclass.to_string());
    }

    pub fn finish(self) -> CollectedDependencies {
        self.collected
    }
}
