//! Flat dotted paths to a nested attribute tree.
//!
//! Records arrive ancestor-first. Each non-root record names the attribute
//! it defines by its last path segment and locates the attribute's parent
//! through the preceding segments, every one of which must already be an
//! inline composite. Inline composites are kept in an arena keyed by the
//! owning definition and the attribute path that introduced them.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::choice_types::{AttributeNaming, ChoiceTypeResolver};
use super::dependencies::DependencyCollector;
use super::superclass::SuperclassResolver;
use crate::error::{ModelGenError, Result};
use crate::provider::DefinitionEntry;
use crate::types::{
    AttributeKind, AttributeMap, AttributeNode, CompiledDefinition, CompositeDescriptor,
    CompositeKey, ElementRecord, ItemDescriptor, TypeCatalog,
};

/// Attribute map a record's attribute is placed into.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Container {
    Root,
    Composite(CompositeKey),
}

pub struct PathTreeBuilder<'a> {
    catalog: &'a TypeCatalog,
    naming: &'a AttributeNaming,
    superclasses: &'a SuperclassResolver<'a>,
}

/// Tree under construction for one definition.
struct TreeState<'e> {
    definition: &'e str,
    attributes: AttributeMap,
    composites: IndexMap<CompositeKey, CompositeDescriptor>,
}

impl TreeState<'_> {
    fn attributes(&self, container: &Container) -> Option<&AttributeMap> {
        match container {
            Container::Root => Some(&self.attributes),
            Container::Composite(key) => self.composites.get(key).map(|c| &c.attributes),
        }
    }

    fn attributes_mut(&mut self, container: &Container) -> Option<&mut AttributeMap> {
        match container {
            Container::Root => Some(&mut self.attributes),
            Container::Composite(key) => self.composites.get_mut(key).map(|c| &mut c.attributes),
        }
    }

    /// Removes the composite introduced at `path` and every composite nested in it.
    fn drop_composites_under(&mut self, path: &[String]) {
        self.composites.retain(|key, _| !key.path.starts_with(path));
    }

    fn warn_on_shared_composite_names(&self) {
        let mut seen = HashSet::new();
        for (key, composite) in &self.composites {
            if !seen.insert(composite.name.as_str()) {
                tracing::warn!(
                    "'{}' reuses composite name '{}' within '{}'",
                    key,
                    composite.name,
                    self.definition
                );
            }
        }
    }
}

impl<'a> PathTreeBuilder<'a> {
    pub fn new(
        catalog: &'a TypeCatalog,
        naming: &'a AttributeNaming,
        superclasses: &'a SuperclassResolver<'a>,
    ) -> Self {
        Self {
            catalog,
            naming,
            superclasses,
        }
    }

    pub fn build(&self, entry: &DefinitionEntry) -> Result<CompiledDefinition> {
        let superclass = self.superclasses.resolve(entry)?;

        let mut collector = DependencyCollector::new(self.catalog);
        collector.record_superclass(&superclass);

        let mut state = TreeState {
            definition: &entry.name,
            attributes: AttributeMap::new(),
            composites: IndexMap::new(),
        };
        let mut docstring = None;

        for record in &entry.records {
            if record.path.iter().all(|segment| segment.trim().is_empty()) {
                return Err(ModelGenError::schema_resolution(
                    &entry.name,
                    record.dotted_path(),
                    "element record has an empty path",
                ));
            }
            if record.is_root() {
                docstring = record.definition_text.clone();
                continue;
            }
            self.place(&mut state, record, &mut collector)?;
        }

        state.warn_on_shared_composite_names();

        let collected = collector.finish();
        tracing::debug!(
            "Compiled '{}': {} attributes, {} composites, {} dependencies",
            entry.name,
            state.attributes.len(),
            state.composites.len(),
            collected.dependencies.len()
        );

        Ok(CompiledDefinition {
            item: ItemDescriptor {
                name: entry.name.clone(),
                source_url: entry.url.clone(),
                superclass,
                docstring,
                attributes: state.attributes,
                required_primitive_types: collected.primitives,
                required_composite_types: collected.composites,
                dependencies: collected.dependencies,
            },
            composites: state.composites,
        })
    }

    fn place(
        &self,
        state: &mut TreeState<'_>,
        record: &ElementRecord,
        collector: &mut DependencyCollector<'_>,
    ) -> Result<()> {
        let Some((last, ancestors)) = record.relative_path().split_last() else {
            return Ok(());
        };

        let (container, mut key_path) = self.locate_parent(state, record, ancestors)?;
        let name = self.naming.attribute_name(last);

        let redeclared = state
            .attributes(&container)
            .is_some_and(|attributes| attributes.contains_key(&name));
        if redeclared {
            tracing::warn!(
                "'{}' is declared more than once, keeping the last declaration",
                record.dotted_path()
            );
            let mut replaced = key_path.clone();
            replaced.push(name.clone());
            state.drop_composites_under(&replaced);
        }

        if record.cardinality.is_inverted() {
            tracing::warn!(
                "'{}' declares min greater than max ({})",
                record.dotted_path(),
                record.cardinality
            );
        }

        let kind = ChoiceTypeResolver::resolve(record, collector).ok_or_else(|| {
            ModelGenError::schema_resolution(
                state.definition,
                record.dotted_path(),
                "no type, name reference or content reference",
            )
        })?;

        let kind = match kind {
            AttributeKind::Single(code)
                if code.profile.is_none() && self.catalog.is_composite_marker(&code.code) =>
            {
                key_path.push(name.clone());
                let key = CompositeKey::new(state.definition, key_path);
                state.composites.insert(
                    key.clone(),
                    CompositeDescriptor {
                        name: self.naming.composite_name(last),
                        superclass: code.code,
                        attributes: AttributeMap::new(),
                    },
                );
                AttributeKind::InlineComposite(key)
            }
            other => other,
        };

        let node = AttributeNode {
            name: name.clone(),
            cardinality: record.cardinality,
            kind,
        };

        let definition = state.definition;
        let target = state.attributes_mut(&container).ok_or_else(|| {
            ModelGenError::schema_resolution(
                definition,
                record.dotted_path(),
                "parent composite is missing from the arena",
            )
        })?;
        target.insert(name, node);
        Ok(())
    }

    /// Walks the ancestor segments down to the map the attribute belongs in.
    fn locate_parent(
        &self,
        state: &TreeState<'_>,
        record: &ElementRecord,
        ancestors: &[String],
    ) -> Result<(Container, Vec<String>)> {
        let mut container = Container::Root;
        let mut key_path = Vec::with_capacity(ancestors.len() + 1);

        for segment in ancestors {
            let name = self.naming.attribute_name(segment);
            let node = state
                .attributes(&container)
                .and_then(|attributes| attributes.get(&name))
                .ok_or_else(|| {
                    ModelGenError::schema_resolution(
                        state.definition,
                        record.dotted_path(),
                        format!("ancestor '{segment}' has not been declared"),
                    )
                })?;
            let key = node.composite_key().ok_or_else(|| {
                ModelGenError::schema_resolution(
                    state.definition,
                    record.dotted_path(),
                    format!("ancestor '{segment}' is not an inline composite"),
                )
            })?;
            container = Container::Composite(key.clone());
            key_path.push(name);
        }

        Ok((container, key_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::CompilerConfig;
    use crate::provider::SchemaDialect;
    use crate::types::{Cardinality, MaxCardinality, TypeCode};

    fn build(entry: &DefinitionEntry) -> Result<CompiledDefinition> {
        let catalog = TypeCatalog::fhir();
        let naming = AttributeNaming::new(&CompilerConfig::default());
        let superclasses = SuperclassResolver::new(SchemaDialect::Legacy, "Resource");
        PathTreeBuilder::new(&catalog, &naming, &superclasses).build(entry)
    }

    #[test]
    fn test_flat_attributes() {
        let entry = DefinitionEntry::new(
            "Patient",
            vec![
                ElementRecord::new("Patient")
                    .with_types(["DomainResource"])
                    .with_definition("Demographics and other administrative information."),
                ElementRecord::new("Patient.name")
                    .with_types(["HumanName"])
                    .with_cardinality(0, "*"),
                ElementRecord::new("Patient.active")
                    .with_types(["boolean"])
                    .with_cardinality(0, "1"),
            ],
        );

        let compiled = build(&entry).unwrap();
        let item = &compiled.item;
        assert_eq!(item.superclass, "DomainResource");
        assert_eq!(
            item.docstring.as_deref(),
            Some("Demographics and other administrative information.")
        );
        assert_eq!(item.attributes.keys().collect::<Vec<_>>(), vec!["name", "active"]);
        assert_eq!(item.attributes["name"].cardinality, Cardinality::many());
        assert_eq!(
            item.attributes["active"].cardinality,
            Cardinality::new(0, MaxCardinality::Bounded(1))
        );
        assert!(compiled.composites.is_empty());
    }

    #[test]
    fn test_nested_composites_use_the_arena() {
        let entry = DefinitionEntry::new(
            "Questionnaire",
            vec![
                ElementRecord::new("Questionnaire").with_types(["DomainResource"]),
                ElementRecord::new("Questionnaire.item").with_types(["BackboneElement"]),
                ElementRecord::new("Questionnaire.item.type").with_types(["code"]),
                ElementRecord::new("Questionnaire.item.answer").with_types(["BackboneElement"]),
                ElementRecord::new("Questionnaire.item.answer.value[x]")
                    .with_types(["boolean", "string"]),
            ],
        );

        let compiled = build(&entry).unwrap();
        assert_eq!(compiled.composites.len(), 2);

        let item_key = CompositeKey::new("Questionnaire", vec!["item".into()]);
        let item = compiled.composite(&item_key).unwrap();
        assert_eq!(item.name, "Item");
        assert_eq!(item.superclass, "BackboneElement");
        assert_eq!(item.attributes.keys().collect::<Vec<_>>(), vec!["type_", "answer"]);

        let answer = compiled.attribute(&["item", "answer", "value"]).unwrap();
        assert_eq!(
            answer.kind,
            AttributeKind::Choice(vec![TypeCode::new("boolean"), TypeCode::new("string")])
        );
    }

    #[test]
    fn test_missing_ancestor_is_a_resolution_error() {
        let entry = DefinitionEntry::new(
            "Patient",
            vec![
                ElementRecord::new("Patient").with_types(["DomainResource"]),
                ElementRecord::new("Patient.contact.name").with_types(["HumanName"]),
            ],
        );

        let err = build(&entry).unwrap_err();
        assert!(matches!(
            err,
            ModelGenError::SchemaResolution { ref path, .. } if path == "Patient.contact.name"
        ));
    }

    #[test]
    fn test_leaf_ancestor_is_a_resolution_error() {
        let entry = DefinitionEntry::new(
            "Patient",
            vec![
                ElementRecord::new("Patient").with_types(["DomainResource"]),
                ElementRecord::new("Patient.gender").with_types(["code"]),
                ElementRecord::new("Patient.gender.detail").with_types(["string"]),
            ],
        );

        assert!(matches!(
            build(&entry),
            Err(ModelGenError::SchemaResolution { .. })
        ));
    }

    #[test]
    fn test_untyped_attribute_is_a_resolution_error() {
        let entry = DefinitionEntry::new(
            "Patient",
            vec![
                ElementRecord::new("Patient").with_types(["DomainResource"]),
                ElementRecord::new("Patient.mystery"),
            ],
        );

        let err = build(&entry).unwrap_err();
        assert_eq!(err.definition(), Some("Patient"));
    }

    #[test]
    fn test_redeclared_leaf_drops_the_old_composite() {
        let entry = DefinitionEntry::new(
            "Basic",
            vec![
                ElementRecord::new("Basic").with_types(["DomainResource"]),
                ElementRecord::new("Basic.part").with_types(["BackboneElement"]),
                ElementRecord::new("Basic.part.inner").with_types(["BackboneElement"]),
                ElementRecord::new("Basic.part.inner.code").with_types(["code"]),
                ElementRecord::new("Basic.part").with_types(["string"]),
            ],
        );

        let compiled = build(&entry).unwrap();
        assert!(compiled.composites.is_empty());
        assert_eq!(
            compiled.item.attributes["part"].kind,
            AttributeKind::Single(TypeCode::new("string"))
        );
    }

    #[test]
    fn test_redeclared_composite_starts_empty() {
        let entry = DefinitionEntry::new(
            "Basic",
            vec![
                ElementRecord::new("Basic").with_types(["DomainResource"]),
                ElementRecord::new("Basic.part").with_types(["BackboneElement"]),
                ElementRecord::new("Basic.part.old").with_types(["string"]),
                ElementRecord::new("Basic.part").with_types(["BackboneElement"]),
                ElementRecord::new("Basic.part.new").with_types(["boolean"]),
            ],
        );

        let compiled = build(&entry).unwrap();
        assert_eq!(compiled.composites.len(), 1);

        let part = compiled.attribute(&["part"]).unwrap();
        let children = compiled.children(part).unwrap();
        assert_eq!(children.keys().collect::<Vec<_>>(), vec!["new"]);

        // every arena entry is owned by exactly one node
        let owners = compiled
            .composites
            .keys()
            .filter(|key| {
                let segments: Vec<&str> = key.path.iter().map(String::as_str).collect();
                compiled
                    .attribute(&segments)
                    .and_then(|node| node.composite_key())
                    == Some(*key)
            })
            .count();
        assert_eq!(owners, compiled.composites.len());
    }

    #[test]
    fn test_same_composite_name_on_different_paths() {
        let entry = DefinitionEntry::new(
            "ClaimResponse",
            vec![
                ElementRecord::new("ClaimResponse").with_types(["DomainResource"]),
                ElementRecord::new("ClaimResponse.item").with_types(["BackboneElement"]),
                ElementRecord::new("ClaimResponse.item.detail").with_types(["BackboneElement"]),
                ElementRecord::new("ClaimResponse.addItem").with_types(["BackboneElement"]),
                ElementRecord::new("ClaimResponse.addItem.detail")
                    .with_types(["BackboneElement"]),
            ],
        );

        let compiled = build(&entry).unwrap();
        let details: Vec<_> = compiled
            .composites
            .iter()
            .filter(|(_, composite)| composite.name == "Detail")
            .map(|(key, _)| key.to_string())
            .collect();
        assert_eq!(
            details,
            vec!["ClaimResponse.item.detail", "ClaimResponse.addItem.detail"]
        );
    }
}
