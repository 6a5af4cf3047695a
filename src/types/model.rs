//! Compiled model types handed to the emission stage.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::catalog::REFERENCE_TYPE;
use super::element::Cardinality;

/// Resolved type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeCode {
    pub code: String,
    /// Profile URL passed to a bound `Reference`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl TypeCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            profile: None,
        }
    }

    pub fn bound_reference(profile: impl Into<String>) -> Self {
        Self {
            code: REFERENCE_TYPE.to_string(),
            profile: Some(profile.into()),
        }
    }

    pub fn is_bound_reference(&self) -> bool {
        self.code == REFERENCE_TYPE && self.profile.is_some()
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.profile {
            Some(profile) => write!(f, "{}({profile})", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

/// Stable arena key of a synthesized composite: owning definition plus the
/// attribute path that introduced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CompositeKey {
    pub definition: String,
    pub path: Vec<String>,
}

impl CompositeKey {
    pub fn new(definition: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            definition: definition.into(),
            path,
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition)?;
        for segment in &self.path {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

impl From<CompositeKey> for String {
    fn from(key: CompositeKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for CompositeKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut segments = value.split('.').map(str::to_string);
        match segments.next() {
            Some(definition) if !definition.is_empty() => {
                Ok(Self::new(definition, segments.collect()))
            }
            _ => Err(format!("invalid composite key: {value}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "camelCase")]
pub enum AttributeKind {
    Single(TypeCode),
    /// Closed set of alternatives, in declaration order
    Choice(Vec<TypeCode>),
    /// Nested structure; its attributes live in the composite arena
    InlineComposite(CompositeKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeNode {
    pub name: String,
    pub cardinality: Cardinality,
    #[serde(flatten)]
    pub kind: AttributeKind,
}

impl AttributeNode {
    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, AttributeKind::InlineComposite(_))
    }

    pub fn composite_key(&self) -> Option<&CompositeKey> {
        match &self.kind {
            AttributeKind::InlineComposite(key) => Some(key),
            _ => None,
        }
    }

    /// Every type the attribute may hold; composites report no codes.
    pub fn type_codes(&self) -> &[TypeCode] {
        match &self.kind {
            AttributeKind::Single(code) => std::slice::from_ref(code),
            AttributeKind::Choice(codes) => codes,
            AttributeKind::InlineComposite(_) => &[],
        }
    }
}

pub type AttributeMap = IndexMap<String, AttributeNode>;

/// Type synthesized for an inline structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDescriptor {
    pub name: String,
    pub superclass: String,
    pub attributes: AttributeMap,
}

/// Root of a compiled definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub superclass: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub attributes: AttributeMap,
    pub required_primitive_types: BTreeSet<String>,
    pub required_composite_types: BTreeSet<String>,
    /// Composite types referenced plus the superclass
    pub dependencies: BTreeSet<String>,
}

/// A compiled definition: the item tree plus the composites it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledDefinition {
    pub item: ItemDescriptor,
    pub composites: IndexMap<CompositeKey, CompositeDescriptor>,
}

impl CompiledDefinition {
    pub fn name(&self) -> &str {
        &self.item.name
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.item.dependencies
    }

    pub fn composite(&self, key: &CompositeKey) -> Option<&CompositeDescriptor> {
        self.composites.get(key)
    }

    /// Children of an inline composite node, read through the arena.
    pub fn children(&self, node: &AttributeNode) -> Option<&AttributeMap> {
        node.composite_key()
            .and_then(|key| self.composites.get(key))
            .map(|composite| &composite.attributes)
    }

    /// Looks up an attribute by its (escaped) names from the root down.
    pub fn attribute(&self, path: &[&str]) -> Option<&AttributeNode> {
        let (last, parents) = path.split_last()?;
        let mut attributes = &self.item.attributes;
        for segment in parents {
            attributes = self.children(attributes.get(*segment)?)?;
        }
        attributes.get(*last)
    }

    pub fn into_parts(
        self,
    ) -> (
        ItemDescriptor,
        IndexMap<CompositeKey, CompositeDescriptor>,
        BTreeSet<String>,
    ) {
        let dependencies = self.item.dependencies.clone();
        (self.item, self.composites, dependencies)
    }
}

/// Primitive type description, emitted ahead of the closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveDescriptor {
    pub name: String,
    pub superclass: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}
