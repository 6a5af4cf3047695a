//! Flat element records as delivered by the schema source.
//!
//! A definition is an ordered list of [`ElementRecord`]s. Hierarchy is not
//! nested in the input; it is encoded in each record's dotted path, and a
//! record always follows the record for its ancestor path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of an element's cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MaxCardinality {
    Bounded(u32),
    Unbounded,
}

impl MaxCardinality {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "*" => Some(Self::Unbounded),
            other => other.parse().ok().map(Self::Bounded),
        }
    }

    pub fn is_repeating(&self) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Bounded(max) => *max > 1,
        }
    }
}

impl fmt::Display for MaxCardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{max}"),
            Self::Unbounded => write!(f, "*"),
        }
    }
}

impl From<MaxCardinality> for String {
    fn from(value: MaxCardinality) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for MaxCardinality {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid max cardinality: {value}"))
    }
}

/// `min..max` pair of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: u32,
    pub max: MaxCardinality,
}

impl Cardinality {
    pub fn new(min: u32, max: MaxCardinality) -> Self {
        Self { min, max }
    }

    pub fn optional() -> Self {
        Self::new(0, MaxCardinality::Bounded(1))
    }

    pub fn many() -> Self {
        Self::new(0, MaxCardinality::Unbounded)
    }

    /// `min` exceeds a bounded `max`.
    pub fn is_inverted(&self) -> bool {
        matches!(self.max, MaxCardinality::Bounded(max) if self.min > max)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::many()
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// One declared type of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeReference {
    pub code: String,
    /// Profile bound to a `Reference` type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl TypeReference {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

/// Legacy ways of expressing a recursive shape without a type code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum ShapeReference {
    /// Refers to a sibling or definition by name (`nameReference`)
    Name(String),
    /// Refers to another element path, e.g. `#Questionnaire.item` (`contentReference`)
    Content(String),
}

impl ShapeReference {
    /// The name the referenced shape is known by, before capitalisation.
    pub fn target_name(&self) -> Option<&str> {
        let name = match self {
            Self::Name(name) => name.as_str(),
            Self::Content(reference) => {
                let location = reference
                    .rsplit_once('#')
                    .map_or(reference.as_str(), |(_, fragment)| fragment);
                location.rsplit('.').next().unwrap_or(location)
            }
        };
        let name = name.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// One flat element declaration of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Path segments, the first one being the definition name
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_text: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeReference>,
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_reference: Option<ShapeReference>,
}

impl ElementRecord {
    /// Builds a record from a dotted path such as `Patient.contact.name`.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.split('.').map(str::to_string).collect(),
            definition_text: None,
            types: Vec::new(),
            cardinality: Cardinality::default(),
            shape_reference: None,
        }
    }

    pub fn with_type(mut self, type_ref: TypeReference) -> Self {
        self.types.push(type_ref);
        self
    }

    pub fn with_types<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(codes.into_iter().map(TypeReference::new));
        self
    }

    pub fn with_cardinality(mut self, min: u32, max: &str) -> Self {
        self.cardinality = Cardinality::new(
            min,
            MaxCardinality::parse(max).unwrap_or(MaxCardinality::Unbounded),
        );
        self
    }

    pub fn with_definition(mut self, text: impl Into<String>) -> Self {
        self.definition_text = Some(text.into());
        self
    }

    pub fn with_shape_reference(mut self, reference: ShapeReference) -> Self {
        self.shape_reference = Some(reference);
        self
    }

    /// Path below the definition root; empty for the root record itself.
    pub fn relative_path(&self) -> &[String] {
        self.path.get(1..).unwrap_or(&[])
    }

    pub fn is_root(&self) -> bool {
        self.path.len() == 1
    }

    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_cardinality_parsing() {
        assert_eq!(MaxCardinality::parse("*"), Some(MaxCardinality::Unbounded));
        assert_eq!(MaxCardinality::parse("1"), Some(MaxCardinality::Bounded(1)));
        assert_eq!(MaxCardinality::parse("many"), None);
        assert!(MaxCardinality::Unbounded.is_repeating());
        assert!(!MaxCardinality::Bounded(1).is_repeating());
    }

    #[test]
    fn test_cardinality_serializes_max_as_string() {
        let value = serde_json::to_value(Cardinality::many()).unwrap();
        assert_eq!(value, serde_json::json!({"min": 0, "max": "*"}));

        let parsed: Cardinality =
            serde_json::from_value(serde_json::json!({"min": 1, "max": "1"})).unwrap();
        assert_eq!(parsed, Cardinality::new(1, MaxCardinality::Bounded(1)));
        assert_eq!(parsed.to_string(), "1..1");
    }

    #[test]
    fn test_inverted_cardinality() {
        assert!(Cardinality::new(2, MaxCardinality::Bounded(1)).is_inverted());
        assert!(!Cardinality::new(2, MaxCardinality::Unbounded).is_inverted());
    }

    #[test]
    fn test_shape_reference_target_name() {
        let content = ShapeReference::Content("#Questionnaire.item".to_string());
        assert_eq!(content.target_name(), Some("item"));

        let canonical = ShapeReference::Content(
            "http://hl7.org/fhir/StructureDefinition/Questionnaire#Questionnaire.item".to_string(),
        );
        assert_eq!(canonical.target_name(), Some("item"));

        let name = ShapeReference::Name("contains".to_string());
        assert_eq!(name.target_name(), Some("contains"));

        assert_eq!(ShapeReference::Name("  ".to_string()).target_name(), None);
    }

    #[test]
    fn test_relative_path() {
        let root = ElementRecord::new("Patient");
        assert!(root.is_root());
        assert!(root.relative_path().is_empty());

        let nested = ElementRecord::new("Patient.contact.name");
        assert_eq!(nested.relative_path(), ["contact", "name"]);
        assert_eq!(nested.dotted_path(), "Patient.contact.name");
    }
}
