//! FHIR JSON schema source.
//!
//! Reads `StructureDefinition` resources (inside a `Bundle`, on their own, or
//! as a JSON array) and turns each into a [`DefinitionEntry`] of flat element
//! records.

use serde::{Deserialize, Serialize};

use super::index::{DefinitionEntry, DefinitionIndex};
use crate::error::{ModelGenError, Result};
use crate::types::catalog::REFERENCE_TYPE;
use crate::types::{Cardinality, ElementRecord, MaxCardinality, ShapeReference, TypeReference};

pub const REGEX_EXTENSION_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/structuredefinition-regex";

/// A field that older releases carry as a single value and newer ones as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// The value when exactly one is present.
    pub fn single(&self) -> Option<&str> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) if values.len() == 1 => values.first().map(String::as_str),
            Self::Many(_) => None,
        }
    }
}

/// Extension within a StructureDefinition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureDefinitionExtension {
    pub url: String,
    #[serde(rename = "valueString", skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

/// Type information within a StructureDefinition element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureDefinitionType {
    pub code: String,
    /// Profile URL(s); bound reference target in older releases
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<OneOrMany>,
    /// Target profile URLs for Reference types
    #[serde(rename = "targetProfile", skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<OneOrMany>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<StructureDefinitionExtension>>,
}

/// Element definition in StructureDefinition format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StructureDefinitionElement {
    /// Element path (e.g., "Patient.name")
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    /// Maximum cardinality ("1", "*", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_info: Option<Vec<StructureDefinitionType>>,
    /// Recursive shape by name (DSTU2)
    #[serde(rename = "nameReference", skip_serializing_if = "Option::is_none")]
    pub name_reference: Option<String>,
    /// Recursive shape by element location (STU3 and later)
    #[serde(rename = "contentReference", skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<StructureDefinitionExtension>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementList {
    #[serde(default)]
    pub element: Vec<StructureDefinitionElement>,
}

/// Main StructureDefinition resource, reduced to what compilation reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureDefinition {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "baseDefinition", skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ElementList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential: Option<ElementList>,
}

impl StructureDefinition {
    /// Stable identifier the index keys the definition by.
    pub fn key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .filter(|key| !key.trim().is_empty())
    }

    /// Differential elements, falling back to the snapshot.
    pub fn elements(&self) -> &[StructureDefinitionElement] {
        match (&self.differential, &self.snapshot) {
            (Some(differential), _) if !differential.element.is_empty() => {
                differential.element.as_slice()
            }
            (_, Some(snapshot)) => snapshot.element.as_slice(),
            (Some(differential), None) => differential.element.as_slice(),
            (None, None) => &[],
        }
    }

    /// First regex extension found on any element or element type.
    pub fn regex(&self) -> Option<&str> {
        let views = [self.snapshot.as_ref(), self.differential.as_ref()];
        views
            .into_iter()
            .flatten()
            .flat_map(|view| view.element.iter())
            .flat_map(|element| {
                let own = element.extension.iter().flatten();
                let on_types = element
                    .type_info
                    .iter()
                    .flatten()
                    .flat_map(|t| t.extension.iter().flatten());
                own.chain(on_types)
            })
            .find(|extension| extension.url == REGEX_EXTENSION_URL)
            .and_then(|extension| extension.value_string.as_deref())
    }
}

/// Check if a JSON value represents a StructureDefinition
pub fn is_structure_definition(obj: &serde_json::Value) -> bool {
    obj.get("resourceType")
        .and_then(|rt| rt.as_str())
        .map(|rt| rt == "StructureDefinition")
        .unwrap_or(false)
}

/// Extracts every StructureDefinition from a Bundle, a single resource or an
/// array of resources. Other resource types are skipped.
pub fn parse_structure_definitions(json: &str) -> Result<Vec<StructureDefinition>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let candidates: Vec<serde_json::Value> = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(ref object)
            if object.get("resourceType").and_then(|rt| rt.as_str()) == Some("Bundle") =>
        {
            object
                .get("entry")
                .and_then(|entries| entries.as_array())
                .into_iter()
                .flatten()
                .filter_map(|entry| entry.get("resource").cloned())
                .collect()
        }
        other => vec![other],
    };

    candidates
        .into_iter()
        .filter(is_structure_definition)
        .map(|resource| serde_json::from_value(resource).map_err(ModelGenError::from))
        .collect()
}

fn convert_type(type_info: &StructureDefinitionType) -> TypeReference {
    let type_ref = TypeReference::new(type_info.code.clone());
    if type_info.code != REFERENCE_TYPE {
        return type_ref;
    }
    let bound = type_info
        .target_profile
        .as_ref()
        .or(type_info.profile.as_ref())
        .and_then(OneOrMany::single);
    match bound {
        Some(profile) => type_ref.with_profile(profile),
        None => type_ref,
    }
}

fn convert_element(element: &StructureDefinitionElement) -> ElementRecord {
    let max = element
        .max
        .as_deref()
        .and_then(MaxCardinality::parse)
        .unwrap_or(MaxCardinality::Unbounded);

    let mut record = ElementRecord::new(&element.path);
    record.cardinality = Cardinality::new(element.min.unwrap_or(0), max);
    record.definition_text = element.definition.clone();
    record.types = element
        .type_info
        .iter()
        .flatten()
        .map(convert_type)
        .collect();
    record.shape_reference = element
        .name_reference
        .clone()
        .map(ShapeReference::Name)
        .or_else(|| element.content_reference.clone().map(ShapeReference::Content));
    record
}

/// Converts one StructureDefinition into an index entry.
pub fn convert_structure_definition(sd: &StructureDefinition) -> Result<DefinitionEntry> {
    let name = sd.key().ok_or_else(|| {
        ModelGenError::validation(format!(
            "StructureDefinition without id or name (url: {})",
            sd.url.as_deref().unwrap_or("<none>")
        ))
    })?;

    let records = sd.elements().iter().map(convert_element).collect();
    let mut entry = DefinitionEntry::new(name, records);
    entry.url = sd.url.clone();
    entry.base_definition = sd.base_definition.clone();
    entry.regex = sd.regex().map(str::to_string);
    Ok(entry)
}

impl DefinitionIndex {
    /// Loads every StructureDefinition found in `json`; returns how many were added.
    pub fn add_json(&mut self, json: &str) -> Result<usize> {
        let definitions = parse_structure_definitions(json)?;
        let count = definitions.len();
        for sd in &definitions {
            self.insert(convert_structure_definition(sd)?);
        }
        tracing::debug!("Loaded {} structure definitions", count);
        Ok(count)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut index = Self::new();
        index.add_json(json)?;
        Ok(index)
    }
}
