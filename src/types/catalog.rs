//! Recognised type codes.
//!
//! The catalog decides how a declared type code is classified while a
//! definition is compiled: primitives are recorded but never expanded,
//! composites become dependencies, and the two generic composite markers
//! trigger synthesis of an inline composite type.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// FHIR primitive type codes
pub const FHIR_PRIMITIVE_TYPES: &[&str] = &[
    "boolean",
    "integer",
    "string",
    "decimal",
    "uri",
    "url",
    "canonical",
    "base64Binary",
    "instant",
    "date",
    "dateTime",
    "time",
    "code",
    "oid",
    "id",
    "markdown",
    "unsignedInt",
    "positiveInt",
    "uuid",
    "xhtml",
];

/// FHIR composite (complex) type codes
pub const FHIR_COMPOSITE_TYPES: &[&str] = &[
    "Address",
    "Age",
    "Annotation",
    "Attachment",
    "BackboneElement",
    "CodeableConcept",
    "Coding",
    "ContactDetail",
    "ContactPoint",
    "Contributor",
    "Count",
    "DataRequirement",
    "Distance",
    "Dosage",
    "Duration",
    "Element",
    "ElementDefinition",
    "Expression",
    "Extension",
    "HumanName",
    "Identifier",
    "Meta",
    "Money",
    "MoneyQuantity",
    "Narrative",
    "ParameterDefinition",
    "Period",
    "Quantity",
    "Range",
    "Ratio",
    "Reference",
    "RelatedArtifact",
    "SampledData",
    "Signature",
    "SimpleQuantity",
    "Timing",
    "TriggerDefinition",
    "UsageContext",
];

/// Generic composite types that mark an inline structure
pub const COMPOSITE_MARKERS: &[&str] = &["Element", "BackboneElement"];

/// Foundational types the closure never expands
pub const SENTINEL_TYPES: &[&str] = &["FHIRBase", "Element", "Extension"];

/// Superclass of the ultimate base resource
pub const ROOT_SUPERCLASS: &str = "FHIRBase";

/// Superclass value that never counts as a dependency
pub const OBJECT_SENTINEL: &str = "object";

/// Type code whose bound profile is carried into the compiled type
pub const REFERENCE_TYPE: &str = "Reference";

pub fn is_sentinel(name: &str) -> bool {
    SENTINEL_TYPES.contains(&name)
}

/// How the catalog classifies a type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Primitive,
    Composite,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCatalog {
    primitives: IndexSet<String>,
    composites: IndexSet<String>,
    markers: IndexSet<String>,
}

impl TypeCatalog {
    pub fn new<P, C>(primitives: P, composites: C) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            primitives: primitives.into_iter().map(Into::into).collect(),
            composites: composites.into_iter().map(Into::into).collect(),
            markers: COMPOSITE_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// The FHIR core catalog.
    pub fn fhir() -> Self {
        Self::new(
            FHIR_PRIMITIVE_TYPES.iter().copied(),
            FHIR_COMPOSITE_TYPES.iter().copied(),
        )
    }

    pub fn with_primitives<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primitives.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn with_composites<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.composites.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn classify(&self, code: &str) -> TypeClass {
        if self.is_primitive(code) {
            TypeClass::Primitive
        } else if self.is_composite(code) {
            TypeClass::Composite
        } else {
            TypeClass::Unknown
        }
    }

    pub fn is_primitive(&self, code: &str) -> bool {
        self.primitives.contains(code)
    }

    pub fn is_composite(&self, code: &str) -> bool {
        self.composites.contains(code)
    }

    pub fn is_composite_marker(&self, code: &str) -> bool {
        self.markers.contains(code)
    }

    pub fn primitives(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().map(String::as_str)
    }

    pub fn composites(&self) -> impl Iterator<Item = &str> {
        self.composites.iter().map(String::as_str)
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::fhir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fhir_catalog_classification() {
        let catalog = TypeCatalog::fhir();
        assert_eq!(catalog.classify("boolean"), TypeClass::Primitive);
        assert_eq!(catalog.classify("HumanName"), TypeClass::Composite);
        assert_eq!(catalog.classify("Patient"), TypeClass::Unknown);
        assert!(catalog.is_composite_marker("BackboneElement"));
        assert!(!catalog.is_composite_marker("HumanName"));
    }

    #[test]
    fn test_catalog_extension_keeps_order() {
        let catalog = TypeCatalog::new(["string"], ["Coding"])
            .with_primitives(["positiveInt"])
            .with_composites(["Money", "Coding"]);

        assert_eq!(
            catalog.primitives().collect::<Vec<_>>(),
            vec!["string", "positiveInt"]
        );
        assert_eq!(catalog.composites().collect::<Vec<_>>(), vec!["Coding", "Money"]);
        assert!(catalog.is_composite("Money"));
        assert!(!catalog.is_composite("positiveInt"));
    }

    #[test]
    fn test_sentinels() {
        assert!(is_sentinel("FHIRBase"));
        assert!(is_sentinel("Element"));
        assert!(is_sentinel("Extension"));
        assert!(!is_sentinel("DomainResource"));
    }
}
