use octofhir_modelgen::*;
use serde_json::{Value, json};

pub const SD_BASE: &str = "http://hl7.org/fhir/StructureDefinition/";

#[allow(dead_code)]
pub fn record(path: &str, types: &[&str], min: u32, max: &str) -> ElementRecord {
    ElementRecord::new(path)
        .with_types(types.iter().copied())
        .with_cardinality(min, max)
}

#[allow(dead_code)]
pub fn root(name: &str, base: Option<&str>) -> ElementRecord {
    let record = ElementRecord::new(name).with_definition(format!("Base definition for {name}."));
    match base {
        Some(base) => record.with_types([base]),
        None => record,
    }
}

/// A small legacy-dialect schema: superclasses come from root type codes.
#[allow(dead_code)]
pub fn fhir_entries() -> Vec<DefinitionEntry> {
    vec![
        DefinitionEntry::new(
            "Resource",
            vec![
                root("Resource", None),
                record("Resource.id", &["id"], 0, "1"),
                record("Resource.implicitRules", &["uri"], 0, "1"),
            ],
        ),
        DefinitionEntry::new(
            "DomainResource",
            vec![
                root("DomainResource", Some("Resource")),
                record("DomainResource.extension", &["Extension"], 0, "*"),
            ],
        ),
        DefinitionEntry::new(
            "Patient",
            vec![
                root("Patient", Some("DomainResource")),
                record("Patient.name", &["HumanName"], 0, "*"),
                record("Patient.active", &["boolean"], 0, "1"),
                record("Patient.deceased[x]", &["boolean", "dateTime"], 0, "1"),
                record("Patient.contact", &["BackboneElement"], 0, "*"),
                record("Patient.contact.name", &["HumanName"], 0, "1"),
                record("Patient.contact.period", &["Period"], 0, "1"),
                ElementRecord::new("Patient.generalPractitioner")
                    .with_type(
                        TypeReference::new("Reference")
                            .with_profile(format!("{SD_BASE}Practitioner")),
                    )
                    .with_cardinality(0, "*"),
            ],
        ),
        DefinitionEntry::new(
            "HumanName",
            vec![
                root("HumanName", Some("Element")),
                record("HumanName.family", &["string"], 0, "1"),
                record("HumanName.given", &["string"], 0, "*"),
                record("HumanName.period", &["Period"], 0, "1"),
            ],
        ),
        DefinitionEntry::new(
            "Period",
            vec![
                root("Period", Some("Element")),
                record("Period.start", &["dateTime"], 0, "1"),
                record("Period.end", &["dateTime"], 0, "1"),
            ],
        ),
        DefinitionEntry::new(
            "BackboneElement",
            vec![
                root("BackboneElement", Some("Element")),
                record("BackboneElement.modifierExtension", &["Extension"], 0, "*"),
            ],
        ),
        DefinitionEntry::new(
            "Reference",
            vec![
                root("Reference", Some("Element")),
                record("Reference.reference", &["string"], 0, "1"),
                record("Reference.display", &["string"], 0, "1"),
            ],
        ),
    ]
}

#[allow(dead_code)]
pub fn fhir_index() -> DefinitionIndex {
    DefinitionIndex::from_entries(fhir_entries())
}

/// The same schema expressed with `baseDefinition` URLs instead of root type codes.
#[allow(dead_code)]
pub fn canonical_index() -> DefinitionIndex {
    DefinitionIndex::from_entries(fhir_entries().into_iter().map(|mut entry| {
        let base = entry
            .records
            .iter_mut()
            .find(|record| record.is_root())
            .and_then(|root| root.types.drain(..).next());
        if let Some(base) = base {
            entry.base_definition = Some(format!("{SD_BASE}{}", base.code));
        }
        entry
    }))
}

/// Two composites that refer to each other.
#[allow(dead_code)]
pub fn cyclic_index() -> (DefinitionIndex, TypeCatalog) {
    let index = DefinitionIndex::from_entries([
        DefinitionEntry::new(
            "Alpha",
            vec![
                root("Alpha", Some("Element")),
                record("Alpha.beta", &["Beta"], 0, "1"),
            ],
        ),
        DefinitionEntry::new(
            "Beta",
            vec![
                root("Beta", Some("Element")),
                record("Beta.alpha", &["Alpha"], 0, "*"),
                record("Beta.label", &["string"], 0, "1"),
            ],
        ),
    ]);
    let catalog = TypeCatalog::fhir().with_composites(["Alpha", "Beta"]);
    (index, catalog)
}

#[allow(dead_code)]
pub fn structure_definition(id: &str, base: Option<&str>, elements: Vec<Value>) -> Value {
    let mut sd = json!({
        "resourceType": "StructureDefinition",
        "id": id,
        "url": format!("{SD_BASE}{id}"),
        "name": id,
        "differential": {"element": elements}
    });
    if let Some(base) = base {
        sd["baseDefinition"] = json!(format!("{SD_BASE}{base}"));
    }
    sd
}

/// An R4-style bundle covering Patient and everything it needs.
#[allow(dead_code)]
pub fn patient_bundle() -> Value {
    let definitions = vec![
        structure_definition(
            "string",
            Some("Element"),
            vec![
                json!({"path": "string"}),
                json!({"path": "string.value", "type": [{"code": "http://hl7.org/fhirpath/System.String",
                    "extension": [{"url": "http://hl7.org/fhir/StructureDefinition/structuredefinition-regex",
                                   "valueString": "[ \\r\\n\\t\\S]+"}]}]}),
            ],
        ),
        structure_definition(
            "boolean",
            Some("Element"),
            vec![
                json!({"path": "boolean"}),
                json!({"path": "boolean.value", "type": [{"code": "http://hl7.org/fhirpath/System.Boolean",
                    "extension": [{"url": "http://hl7.org/fhir/StructureDefinition/structuredefinition-regex",
                                   "valueString": "true|false"}]}]}),
            ],
        ),
        structure_definition(
            "Resource",
            None,
            vec![
                json!({"path": "Resource", "definition": "Base Resource"}),
                json!({"path": "Resource.id", "min": 0, "max": "1", "type": [{"code": "id"}]}),
            ],
        ),
        structure_definition(
            "DomainResource",
            Some("Resource"),
            vec![
                json!({"path": "DomainResource"}),
                json!({"path": "DomainResource.extension", "min": 0, "max": "*", "type": [{"code": "Extension"}]}),
            ],
        ),
        structure_definition(
            "Patient",
            Some("DomainResource"),
            vec![
                json!({"path": "Patient", "definition": "Demographics and other administrative information."}),
                json!({"path": "Patient.name", "min": 0, "max": "*", "type": [{"code": "HumanName"}]}),
                json!({"path": "Patient.active", "min": 0, "max": "1", "type": [{"code": "boolean"}]}),
                json!({"path": "Patient.link", "min": 0, "max": "*", "type": [{"code": "BackboneElement"}]}),
                json!({"path": "Patient.link.other", "min": 1, "max": "1",
                       "type": [{"code": "Reference", "targetProfile": [format!("{SD_BASE}Patient")]}]}),
                json!({"path": "Patient.link.type", "min": 1, "max": "1", "type": [{"code": "code"}]}),
            ],
        ),
        structure_definition(
            "HumanName",
            Some("Element"),
            vec![
                json!({"path": "HumanName"}),
                json!({"path": "HumanName.family", "min": 0, "max": "1", "type": [{"code": "string"}]}),
            ],
        ),
        structure_definition(
            "BackboneElement",
            Some("Element"),
            vec![
                json!({"path": "BackboneElement"}),
                json!({"path": "BackboneElement.modifierExtension", "min": 0, "max": "*", "type": [{"code": "Extension"}]}),
            ],
        ),
        structure_definition(
            "Reference",
            Some("Element"),
            vec![
                json!({"path": "Reference"}),
                json!({"path": "Reference.reference", "min": 0, "max": "1", "type": [{"code": "string"}]}),
            ],
        ),
    ];

    json!({
        "resourceType": "Bundle",
        "type": "collection",
        "entry": definitions
            .into_iter()
            .map(|resource| json!({"resource": resource}))
            .collect::<Vec<_>>()
    })
}
