use std::collections::HashSet;

use super::CompilerConfig;
use super::dependencies::DependencyCollector;
use crate::types::catalog::REFERENCE_TYPE;
use crate::types::{AttributeKind, ElementRecord, TypeCode, TypeReference};

/// Suffix FHIR puts on polymorphic element names
pub const CHOICE_MARKER: &str = "[x]";

pub fn strip_choice_marker(segment: &str) -> &str {
    segment.strip_suffix(CHOICE_MARKER).unwrap_or(segment)
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turns path segments into attribute names.
#[derive(Debug, Clone)]
pub struct AttributeNaming {
    reserved: HashSet<String>,
    escape_suffix: String,
}

impl AttributeNaming {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            reserved: config.reserved_words.iter().cloned().collect(),
            escape_suffix: config.escape_suffix.clone(),
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Strips the choice marker, then escapes reserved identifiers.
    pub fn attribute_name(&self, segment: &str) -> String {
        let name = strip_choice_marker(segment);
        if self.is_reserved(name) {
            format!("{name}{}", self.escape_suffix)
        } else {
            name.to_string()
        }
    }

    /// Name of the composite synthesized for an inline structure.
    pub fn composite_name(&self, segment: &str) -> String {
        capitalize_first(strip_choice_marker(segment))
    }
}

/// Decides whether an attribute has one type or a closed set of alternatives.
pub struct ChoiceTypeResolver;

impl ChoiceTypeResolver {
    /// Resolves the declared types of `record`, recording each classified code
    /// with the collector. Falls back to the record's shape reference when no
    /// type is declared; `None` means nothing could be determined.
    pub fn resolve(
        record: &ElementRecord,
        collector: &mut DependencyCollector<'_>,
    ) -> Option<AttributeKind> {
        let mut codes: Vec<TypeCode> = Vec::with_capacity(record.types.len());
        for type_ref in &record.types {
            collector.record_type(&type_ref.code);
            let code = Self::type_code(type_ref);
            if !codes.contains(&code) {
                codes.push(code);
            }
        }

        if codes.is_empty()
            && let Some(target) = record
                .shape_reference
                .as_ref()
                .and_then(|reference| reference.target_name())
        {
            codes.push(TypeCode::new(capitalize_first(target)));
        }

        match codes.len() {
            0 => None,
            1 => codes.pop().map(AttributeKind::Single),
            _ => Some(AttributeKind::Choice(codes)),
        }
    }

    fn type_code(type_ref: &TypeReference) -> TypeCode {
        match &type_ref.profile {
            Some(profile) if type_ref.code == REFERENCE_TYPE => TypeCode::bound_reference(profile),
            _ => TypeCode::new(type_ref.code.clone()),
        }
    }
}
