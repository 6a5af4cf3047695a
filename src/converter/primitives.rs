use regex::Regex;

use crate::provider::DefinitionIndex;
use crate::types::{PrimitiveDescriptor, TypeCatalog};

/// Every primitive refines the generic element
pub const PRIMITIVE_SUPERCLASS: &str = "Element";

/// Definition used for primitives the source does not define (`xhtml`)
pub const FALLBACK_PRIMITIVE: &str = "string";

/// Describes each catalog primitive, in catalog order.
pub fn compile_primitives(
    index: &DefinitionIndex,
    catalog: &TypeCatalog,
) -> Vec<PrimitiveDescriptor> {
    catalog
        .primitives()
        .map(|name| {
            let entry = index.get(name).or_else(|| {
                tracing::warn!(
                    "Primitive '{}' has no definition, using '{}'",
                    name,
                    FALLBACK_PRIMITIVE
                );
                index.get(FALLBACK_PRIMITIVE)
            });

            let regex = entry
                .and_then(|entry| entry.regex.as_deref())
                .filter(|pattern| is_valid_pattern(name, pattern))
                .map(str::to_string);

            PrimitiveDescriptor {
                name: name.to_string(),
                superclass: PRIMITIVE_SUPERCLASS.to_string(),
                regex,
            }
        })
        .collect()
}

fn is_valid_pattern(name: &str, pattern: &str) -> bool {
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Dropping regex of primitive '{}': {}", name, e);
            false
        }
    }
}
