pub mod bundle;
pub mod index;

pub use bundle::{
    StructureDefinition, convert_structure_definition, is_structure_definition,
    parse_structure_definitions,
};
pub use index::{DefinitionEntry, DefinitionIndex, SchemaDialect};
