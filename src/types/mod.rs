pub mod catalog;
pub mod element;
pub mod model;

pub use catalog::{TypeCatalog, TypeClass, is_sentinel};
pub use element::{Cardinality, ElementRecord, MaxCardinality, ShapeReference, TypeReference};
pub use model::{
    AttributeKind, AttributeMap, AttributeNode, CompiledDefinition, CompositeDescriptor,
    CompositeKey, ItemDescriptor, PrimitiveDescriptor, TypeCode,
};
