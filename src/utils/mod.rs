pub mod fingerprint;

pub use fingerprint::{DefinitionFingerprint, fingerprint_definition, hash_content};
