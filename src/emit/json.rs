use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::ModelEmitter;
use crate::error::Result;
use crate::types::{CompiledDefinition, PrimitiveDescriptor};
use crate::utils::DefinitionFingerprint;

pub const MANIFEST_FILE: &str = "index.json";

/// Contents of `index.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub generated_at: DateTime<Utc>,
    pub primitives: Vec<String>,
    /// Final sorted processed names
    pub processed: Vec<String>,
    /// Fingerprints in emission order
    pub definitions: Vec<DefinitionFingerprint>,
}

impl ModelManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn fingerprint(&self, name: &str) -> Option<&DefinitionFingerprint> {
        self.definitions.iter().find(|fp| fp.name == name)
    }
}

/// Writes one JSON file per primitive and definition plus a manifest.
#[derive(Debug)]
pub struct JsonModelEmitter {
    output_dir: PathBuf,
    primitives: Vec<String>,
    definitions: Vec<DefinitionFingerprint>,
    written: Vec<PathBuf>,
}

impl JsonModelEmitter {
    /// Creates the output directory if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            primitives: Vec::new(),
            definitions: Vec::new(),
            written: Vec::new(),
        })
    }

    /// Removes everything in the output directory first.
    pub fn cleared(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            tracing::info!("Clearing output directory {}", output_dir.display());
            fs::remove_dir_all(&output_dir)?;
        }
        Self::new(output_dir)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn definition_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", name.to_lowercase()))
    }

    pub fn primitive_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("_{}.json", name.to_lowercase()))
    }

    fn write_json<T: Serialize>(&mut self, path: PathBuf, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&path, content)?;
        tracing::debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

impl ModelEmitter for JsonModelEmitter {
    fn emit_primitive(&mut self, primitive: &PrimitiveDescriptor) -> Result<()> {
        let path = self.primitive_path(&primitive.name);
        self.write_json(path, primitive)?;
        self.primitives.push(primitive.name.clone());
        Ok(())
    }

    fn emit_definition(&mut self, compiled: &CompiledDefinition) -> Result<()> {
        let fingerprint = DefinitionFingerprint::of(compiled)?;
        tracing::debug!(
            "Emitting '{}' ({})",
            compiled.name(),
            fingerprint.short_hash()
        );
        let path = self.definition_path(compiled.name());
        self.write_json(path, compiled)?;
        self.definitions.push(fingerprint);
        Ok(())
    }

    fn finish(&mut self, processed: &[String]) -> Result<()> {
        let manifest = ModelManifest {
            generated_at: Utc::now(),
            primitives: self.primitives.clone(),
            processed: processed.to_vec(),
            definitions: self.definitions.clone(),
        };
        let path = self.output_dir.join(MANIFEST_FILE);
        self.write_json(path, &manifest)?;
        tracing::info!(
            "Wrote {} definitions and {} primitives to {}",
            self.definitions.len(),
            self.primitives.len(),
            self.output_dir.display()
        );
        Ok(())
    }
}
