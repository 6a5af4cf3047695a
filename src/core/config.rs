//! Generator configuration, loaded from YAML.
//!
//! ```yaml
//! inputs:
//!   - definitions/profiles-types.json
//!   - definitions/profiles-resources.json
//! items: [Patient, Observation]
//! output_dir: generated
//! clear_output_dir: true
//! dialect: auto
//! compiler:
//!   ultimate_base: Resource
//!   escape_suffix: _
//! logging:
//!   level: debug
//!   file: modelgen.log
//!   use_console: false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::converter::CompilerConfig;
use crate::error::{ModelGenError, Result};
use crate::provider::SchemaDialect;
use crate::types::TypeCatalog;

/// Marker used as the definition name of configuration errors
pub const CONFIG_SOURCE: &str = "<config>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelGenConfig {
    /// Schema bundle files
    pub inputs: Vec<PathBuf>,
    /// Root definition names
    pub items: Vec<String>,
    pub output_dir: PathBuf,
    pub clear_output_dir: bool,
    pub dialect: DialectSetting,
    pub compiler: CompilerConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// Dialect selection; `auto` detects it once per schema source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectSetting {
    #[default]
    Auto,
    Legacy,
    Canonical,
}

impl DialectSetting {
    /// The dialect to pin, if any.
    pub fn pinned(self) -> Option<SchemaDialect> {
        match self {
            Self::Auto => None,
            Self::Legacy => Some(SchemaDialect::Legacy),
            Self::Canonical => Some(SchemaDialect::Canonical),
        }
    }
}

impl std::str::FromStr for DialectSetting {
    type Err = ModelGenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "legacy" => Ok(Self::Legacy),
            "canonical" => Ok(Self::Canonical),
            other => Err(ModelGenError::validation(format!(
                "unknown dialect '{other}' (expected auto, legacy or canonical)"
            ))),
        }
    }
}

/// Extra type codes on top of the built-in FHIR catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub primitives: Vec<String>,
    pub composites: Vec<String>,
}

impl CatalogConfig {
    pub fn build(&self) -> TypeCatalog {
        TypeCatalog::fhir()
            .with_primitives(self.primitives.iter().cloned())
            .with_composites(self.composites.iter().cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error or none
    pub level: String,
    /// Append log output to this file
    pub file: Option<PathBuf>,
    pub use_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            use_console: true,
        }
    }
}

impl Default for ModelGenConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            items: Vec::new(),
            output_dir: PathBuf::from("generated"),
            clear_output_dir: false,
            dialect: DialectSetting::Auto,
            compiler: CompilerConfig::default(),
            catalog: CatalogConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ModelGenConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(blank) = self.items.iter().position(|item| item.trim().is_empty()) {
            return Err(ModelGenError::configuration(
                CONFIG_SOURCE,
                format!("items[{blank}] is empty"),
            ));
        }
        if self.compiler.ultimate_base.trim().is_empty() {
            return Err(ModelGenError::configuration(
                CONFIG_SOURCE,
                "compiler.ultimate_base is empty",
            ));
        }
        Ok(())
    }

    pub fn with_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_clear_output_dir(mut self, clear: bool) -> Self {
        self.clear_output_dir = clear;
        self
    }

    pub fn with_dialect(mut self, dialect: DialectSetting) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_compiler(mut self, compiler: CompilerConfig) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}
