use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelGenError {
    #[error("Lookup error: no definition named '{name}'")]
    Lookup { name: String },

    #[error("Configuration error in '{definition}': {message}")]
    Configuration { definition: String, message: String },

    #[error("Schema resolution error in '{definition}' at '{path}': {message}")]
    SchemaResolution {
        definition: String,
        path: String,
        message: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModelGenError>;

impl ModelGenError {
    pub fn lookup<S: Into<String>>(name: S) -> Self {
        Self::Lookup { name: name.into() }
    }

    pub fn configuration<S: Into<String>, M: Into<String>>(definition: S, message: M) -> Self {
        Self::Configuration {
            definition: definition.into(),
            message: message.into(),
        }
    }

    pub fn schema_resolution<S, P, M>(definition: S, path: P, message: M) -> Self
    where
        S: Into<String>,
        P: Into<String>,
        M: Into<String>,
    {
        Self::SchemaResolution {
            definition: definition.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Name of the definition the error was raised for, when there is one.
    pub fn definition(&self) -> Option<&str> {
        match self {
            Self::Lookup { name } => Some(name),
            Self::Configuration { definition, .. } | Self::SchemaResolution { definition, .. } => {
                Some(definition)
            }
            _ => None,
        }
    }
}
