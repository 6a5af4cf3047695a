use url::Url;

use crate::error::{ModelGenError, Result};
use crate::provider::{DefinitionEntry, SchemaDialect};
use crate::types::catalog::ROOT_SUPERCLASS;

/// Determines a definition's parent type under the source's dialect.
#[derive(Debug, Clone)]
pub struct SuperclassResolver<'a> {
    dialect: SchemaDialect,
    ultimate_base: &'a str,
}

impl<'a> SuperclassResolver<'a> {
    pub fn new(dialect: SchemaDialect, ultimate_base: &'a str) -> Self {
        Self {
            dialect,
            ultimate_base,
        }
    }

    pub fn dialect(&self) -> SchemaDialect {
        self.dialect
    }

    pub fn resolve(&self, entry: &DefinitionEntry) -> Result<String> {
        let resolved = match self.dialect {
            SchemaDialect::Legacy => Self::from_root_type(entry),
            SchemaDialect::Canonical => entry
                .base_definition
                .as_deref()
                .and_then(base_name_from_url),
        };

        match resolved {
            Some(name) => Ok(name),
            None if entry.name == self.ultimate_base => Ok(ROOT_SUPERCLASS.to_string()),
            None => Err(ModelGenError::configuration(
                &entry.name,
                format!(
                    "no superclass under the {:?} dialect and not the ultimate base '{}'",
                    self.dialect, self.ultimate_base
                ),
            )),
        }
    }

    fn from_root_type(entry: &DefinitionEntry) -> Option<String> {
        entry
            .root_record()?
            .types
            .first()
            .map(|type_ref| type_ref.code.trim())
            .filter(|code| !code.is_empty())
            .map(str::to_string)
    }
}

/// Last path segment of a `baseDefinition` URL, ignoring any `|version` suffix.
pub fn base_name_from_url(url: &str) -> Option<String> {
    let canonical = url.split_once('|').map_or(url, |(canonical, _)| canonical).trim();

    let from_url = Url::parse(canonical).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
    });

    from_url
        .or_else(|| {
            canonical
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .map(str::to_string)
        })
        .filter(|name| !name.is_empty())
}
