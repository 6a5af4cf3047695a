use std::collections::HashSet;

use indexmap::IndexSet;

use super::ModelCompiler;
use crate::emit::ModelEmitter;
use crate::error::{ModelGenError, Result};
use crate::types::is_sentinel;

/// Bookkeeping of one closure run.
#[derive(Debug, Default)]
pub struct ClosureState {
    /// Names in completion order
    processed: IndexSet<String>,
    /// Names compiled but whose dependencies are still being walked
    in_progress: HashSet<String>,
}

impl ClosureState {
    /// Sentinels, finished names and names on the current walk need no work.
    pub fn is_settled(&self, name: &str) -> bool {
        is_sentinel(name) || self.processed.contains(name) || self.in_progress.contains(name)
    }

    pub fn processed(&self) -> impl Iterator<Item = &str> {
        self.processed.iter().map(String::as_str)
    }

    fn into_sorted(self) -> Vec<String> {
        let mut processed: Vec<String> = self.processed.into_iter().collect();
        processed.sort();
        processed.dedup();
        processed
    }
}

/// Compiles the requested definitions and everything they depend on.
pub struct ClosureDriver<'c, 'a, E: ModelEmitter + ?Sized> {
    compiler: &'c ModelCompiler<'a>,
    emitter: &'c mut E,
    state: ClosureState,
}

impl<'c, 'a, E: ModelEmitter + ?Sized> ClosureDriver<'c, 'a, E> {
    pub fn new(compiler: &'c ModelCompiler<'a>, emitter: &'c mut E) -> Self {
        Self {
            compiler,
            emitter,
            state: ClosureState::default(),
        }
    }

    /// Runs to a fixed point and returns the processed names, sorted.
    pub fn run<S: AsRef<str>>(mut self, roots: &[S]) -> Result<Vec<String>> {
        let roots = validate_roots(roots)?;
        tracing::info!("Computing closure of {} root definitions", roots.len());

        self.visit(&roots)?;

        let processed = self.state.into_sorted();
        tracing::info!("Closure complete: {} definitions processed", processed.len());
        Ok(processed)
    }

    fn visit(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            if self.state.is_settled(name) {
                continue;
            }
            self.state.in_progress.insert(name.clone());

            tracing::debug!("Compiling definition {}", name);
            let compiled = self.compiler.compile(name)?;
            self.emitter.emit_definition(&compiled)?;

            let pending: Vec<String> = compiled
                .dependencies()
                .iter()
                .filter(|dependency| !self.state.is_settled(dependency))
                .cloned()
                .collect();
            self.visit(&pending)?;

            self.state.in_progress.remove(name);
            self.state.processed.insert(name.clone());
        }
        Ok(())
    }
}

/// Rejects blank names before any compilation starts.
pub(crate) fn validate_roots<S: AsRef<str>>(roots: &[S]) -> Result<Vec<String>> {
    roots
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let name = name.as_ref().trim();
            if name.is_empty() {
                Err(ModelGenError::validation(format!(
                    "root definition name at position {position} is empty"
                )))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_roots() {
        assert_eq!(
            validate_roots(&["Patient", " Observation "]).unwrap(),
            vec!["Patient".to_string(), "Observation".to_string()]
        );
        let err = validate_roots(&["Patient", "  "]).unwrap_err();
        assert!(matches!(err, ModelGenError::Validation { .. }));
    }

    #[test]
    fn test_state_settles_sentinels_and_seen_names() {
        let mut state = ClosureState::default();
        assert!(state.is_settled("Element"));
        assert!(state.is_settled("FHIRBase"));
        assert!(!state.is_settled("Patient"));

        state.in_progress.insert("Patient".into());
        assert!(state.is_settled("Patient"));

        state.processed.insert("Observation".into());
        state.processed.insert("Account".into());
        assert_eq!(state.processed().collect::<Vec<_>>(), vec!["Observation", "Account"]);
        assert_eq!(state.into_sorted(), vec!["Account", "Observation"]);
    }
}
