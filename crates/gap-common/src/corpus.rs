use std::path::Path;

use rayon::prelude::*;
use sha2::{Digest, Sha256};

use crate::error::ConfigurationError;
use crate::keywords::{extract_keywords, KeywordSet};
use crate::ReferenceEntity;

/// Immutable snapshot of the reference corpus with keywords extracted once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    entities: Vec<ReferenceEntity>,
    keywords: Vec<KeywordSet>,
    version: String,
}

/// First 16 hex characters of the SHA-256 of the canonical JSON encoding.
fn content_version(entities: &[ReferenceEntity]) -> String {
    let canonical = serde_json::to_vec(entities).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let bytes = hasher.finalize();
    let mut hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    hex.truncate(16);
    hex
}

impl Corpus {
    pub fn from_entities(entities: Vec<ReferenceEntity>) -> Self {
        let keywords = entities
            .par_iter()
            .map(|entity| extract_keywords(&entity.description))
            .collect();
        let version = content_version(&entities);
        Self {
            entities,
            keywords,
            version,
        }
    }

    pub fn empty() -> Self {
        Self::from_entities(Vec::new())
    }

    /// Loads a JSON array of reference entities.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigurationError::ReadFile {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let entities: Vec<ReferenceEntity> =
            serde_json::from_str(&raw).map_err(|err| ConfigurationError::ParseFile {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;

        let corpus = Self::from_entities(entities);
        tracing::info!(
            path = %path.display(),
            entities = corpus.len(),
            version = %corpus.version,
            "reference corpus loaded"
        );
        Ok(corpus)
    }

    pub fn entities(&self) -> &[ReferenceEntity] {
        &self.entities
    }

    /// Parallel to [`Corpus::entities`].
    pub fn keywords(&self) -> &[KeywordSet] {
        &self.keywords
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<ReferenceEntity>> for Corpus {
    fn from(entities: Vec<ReferenceEntity>) -> Self {
        Self::from_entities(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zoho() -> ReferenceEntity {
        ReferenceEntity {
            id: "zoho".into(),
            name: "Zoho Books".into(),
            description: "Online accounting software for small businesses".into(),
            category: Some("Fintech".into()),
        }
    }

    #[test]
    fn keywords_are_parallel_to_entities() {
        let corpus = Corpus::from_entities(vec![zoho(), ReferenceEntity::default()]);
        assert_eq!(corpus.keywords().len(), 2);
        assert!(corpus.keywords()[0].contains("accounting"));
        assert!(corpus.keywords()[1].is_empty());
    }

    #[test]
    fn version_is_stable_and_content_sensitive() {
        let a = Corpus::from_entities(vec![zoho()]);
        let b = Corpus::from_entities(vec![zoho()]);
        assert_eq!(a.version(), b.version());
        assert_eq!(a.version().len(), 16);

        let mut changed = zoho();
        changed.description.push_str(" and payroll");
        let c = Corpus::from_entities(vec![changed]);
        assert_ne!(a.version(), c.version());
        assert_ne!(Corpus::empty().version(), a.version());
    }

    #[test]
    fn loads_json_file() {
        let path = std::env::temp_dir().join(format!("gap-corpus-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"id":"zoho","name":"Zoho Books","description":"Online accounting software for small businesses","category":"Fintech"}},
               {{"name":"Bare"}}]"#
        )
        .unwrap();

        let corpus = Corpus::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.entities()[0], zoho());
        assert_eq!(corpus.entities()[1].category, None);
    }

    #[test]
    fn missing_and_malformed_files_are_configuration_errors() {
        assert!(matches!(
            Corpus::from_json_file("/definitely/not/here.json"),
            Err(ConfigurationError::ReadFile { .. })
        ));

        let path = std::env::temp_dir().join(format!("gap-corpus-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{not json").unwrap();
        let result = Corpus::from_json_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigurationError::ParseFile { .. })));
    }
}
