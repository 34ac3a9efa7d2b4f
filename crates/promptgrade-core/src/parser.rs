//! Exercise catalog parser.
//!
//! Loads catalogs from TOML or JSON files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::batch::Submission;
use crate::catalog::Catalog;
use crate::engine::{compile_patterns, unsupported_construct};
use crate::model::Exercise;
use crate::text::normalize;

/// Intermediate TOML structure for parsing catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    catalog: CatalogHeader,
    #[serde(default)]
    exercises: Vec<Exercise>,
}

#[derive(Debug, Deserialize)]
struct CatalogHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

/// JSON catalogs are either a bare array of exercises or a full catalog object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonCatalogFile {
    Bare(Vec<Exercise>),
    Full(Catalog),
}

/// Parse a single catalog file. `.json` files are read as JSON, everything
/// else as TOML.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        parse_catalog_json_str(&content, path)
    } else {
        parse_catalog_str(&content, path)
    }
}

/// Parse a TOML string into a `Catalog` (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(Catalog {
        id: parsed.catalog.id,
        name: parsed.catalog.name,
        description: parsed.catalog.description,
        exercises: parsed.exercises,
    })
}

/// Parse a JSON string into a `Catalog`.
///
/// A bare exercise array takes its catalog id and name from the file stem.
pub fn parse_catalog_json_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: JsonCatalogFile = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;

    Ok(match parsed {
        JsonCatalogFile::Full(catalog) => catalog,
        JsonCatalogFile::Bare(exercises) => {
            let stem = source_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "catalog".to_string());
            Catalog {
                id: stem.clone(),
                name: stem,
                description: String::new(),
                exercises,
            }
        }
    })
}

/// Recursively load all `.toml` and `.json` catalogs from a directory.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Catalog>> {
    let mut catalogs = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            catalogs.extend(load_catalog_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match parse_catalog(&path) {
                Ok(catalog) => catalogs.push(catalog),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(catalogs)
}

/// Load a catalog file, or every catalog under a directory.
pub fn load_catalogs(path: &Path) -> Result<Vec<Catalog>> {
    if path.is_dir() {
        load_catalog_directory(path)
    } else {
        Ok(vec![parse_catalog(path)?])
    }
}

#[derive(Debug, Deserialize)]
struct TomlSubmissionFile {
    #[serde(default)]
    submissions: Vec<Submission>,
}

/// Load submissions from a TOML file (`[[submissions]]` tables) or a JSON
/// array.
pub fn load_submissions(path: &Path) -> Result<Vec<Submission>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submissions file: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))
    } else {
        parse_submissions_str(&content, path)
    }
}

/// Parse a TOML submissions document.
pub fn parse_submissions_str(content: &str, source_path: &Path) -> Result<Vec<Submission>> {
    let parsed: TomlSubmissionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    Ok(parsed.submissions)
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The exercise ID (if applicable).
    pub exercise_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn exercise(id: &str, message: impl Into<String>) -> Self {
        Self {
            exercise_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a catalog for rubric problems that would make grading fail or
/// behave unexpectedly.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if catalog.exercises.is_empty() {
        warnings.push(ValidationWarning {
            exercise_id: None,
            message: "catalog has no exercises".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for exercise in &catalog.exercises {
        let id = exercise.id.as_str();

        if !seen_ids.insert(id) {
            warnings.push(ValidationWarning::exercise(
                id,
                format!("duplicate exercise ID: {id}"),
            ));
        }

        if exercise.max_tokens == 0 {
            warnings.push(ValidationWarning::exercise(
                id,
                "max_tokens must be greater than 0",
            ));
        }

        // Report every bad pattern, not just the first.
        for pattern in &exercise.patterns {
            if let Err(e) = compile_patterns(std::slice::from_ref(pattern)) {
                let message = match unsupported_construct(pattern) {
                    Some(construct) => {
                        format!("invalid pattern '{pattern}': {construct} are not supported")
                    }
                    None => e.to_string(),
                };
                warnings.push(ValidationWarning::exercise(id, message));
            }
        }

        for keyword in &exercise.keywords {
            if normalize(keyword).is_empty() {
                warnings.push(ValidationWarning::exercise(
                    id,
                    format!("keyword '{keyword}' is empty after normalization and always matches"),
                ));
            }
        }

        if exercise.expected_output.trim().is_empty() {
            warnings.push(ValidationWarning::exercise(id, "expected_output is empty"));
        }

        if exercise.keywords.is_empty() {
            warnings.push(ValidationWarning::exercise(
                id,
                "no keywords; keyword score will be neutral",
            ));
        }

        for (metric, weight) in &exercise.ai_eval_metrics {
            if !(0.0..=1.0).contains(weight) {
                warnings.push(ValidationWarning::exercise(
                    id,
                    format!("metric '{metric}' weight {weight} is outside [0, 1]"),
                ));
            }
        }

        for criterion in exercise.ai_eval_criteria.keys() {
            if !exercise.ai_eval_metrics.contains_key(criterion) {
                warnings.push(ValidationWarning::exercise(
                    id,
                    format!("criterion '{criterion}' has no metric weight"),
                ));
            }
        }
    }

    warnings
}
