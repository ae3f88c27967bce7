//! Core [`RuleRepository`] struct: load, validate and hold the rule set.

use std::fs;
use std::path::{Path, PathBuf};

use credit_core::EngineConfig;
use tracing::{debug, info, warn};

use crate::schema::{Rule, RuleDefinition, RuleSetDocument, RuleSetMetadata};
use crate::validation::{Linter, ValidationWarning};

use super::error::{LoadResult, LoadStatus, Result, RuleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Option<Format> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => Some(Format::Yaml),
            Some("json") => Some(Format::Json),
            _ => None,
        }
    }
}

/// The validated, immutable rule set for one run.
///
/// Rules keep declaration order across files (files in name order), and
/// each rule's `index` is its global position. Built once; share it behind
/// an `Arc` for parallel evaluation.
#[derive(Debug, Default)]
pub struct RuleRepository {
    rules: Vec<Rule>,
    metadata: Vec<RuleSetMetadata>,
    warnings: Vec<ValidationWarning>,
    sources: Vec<LoadResult>,
}

impl RuleRepository {
    /// Load from a rule file or a directory of rule files.
    ///
    /// Directories are scanned recursively in file-name order. Dotfiles and
    /// files that are not yml/yaml/json are skipped. Any parse or validation
    /// failure aborts the whole load.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_config(path, &EngineConfig::default())
    }

    /// [`load`](Self::load), linting conditions and templates under the
    /// limits of `config` so warnings match what the run will do.
    pub fn load_with_config(path: &Path, config: &EngineConfig) -> Result<Self> {
        let mut documents = Vec::new();
        let mut sources = Vec::new();

        if path.is_dir() {
            scan_dir_recursive(path, &mut documents, &mut sources)?;
        } else {
            let format = Format::from_path(path).ok_or_else(|| RuleError::UnsupportedFormat(path.to_path_buf()))?;
            documents.push(read_document(path, format)?);
            sources.push(LoadResult {
                path: path.to_path_buf(),
                status: LoadStatus::Loaded { rules: 0 },
            });
        }

        let mut repo = Self::from_documents(documents, &Linter::new(config))?;

        // Fill in per-file rule counts now that the documents are consumed.
        let mut counts = repo.per_source_counts().into_iter();
        for source in sources.iter_mut() {
            if let LoadStatus::Loaded { rules } = &mut source.status {
                *rules = counts.next().unwrap_or(0);
            }
        }
        repo.sources = sources;

        info!(
            path = %path.display(),
            rules = repo.rules.len(),
            warnings = repo.warnings.len(),
            "loaded rule set"
        );
        Ok(repo)
    }

    /// Parse a YAML rule document (envelope or bare `rules:` list).
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_yaml_str_with_config(yaml, &EngineConfig::default())
    }

    pub fn from_yaml_str_with_config(yaml: &str, config: &EngineConfig) -> Result<Self> {
        let doc = serde_yaml::from_str(yaml).map_err(|error| RuleError::Yaml {
            source_name: "<string>".to_string(),
            error,
        })?;
        Self::from_documents(vec![("<string>".to_string(), doc)], &Linter::new(config))
    }

    /// Parse a JSON rule document (envelope or bare `{"rules": [...]}`).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc = serde_json::from_str(json).map_err(|error| RuleError::Json {
            source_name: "<string>".to_string(),
            error,
        })?;
        Self::from_documents(vec![("<string>".to_string(), doc)], &Linter::default())
    }

    /// Build from in-memory definitions.
    pub fn from_definitions(definitions: Vec<RuleDefinition>) -> Result<Self> {
        let doc = RuleSetDocument {
            rules: definitions,
            ..Default::default()
        };
        Self::from_documents(vec![("<definitions>".to_string(), doc)], &Linter::default())
    }

    fn from_documents(documents: Vec<(String, RuleSetDocument)>, linter: &Linter) -> Result<Self> {
        let mut repo = RuleRepository::default();

        for (source_name, doc) in documents {
            let first_index = repo.rules.len();
            let result = linter.validate_document(&doc, first_index);

            if let Err(message) = doc.check_header() {
                return Err(RuleError::InvalidDocument { source_name, message });
            }
            if !result.valid {
                return Err(first_invalid_rule(&doc, first_index, linter));
            }

            for warning in &result.warnings {
                warn!(source = %source_name, path = %warning.path, suggestion = ?warning.suggestion, "{}", warning.message);
            }
            repo.warnings.extend(result.warnings);

            if let Some(meta) = doc.metadata {
                repo.metadata.push(meta);
            }
            let count = doc.rules.len();
            for (offset, def) in doc.rules.into_iter().enumerate() {
                let rule = Rule::from_definition(first_index + offset, def);
                debug!(index = rule.index, rule = %rule.label, category = %rule.category, inferred = rule.category_inferred, "registered rule");
                repo.rules.push(rule);
            }
            repo.sources.push(LoadResult {
                path: PathBuf::from(source_name),
                status: LoadStatus::Loaded { rules: count },
            });
        }

        if repo.rules.is_empty() {
            warn!("rule set is empty; no insights will be produced");
        }
        Ok(repo)
    }

    fn per_source_counts(&self) -> Vec<usize> {
        self.sources
            .iter()
            .map(|s| match s.status {
                LoadStatus::Loaded { rules } => rules,
                LoadStatus::Skipped { .. } => 0,
            })
            .collect()
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Metadata blocks of every loaded file that had one.
    pub fn metadata(&self) -> &[RuleSetMetadata] {
        &self.metadata
    }

    /// Advisory lint warnings collected at load time.
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// Every path visited by [`load`](Self::load), with its outcome.
    pub fn sources(&self) -> &[LoadResult] {
        &self.sources
    }
}

/// Turn the first failing rule of a document into a [`RuleError::Validation`].
fn first_invalid_rule(doc: &RuleSetDocument, first_index: usize, linter: &Linter) -> RuleError {
    for (offset, def) in doc.rules.iter().enumerate() {
        let index = first_index + offset;
        let result = linter.validate_definition(index, def);
        if !result.valid {
            return RuleError::Validation {
                index,
                label: def.label.trim().to_string(),
                message: result.error_summary(),
            };
        }
    }
    RuleError::Validation {
        index: first_index,
        label: String::new(),
        message: "rule set failed validation".to_string(),
    }
}

fn read_document(path: &Path, format: Format) -> Result<(String, RuleSetDocument)> {
    let contents = fs::read_to_string(path)?;
    let source_name = path.display().to_string();
    let doc = match format {
        Format::Yaml => serde_yaml::from_str(&contents).map_err(|error| RuleError::Yaml {
            source_name: source_name.clone(),
            error,
        })?,
        Format::Json => serde_json::from_str(&contents).map_err(|error| RuleError::Json {
            source_name: source_name.clone(),
            error,
        })?,
    };
    Ok((source_name, doc))
}

/// Recursively collect rule documents under `dir`, in file-name order.
fn scan_dir_recursive(
    dir: &Path,
    documents: &mut Vec<(String, RuleSetDocument)>,
    sources: &mut Vec<LoadResult>,
) -> Result<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        // Skip dotfiles/dotdirs
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                if path.is_file() {
                    sources.push(LoadResult {
                        path,
                        status: LoadStatus::Skipped {
                            reason: "dotfile".to_string(),
                        },
                    });
                }
                continue;
            }
        }

        if path.is_dir() {
            scan_dir_recursive(&path, documents, sources)?;
            continue;
        }

        let Some(format) = Format::from_path(&path) else {
            sources.push(LoadResult {
                path,
                status: LoadStatus::Skipped {
                    reason: "not a YAML or JSON file".to_string(),
                },
            });
            continue;
        };

        documents.push(read_document(&path, format)?);
        sources.push(LoadResult {
            path,
            status: LoadStatus::Loaded { rules: 0 },
        });
    }

    Ok(())
}
