use crate::index::{ClassInfo, SymbolIndex};
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Loader for symbol index files.
///
/// An index file is a JSON or YAML document with a single `classes` list. The format is picked
/// from the file extension: `.json` is read as JSON, anything else as YAML.
///
/// # Example
///
/// ```no_run
/// use index_to_openapi::loader::IndexLoader;
/// use std::path::Path;
///
/// let loaded = IndexLoader::load_file(Path::new("build/symbols.yaml")).unwrap();
/// println!("Loaded {} classes", loaded.classes.len());
/// ```
pub struct IndexLoader;

/// Top-level shape of an index file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
}

/// A successfully loaded index file.
#[derive(Debug)]
pub struct LoadedFile {
    /// Path to the index file
    pub path: PathBuf,
    /// Classes declared by the file
    pub classes: Vec<ClassInfo>,
}

impl IndexLoader {
    /// Loads a single index file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The content is not a valid index document
    pub fn load_file(path: &Path) -> Result<LoadedFile> {
        debug!("Loading index file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
        let document = Self::parse_str(&content, is_json)
            .with_context(|| format!("Failed to parse index file: {}", path.display()))?;

        debug!("Loaded {} classes from {}", document.classes.len(), path.display());

        Ok(LoadedFile {
            path: path.to_path_buf(),
            classes: document.classes,
        })
    }

    /// Parses index content held in memory.
    pub fn parse_str(content: &str, is_json: bool) -> Result<IndexDocument> {
        if content.trim().is_empty() {
            return Ok(IndexDocument::default());
        }
        if is_json {
            serde_json::from_str(content).context("Invalid JSON index document")
        } else {
            serde_yaml::from_str(content).context("Invalid YAML index document")
        }
    }

    /// Loads multiple index files, continuing even if some fail.
    ///
    /// Files that fail to load are logged as warnings so a partial index can still be scanned.
    pub fn load_files(paths: &[PathBuf]) -> Vec<Result<LoadedFile>> {
        debug!("Loading {} index files", paths.len());

        let results: Vec<Result<LoadedFile>> = paths
            .iter()
            .map(|path| {
                Self::load_file(path).inspect_err(|e| warn!("Failed to load {}: {:#}", path.display(), e))
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Loading complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }

    /// Merges loaded files into one index.
    pub fn into_index(files: Vec<LoadedFile>) -> SymbolIndex {
        SymbolIndex::new(files.into_iter().flat_map(|file| file.classes).collect())
    }
}
