use anyhow::{Context, Result};
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognised as symbol index files
const INDEX_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// File scanner for locating symbol index files.
///
/// The `FileScanner` accepts either a single index file or a directory. Directories are walked
/// recursively, skipping `target` and hidden directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use index_to_openapi::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./build/index"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} index files", result.index_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of a scanning operation.
#[derive(Debug)]
pub struct ScanResult {
    /// Paths of all discovered index files, sorted
    pub index_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collects index files below the root path.
    ///
    /// A root that is itself a file is returned as the only result, whatever its extension.
    /// Inaccessible entries are logged and recorded as warnings; scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = std::fs::metadata(&self.root_path)
            .with_context(|| format!("Index path does not exist: {}", self.root_path.display()))?;
        if metadata.is_file() {
            return Ok(ScanResult {
                index_files: vec![self.root_path.clone()],
                warnings: Vec::new(),
            });
        }

        let mut index_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| e.path() == self.root_path || !Self::is_skipped(e.path()))
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && Self::is_index_file(path) {
                        index_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        index_files.sort();
        Ok(ScanResult {
            index_files,
            warnings,
        })
    }

    fn is_skipped(path: &Path) -> bool {
        let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        file_name.starts_with('.') || file_name == "target"
    }

    fn is_index_file(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| INDEX_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_names(result: &ScanResult) -> Vec<String> {
        result
            .index_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_normal_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("users.yaml"), "classes: []").unwrap();
        fs::write(root.join("orders.json"), "{}").unwrap();
        fs::write(root.join("legacy.yml"), "classes: []").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(file_names(&result), vec!["legacy.yml", "orders.json", "users.yaml"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let scanner = FileScanner::new(temp_dir.path().to_path_buf());
        let result = scanner.scan().unwrap();

        assert!(result.index_files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("module/api")).unwrap();
        fs::write(root.join("root.yaml"), "").unwrap();
        fs::write(root.join("module/api/resources.yaml"), "").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.index_files.len(), 2);
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/stale.yaml"), "").unwrap();
        fs::create_dir(root.join(".cache")).unwrap();
        fs::write(root.join(".cache/copy.json"), "").unwrap();
        fs::write(root.join("index.yaml"), "").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(file_names(&result), vec!["index.yaml"]);
    }

    #[test]
    fn test_scan_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("symbols.idx");
        fs::write(&file, "classes: []").unwrap();

        let result = FileScanner::new(file.clone()).scan().unwrap();

        assert_eq!(result.index_files, vec![file]);
    }

    #[test]
    fn test_scan_missing_path() {
        let result = FileScanner::new(PathBuf::from("/nonexistent/index")).scan();

        assert!(result.unwrap_err().to_string().contains("Index path does not exist"));
    }
}
