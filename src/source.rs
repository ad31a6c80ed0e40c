//! Type-definition sources - finds and parses the Rust files that define the API's models.

use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collects `.rs` files below one or more roots.
///
/// `target` and hidden directories are skipped.
pub struct FileScanner {
    roots: Vec<PathBuf>,
}

/// Result of a scan
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Every discovered `.rs` file, roots in order
    pub rust_files: Vec<PathBuf>,
    /// Inaccessible entries, reported but not fatal
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Walk every root.
    ///
    /// A root that is a single `.rs` file is taken as is. Fails only when a root does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut result = ScanResult::default();
        for root in &self.roots {
            if !root.exists() {
                return Err(Error::InvalidArgument(format!(
                    "source path does not exist: {}",
                    root.display()
                )));
            }
            self.scan_root(root, &mut result);
        }
        debug!("Scanned {} roots, found {} files", self.roots.len(), result.rust_files.len());
        Ok(result)
    }

    fn scan_root(&self, root: &Path, result: &mut ScanResult) {
        let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| {
            if e.path() == root {
                return true;
            }
            let file_name = e.file_name().to_string_lossy();
            !file_name.starts_with('.') && file_name != "target"
        });
        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        result.rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    result.warnings.push(warning);
                }
            }
        }
    }
}

/// A parsed source file
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub syntax_tree: syn::File,
}

/// Parses Rust sources with `syn`
pub struct AstParser;

impl AstParser {
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());
        let content = fs::read_to_string(path)?;
        let syntax_tree = Self::parse_source(&content).map_err(|err| match err {
            Error::ParseError { message, .. } => Error::ParseError {
                file: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    pub fn parse_source(content: &str) -> Result<syn::File> {
        Ok(syn::parse_file(content)?)
    }

    /// Parse every file, skipping (and logging) the ones that fail
    pub fn parse_files(paths: &[PathBuf]) -> Vec<ParsedFile> {
        let parsed: Vec<ParsedFile> = paths
            .iter()
            .filter_map(|path| match Self::parse_file(path) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    None
                }
            })
            .collect();
        debug!("Parsed {} of {} files", parsed.len(), paths.len());
        parsed
    }
}

/// Scan and parse every source root
pub fn load_sources(roots: &[PathBuf]) -> Result<Vec<ParsedFile>> {
    let scan = FileScanner::new(roots.to_vec()).scan()?;
    Ok(AstParser::parse_files(&scan.rust_files))
}
