use anyhow::{bail, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use typex_go_frontend::is_go_source;

/// Finds Go source files under the paths given on the command line
pub struct SourceScanner {
    include_tests: bool,
}

impl SourceScanner {
    pub const fn new(include_tests: bool) -> Self {
        Self { include_tests }
    }

    /// Files named explicitly are taken as-is; directories are walked
    /// (.gitignore aware). The result is sorted and deduplicated so unit
    /// order, and with it first-wins resolution, is stable.
    pub fn scan(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                files.push(path.clone());
            } else if path.is_dir() {
                files.extend(self.walk(path));
            } else {
                bail!("No such file or directory: {}", path.display());
            }
        }

        files.sort();
        files.dedup();
        log::info!("Found {} Go source files", files.len());
        Ok(files)
    }

    fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);
        builder.filter_entry(|entry| !Self::is_ignored_scope(entry.path()));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|t| t.is_file()) {
                        continue;
                    }
                    let path = entry.path();
                    if !is_go_source(path) {
                        continue;
                    }
                    if !self.include_tests && Self::is_test_file(path) {
                        log::debug!("Skipping test file {}", path.display());
                        continue;
                    }
                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files
    }

    fn is_test_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with("_test.go"))
    }

    fn is_ignored_scope(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| IGNORED_SCOPES.contains(&name))
    }
}

const IGNORED_SCOPES: &[&str] = &["vendor", "testdata", "node_modules"];

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().display().to_string())
            .collect()
    }

    #[test]
    fn test_walk_skips_tests_and_vendor() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::create_dir_all(root.join("vendor/dep")).unwrap();
        fs::write(root.join("main.go"), "package main\n").unwrap();
        fs::write(root.join("main_test.go"), "package main\n").unwrap();
        fs::write(root.join("pkg/types.go"), "package pkg\n").unwrap();
        fs::write(root.join("pkg/README.md"), "docs\n").unwrap();
        fs::write(root.join("vendor/dep/dep.go"), "package dep\n").unwrap();

        let files = SourceScanner::new(false).scan(&[root.to_path_buf()]).unwrap();
        assert_eq!(names(&files, root), vec!["main.go", "pkg/types.go"]);

        let files = SourceScanner::new(true).scan(&[root.to_path_buf()]).unwrap();
        assert_eq!(
            names(&files, root),
            vec!["main.go", "main_test.go", "pkg/types.go"]
        );
    }

    #[test]
    fn test_explicit_file_kept_once() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("a.go");
        fs::write(&file, "package a\n").unwrap();

        let files = SourceScanner::new(false)
            .scan(&[file.clone(), temp.path().to_path_buf()])
            .unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_missing_path_fails() {
        let temp = tempdir().unwrap();
        let result = SourceScanner::new(false).scan(&[temp.path().join("missing")]);
        assert!(result.is_err());
    }
}
