//! Dataset discovery for `hostrank batch`.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Finds capture files under a dataset root.
#[derive(Debug, Clone)]
pub struct DatasetWalker {
    root: PathBuf,
    subdir: Option<String>,
    extension: String,
}

impl DatasetWalker {
    pub fn new(root: impl Into<PathBuf>, subdir: Option<String>, extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        Self {
            root: root.into(),
            subdir,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// All matching files, sorted by path.
    ///
    /// A file matches when its extension equals the configured one and, if a
    /// subdirectory name is set, its parent directory has that name.
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        self.visit(&self.root, &mut found)?;
        found.sort();
        Ok(found)
    }

    fn visit(&self, dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
        let entries =
            fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                self.visit(&path, found)?;
            } else if self.matches(&path) {
                found.push(path);
            }
        }
        Ok(())
    }

    fn matches(&self, path: &Path) -> bool {
        if path.extension() != Some(OsStr::new(&self.extension)) {
            return false;
        }
        self.subdir.as_ref().is_none_or(|wanted| {
            path.parent()
                .and_then(Path::file_name)
                .is_some_and(|name| name == OsStr::new(wanted))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, "SrcAddr,DstAddr\n").expect("write");
    }

    #[test]
    fn filters_by_extension_and_subdir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        touch(&root.join("1/5/a.binetflow"));
        touch(&root.join("2/5/b.binetflow"));
        touch(&root.join("2/4/c.binetflow"));
        touch(&root.join("2/5/notes.txt"));
        touch(&root.join("5/d.binetflow"));

        let all = DatasetWalker::new(root, None, "binetflow").collect().expect("walk");
        assert_eq!(all.len(), 4);

        let fives = DatasetWalker::new(root, Some("5".into()), ".binetflow")
            .collect()
            .expect("walk");
        assert_eq!(
            fives,
            vec![
                root.join("1/5/a.binetflow"),
                root.join("2/5/b.binetflow"),
                root.join("5/d.binetflow"),
            ]
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = DatasetWalker::new(dir.path().join("absent"), None, "binetflow").collect();
        assert!(result.is_err());
    }
}
