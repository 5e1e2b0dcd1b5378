use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem storage. Relative paths resolve against `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_dirs_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        tokio_test::block_on(storage.write_file("nested/out/data.txt", b"hello")).unwrap();
        let data = tokio_test::block_on(storage.read_file("nested/out/data.txt")).unwrap();

        assert_eq!(data, b"hello");
        assert!(dir.path().join("nested/out/data.txt").exists());
    }

    #[test]
    fn test_absolute_paths_bypass_base() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("abs.txt");
        std::fs::write(&target, b"x").unwrap();

        let storage = LocalStorage::new("/does/not/matter");
        let data = tokio_test::block_on(storage.read_file(target.to_str().unwrap())).unwrap();
        assert_eq!(data, b"x");
    }
}
