use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tripsplit_application::{GroupStore, StoreError};

/// Stores the group snapshot as a JSON file on disk.
///
/// Writes go to a sibling temporary file that is then renamed over the target,
/// so a crash mid-write leaves the previous snapshot intact.
pub struct JsonFileGroupStore {
    path: PathBuf,
}

impl JsonFileGroupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "group.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl GroupStore for JsonFileGroupStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => {
                tracing::debug!(path = %self.path.display(), bytes = content.len(), "loaded group");
                Ok(Some(content))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, snapshot: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, snapshot)?;
        fs::rename(&temp, &self.path)?;
        tracing::debug!(path = %self.path.display(), bytes = snapshot.len(), "saved group");
        Ok(())
    }
}
