//! File-backed store: one JSON file per key inside a data directory

use std::{
    fs, io,
    path::PathBuf,
};

use tracing::debug;

use super::KeyValueStore;
use crate::error::PersistenceFailure;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!("File store opened at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes to a temporary sibling first so readers never see a torn file.
    ///
    /// Blocking filesystem IO on the caller's thread; blobs are a few KB.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceFailure> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|source| PersistenceFailure::Io {
                key: key.to_string(),
                source,
            })
    }
}
