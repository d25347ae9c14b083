//! One JSON-serialized collection persisted as a single file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize collection {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to deserialize collection {path}: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("collection lock poisoned")]
    Poisoned,
}

/// A collection of records kept in memory and mirrored to one JSON file.
///
/// Save-on-change: every successful mutation rewrites the whole file (write to
/// a temp file, rename into place so readers never see a torn write).
/// `reload()` replaces the in-memory copy with whatever is on disk; the disk
/// copy always wins (last write observed wins).
#[derive(Debug)]
pub struct JsonCollection<T> {
    path: PathBuf,
    records: RwLock<Vec<T>>,
}

impl<T> JsonCollection<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Open a collection backed by `path`. A missing file reads as empty; the
    /// file is only created on first save.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let records = read_records(&path)?;
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone of the current in-memory records.
    ///
    /// A poisoned lock is recovered rather than read as empty: mutations run
    /// on a working copy, so a panicking writer never tears the guarded data.
    pub fn snapshot(&self) -> Vec<T> {
        match self.records.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Mutate the records and save on success.
    ///
    /// The closure's error aborts the mutation: memory is left untouched and
    /// nothing is written. On `Ok` the whole collection is rewritten.
    pub fn try_mutate<R, E>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, E>,
    ) -> Result<Result<R, E>, StoreError> {
        let mut guard = self.records.write().map_err(|_| StoreError::Poisoned)?;

        let mut working = guard.clone();
        match f(&mut working) {
            Ok(value) => {
                save_records(&self.path, &working)?;
                *guard = working;
                Ok(Ok(value))
            }
            Err(e) => Ok(Err(e)),
        }
    }

    /// Replace memory with the on-disk state.
    ///
    /// On a read or parse failure the in-memory copy is kept; the next save
    /// will overwrite the bad file (last write observed wins).
    pub fn reload(&self) -> Result<(), StoreError> {
        let fresh = read_records(&self.path)?;
        let mut guard = self.records.write().map_err(|_| StoreError::Poisoned)?;
        *guard = fresh;
        Ok(())
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| StoreError::Deserialize {
        path: path.to_path_buf(),
        source: e,
    })
}

fn save_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(records).map_err(|e| StoreError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Atomic replace: readers see either the old file or the new one.
    let tmp = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp).map_err(&io_err)?;
    file.write_all(&payload).map_err(&io_err)?;
    file.sync_all().map_err(&io_err)?;
    drop(file);

    fs::rename(&tmp, path).map_err(&io_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("paperstock-collection-{}", uuid::Uuid::now_v7()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let coll: JsonCollection<u32> = JsonCollection::open(temp_path("nums.json")).unwrap();
        assert!(coll.snapshot().is_empty());
        assert!(!coll.path().exists());
    }

    #[test]
    fn mutation_saves_and_reload_round_trips() {
        let path = temp_path("nums.json");
        let coll: JsonCollection<u32> = JsonCollection::open(path.clone()).unwrap();

        coll.try_mutate(|nums| -> Result<(), ()> {
            nums.extend([1, 2, 3]);
            Ok(())
        })
        .unwrap()
        .unwrap();

        let other: JsonCollection<u32> = JsonCollection::open(path).unwrap();
        assert_eq!(other.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn failed_mutation_leaves_memory_and_disk_untouched() {
        let path = temp_path("nums.json");
        let coll: JsonCollection<u32> = JsonCollection::open(path).unwrap();

        let res = coll.try_mutate(|nums| -> Result<(), &str> {
            nums.push(9);
            Err("nope")
        });

        assert!(matches!(res, Ok(Err("nope"))));
        assert!(coll.snapshot().is_empty());
        assert!(!coll.path().exists());
    }

    #[test]
    fn poisoned_lock_still_serves_snapshots() {
        let coll: JsonCollection<u32> = JsonCollection::open(temp_path("nums.json")).unwrap();
        coll.try_mutate(|nums| -> Result<(), ()> {
            nums.push(7);
            Ok(())
        })
        .unwrap()
        .unwrap();

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = coll.try_mutate(|_| -> Result<(), ()> { panic!("writer died") });
        }));
        assert!(poisoned.is_err());

        assert_eq!(coll.snapshot(), vec![7]);
    }

    #[test]
    fn corrupt_file_keeps_memory_on_reload() {
        let path = temp_path("nums.json");
        let coll: JsonCollection<u32> = JsonCollection::open(path.clone()).unwrap();
        coll.try_mutate(|nums| -> Result<(), ()> {
            nums.push(42);
            Ok(())
        })
        .unwrap()
        .unwrap();

        fs::write(&path, b"{not json").unwrap();

        assert!(coll.reload().is_err());
        assert_eq!(coll.snapshot(), vec![42]);
    }
}
