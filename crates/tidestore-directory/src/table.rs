//! In-memory file table with optimistic concurrency control
//!
//! One record per filename. Writers never block readers of other files:
//! the map is sharded, and the check-then-set inside [`FileTable::modify`]
//! and [`FileTable::delete`] holds only the entry lock for its own key, so
//! updates to one filename serialize among themselves while every other
//! filename proceeds independently.
//!
//! The race between a client's read and its subsequent modify is allowed
//! and resolved by the version gate, not prevented: whichever submit
//! arrives first at version `current + 1` wins, the loser gets the new
//! current version back and must re-read.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use tidestore_core::domain::errors::StoreError;
use tidestore_core::domain::newtypes::FileName;
use tidestore_core::domain::record::{BlockRef, FileRecord};
use tidestore_core::ports::IMetadataDirectory;

/// The authoritative filename -> record table
pub struct FileTable {
    files: DashMap<FileName, FileRecord>,
}

impl FileTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
        }
    }

    /// Current record for `name`; unknown names read as absent.
    #[must_use]
    pub fn read(&self, name: &FileName) -> FileRecord {
        self.files
            .get(name)
            .map(|record| record.clone())
            .unwrap_or_else(FileRecord::absent)
    }

    /// Replace the record for `name` if `proposed_version` is exactly one
    /// above the current version.
    ///
    /// Returns the entries whose hashes were not recorded for this filename
    /// in the immediately prior record. The prior set is per-file: a block
    /// known under a different filename is still reported missing here.
    ///
    /// # Errors
    /// [`StoreError::VersionConflict`] with the current version when the
    /// gate fails; the record is untouched.
    pub fn modify(
        &self,
        name: &FileName,
        proposed_version: u64,
        entries: Vec<BlockRef>,
    ) -> Result<Vec<BlockRef>, StoreError> {
        match self.files.entry(name.clone()) {
            Entry::Occupied(mut occupied) => {
                let current = occupied.get().version;
                if proposed_version != current + 1 {
                    debug!(file = %name, proposed = proposed_version, current, "Modify rejected");
                    return Err(StoreError::VersionConflict { current });
                }

                let missing: Vec<BlockRef> = {
                    let prior = occupied.get().hash_set();
                    entries
                        .iter()
                        .filter(|e| !prior.contains(&e.hash))
                        .cloned()
                        .collect()
                };
                occupied.insert(FileRecord::new(proposed_version, entries));
                Ok(missing)
            }
            Entry::Vacant(vacant) => {
                if proposed_version != 1 {
                    debug!(file = %name, proposed = proposed_version, "Modify rejected, file unknown");
                    return Err(StoreError::VersionConflict { current: 0 });
                }

                // Nothing existed before, so every entry is missing
                let missing = entries.clone();
                vacant.insert(FileRecord::new(1, entries));
                Ok(missing)
            }
        }
    }

    /// Replace the record for `name` with a tombstone at `proposed_version`.
    ///
    /// # Errors
    /// [`StoreError::FileNotFound`] when the filename was never created;
    /// [`StoreError::VersionConflict`] when the gate fails.
    pub fn delete(&self, name: &FileName, proposed_version: u64) -> Result<(), StoreError> {
        match self.files.entry(name.clone()) {
            Entry::Occupied(mut occupied) => {
                let current = occupied.get().version;
                if proposed_version != current + 1 {
                    debug!(file = %name, proposed = proposed_version, current, "Delete rejected");
                    return Err(StoreError::VersionConflict { current });
                }
                occupied.insert(FileRecord::new(proposed_version, Vec::new()));
                Ok(())
            }
            Entry::Vacant(_) => Err(StoreError::FileNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Number of filenames the table has ever recorded (tombstones included)
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}

// The table itself satisfies the directory port, which is what the engine
// unit tests run against without any HTTP in between.
#[async_trait::async_trait]
impl IMetadataDirectory for FileTable {
    async fn read_file(&self, name: &FileName) -> Result<FileRecord, StoreError> {
        Ok(self.read(name))
    }

    async fn modify_file(
        &self,
        name: &FileName,
        proposed_version: u64,
        entries: Vec<BlockRef>,
    ) -> Result<Vec<BlockRef>, StoreError> {
        self.modify(name, proposed_version, entries)
    }

    async fn delete_file(
        &self,
        name: &FileName,
        proposed_version: u64,
    ) -> Result<(), StoreError> {
        self.delete(name, proposed_version)
    }
}
