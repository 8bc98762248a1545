use {
    crate::error::{WalrusError, WalrusResult},
    log::{debug, warn},
    lru::LruCache,
    sha2::{Digest, Sha256},
    std::{
        num::NonZeroUsize,
        path::{Path, PathBuf},
        sync::{Mutex, MutexGuard},
    },
    tempfile::TempDir,
};

/// Default number of blobs kept by a [`BlobCache`].
pub const DEFAULT_CACHE_MAX_SIZE: usize = 100;
/// Prefix of the temporary directory created when no cache dir is given.
pub const CACHE_DIR_PREFIX: &str = "walrus_cache_";

/// A cache for downloaded blobs so that repeated reads don't hit the network.
///
/// Blobs are stored as individual files named after the SHA-256 of their
/// blob ID. The in-memory index keeps them in least-recently-used order and
/// evicts (and deletes) the oldest entry once `max_size` blobs are cached.
///
/// When no directory is given the cache lives in a fresh temporary directory
/// that is removed when the cache is dropped.
pub struct BlobCache {
    dir: PathBuf,
    max_size: NonZeroUsize,
    index: Mutex<LruCache<String, PathBuf>>,
    /// Only set when the cache created its own temporary directory.
    owned_dir: Mutex<Option<TempDir>>,
}

impl BlobCache {
    /// Create a new cache in `cache_dir`, or in a temporary directory if
    /// `None`. The directory is created if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>, max_size: usize) -> WalrusResult<Self> {
        let max_size = NonZeroUsize::new(max_size).ok_or_else(|| {
            WalrusError::InvalidConfig("Cache max size must be greater than 0".to_string())
        })?;

        let (dir, owned_dir) = match cache_dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir).map_err(|e| {
                    WalrusError::io(format!("Failed to create cache dir {}", dir.display()), e)
                })?;

                (dir, None)
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix(CACHE_DIR_PREFIX)
                    .tempdir()
                    .map_err(|e| WalrusError::io("Failed to create temporary cache dir", e))?;

                (temp.path().to_path_buf(), Some(temp))
            }
        };

        debug!(
            "Blob cache at {} holding up to {} blobs",
            dir.display(),
            max_size
        );

        Ok(Self {
            dir,
            max_size,
            index: Mutex::new(LruCache::new(max_size)),
            owned_dir: Mutex::new(owned_dir),
        })
    }

    /// Retrieve a blob from the cache, marking it as most recently used.
    ///
    /// An entry whose file can no longer be read is dropped from the cache.
    /// The index lock is not held while the file is read.
    pub fn get(&self, blob_id: &str) -> Option<Vec<u8>> {
        let path = self.index().get(blob_id)?.clone();

        match std::fs::read(&path) {
            Ok(data) => {
                debug!("Blob cache hit for '{blob_id}'");

                Some(data)
            }
            Err(e) => {
                warn!("Dropping unreadable cache entry for '{blob_id}': {e}");

                if self.index().pop(blob_id).is_some() {
                    remove_file_quietly(&path);
                }

                None
            }
        }
    }

    /// Store a blob in the cache and return the path of its file.
    ///
    /// The blob is written before the index lock is taken. If the cache is
    /// full, the least recently used blob is then evicted. Re-putting a
    /// cached blob overwrites it and marks it as most recently used.
    pub fn put(&self, blob_id: &str, data: &[u8]) -> WalrusResult<PathBuf> {
        let path = self.path_for(blob_id);

        if let Err(e) = std::fs::write(&path, data) {
            self.index().pop(blob_id);
            remove_file_quietly(&path);

            return Err(WalrusError::io(
                format!("Failed to cache blob '{blob_id}'"),
                e,
            ));
        }

        let evicted = self.index().push(blob_id.to_string(), path.clone());

        if let Some((evicted, evicted_path)) = evicted {
            if evicted != blob_id {
                debug!("Evicting '{evicted}' from the blob cache");

                remove_file_quietly(&evicted_path);
            }
        }

        Ok(path)
    }

    /// Remove a blob from the cache. Returns whether it was cached.
    pub fn remove(&self, blob_id: &str) -> bool {
        match self.index().pop(blob_id) {
            Some(path) => {
                remove_file_quietly(&path);

                true
            }
            None => false,
        }
    }

    /// Whether the blob is cached. Does not affect recency.
    pub fn contains(&self, blob_id: &str) -> bool {
        self.index().contains(blob_id)
    }

    pub fn len(&self) -> usize {
        self.index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index().is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size.get()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Forget every cached blob and remove the cache directory.
    pub fn cleanup(&self) {
        self.index().clear();

        let owned = self
            .owned_dir
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        let result = match owned {
            Some(temp) => temp.close(),
            None => std::fs::remove_dir_all(&self.dir),
        };

        if let Err(e) = result {
            debug!("Failed to remove cache dir {}: {e}", self.dir.display());
        }
    }

    /// Path of the file holding `blob_id`, named after its SHA-256 digest.
    pub fn path_for(&self, blob_id: &str) -> PathBuf {
        self.dir.join(hex::encode(Sha256::digest(blob_id.as_bytes())))
    }

    fn index(&self) -> MutexGuard<'_, LruCache<String, PathBuf>> {
        // The index is always left consistent, a panic elsewhere can't corrupt it.
        self.index
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for BlobCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobCache")
            .field("dir", &self.dir)
            .field("max_size", &self.max_size)
            .field("len", &self.len())
            .finish()
    }
}

fn remove_file_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!("Failed to remove cached file {}: {e}", path.display());
        }
    }
}
