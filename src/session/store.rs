//! Key-value store collaborator for session records and the score ledger.
//!
//! The engine only ever sees the [`KvStore`] trait: opaque string blobs
//! keyed by game id. [`FileStore`] is the production implementation; it
//! keeps the whole map in memory and mirrors every mutation into a
//! checksummed binary file so a torn or tampered write reads back as an
//! empty store instead of a crash.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// File format version magic ("CHOREQ" + format revision).
const STORE_VERSION_MAGIC: u64 = 0x4348_4F52_4551_0001;

/// Opaque string store keyed by game id.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }
}

/// File-backed store under `~/.chorequest/`.
///
/// File layout:
/// - Version magic (8 bytes)
/// - Data length (4 bytes)
/// - Bincode-serialized map (variable length)
/// - SHA256 checksum over the three preceding sections (32 bytes)
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    map: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or create) the store at the default per-user location.
    pub fn open() -> io::Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine home directory")
        })?;
        let dir = home.join(".chorequest");
        fs::create_dir_all(&dir)?;
        Ok(Self::at_path(dir.join("sessions.dat")))
    }

    /// Open a store at an explicit path. A missing or unreadable file is an
    /// empty store.
    pub fn at_path(path: PathBuf) -> Self {
        let map = match Self::load_map(&path) {
            Ok(map) => map,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(path = %path.display(), %err, "discarding unreadable session store");
                BTreeMap::new()
            }
        };
        Self { path, map }
    }

    fn load_map(path: &PathBuf) -> io::Result<BTreeMap<String, String>> {
        let mut file = fs::File::open(path)?;

        let mut version_bytes = [0u8; 8];
        file.read_exact(&mut version_bytes)?;
        let version = u64::from_le_bytes(version_bytes);
        if version != STORE_VERSION_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Invalid store version: expected 0x{:016X}, got 0x{:016X}",
                    STORE_VERSION_MAGIC, version
                ),
            ));
        }

        let mut length_bytes = [0u8; 4];
        file.read_exact(&mut length_bytes)?;
        let data_len = u32::from_le_bytes(length_bytes);

        let mut data = vec![0u8; data_len as usize];
        file.read_exact(&mut data)?;

        let mut stored_checksum = [0u8; 32];
        file.read_exact(&mut stored_checksum)?;

        let mut hasher = Sha256::new();
        hasher.update(version_bytes);
        hasher.update(length_bytes);
        hasher.update(&data);
        let computed_checksum = hasher.finalize();

        if stored_checksum != computed_checksum.as_slice() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Checksum verification failed",
            ));
        }

        bincode::deserialize(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Mirror the current map to disk. Persistence is fire-and-forget: a
    /// failed write is logged, never surfaced to a session transition.
    fn flush(&self) {
        if let Err(err) = self.write_map() {
            warn!(path = %self.path.display(), %err, "session store write failed");
        }
    }

    fn write_map(&self) -> io::Result<()> {
        let data = bincode::serialize(&self.map)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let data_len = data.len() as u32;

        let mut hasher = Sha256::new();
        hasher.update(STORE_VERSION_MAGIC.to_le_bytes());
        hasher.update(data_len.to_le_bytes());
        hasher.update(&data);
        let checksum = hasher.finalize();

        let mut file = fs::File::create(&self.path)?;
        file.write_all(&STORE_VERSION_MAGIC.to_le_bytes())?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&data)?;
        file.write_all(&checksum)?;

        debug!(path = %self.path.display(), entries = self.map.len(), "session store flushed");
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.map.remove(key).is_some() {
            self.flush();
        }
    }
}
