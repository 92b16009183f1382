#![deny(missing_docs)]
//! Filesystem-backed implementation of [`KeyValueStore`].
//!
//! The bearer token and onboarding flags survive restarts: each scope is
//! a subdirectory of the root and each key a percent-encoded `.json` file.

use async_trait::async_trait;
use finbot_types::{KeyValueStore, Scope, StorageError};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence for temp file names, unique within the process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Persistent store rooted at a directory.
///
/// ```text
/// root/
///   global/
///     auth%3Atoken.json
///   user-<encoded-id>/
///     onboarding%3Aseen.json
/// ```
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Store rooted at `root`. Directories are created on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scope_dir(&self, scope: &Scope) -> PathBuf {
        self.root.join(scope_dir_name(scope))
    }

    fn key_path(&self, scope: &Scope, key: &str) -> PathBuf {
        self.scope_dir(scope).join(key_to_filename(key))
    }
}

fn scope_dir_name(scope: &Scope) -> String {
    match scope {
        Scope::Global => "global".into(),
        Scope::User(id) => format!("user-{}", encode(id)),
    }
}

/// Percent-encode everything outside `[A-Za-z0-9_.-]`.
fn encode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

fn decode(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn key_to_filename(key: &str) -> String {
    format!("{}.json", encode(key))
}

fn filename_to_key(filename: &str) -> Option<String> {
    decode(filename.strip_suffix(".json")?)
}

/// `<file>.<pid>-<seq>.tmp` next to `path`. Never decodes as a key.
fn temp_path(path: &Path) -> PathBuf {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}-{seq}.tmp", std::process::id()));
    path.with_file_name(name)
}

fn read_failed(e: std::io::Error) -> StorageError {
    StorageError::ReadFailed(e.to_string())
}

fn write_failed(e: std::io::Error) -> StorageError {
    StorageError::WriteFailed(e.to_string())
}

#[async_trait]
impl KeyValueStore for FsStore {
    async fn get(&self, scope: &Scope, key: &str) -> Result<Option<Value>, StorageError> {
        match tokio::fs::read_to_string(self.key_path(scope, key)).await {
            Ok(contents) => serde_json::from_str(&contents)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(read_failed(e)),
        }
    }

    async fn set(&self, scope: &Scope, key: &str, value: Value) -> Result<(), StorageError> {
        let dir = self.scope_dir(scope);
        tokio::fs::create_dir_all(&dir).await.map_err(write_failed)?;

        let contents = serde_json::to_string_pretty(&value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let path = dir.join(key_to_filename(key));
        // Write-then-rename: readers never observe a partial file. Each
        // writer gets its own temp file, so concurrent sets never share one.
        let tmp = temp_path(&path);
        let written = match tokio::fs::write(&tmp, contents).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_failed(e));
        }
        Ok(())
    }

    async fn remove(&self, scope: &Scope, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.key_path(scope, key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(write_failed(e)),
        }
    }

    async fn list(&self, scope: &Scope, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut entries = match tokio::fs::read_dir(self.scope_dir(scope)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(read_failed(e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
            let Some(key) = entry.file_name().to_str().and_then(filename_to_key) else {
                continue;
            };
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
