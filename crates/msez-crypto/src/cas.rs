//! # Content-Addressed Storage (CAS)
//!
//! Store and resolve operations for the content-addressed artifact store.
//! Artifacts are named by their content digest: `<root>/<type>/<digest>.json`.
//!
//! ## Security Invariant
//!
//! All stored artifacts are verified at retrieval time — the digest of the
//! retrieved content must match the digest named in its path. This prevents
//! both corruption and substitution attacks. Writes are atomic (write to a
//! temp file, then rename) so a crash never leaves a partial artifact
//! visible under its final name, and idempotent: writing content that
//! already matches what's on disk is a no-op success, not an error.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use msez_core::{CanonicalBytes, ContentDigest};

use crate::error::CasError;
use crate::sha256::sha256_digest;

/// A content-addressed artifact store backed by the filesystem.
#[derive(Debug, Clone)]
pub struct CasStore {
    /// Root directory of the CAS store (e.g., `dist/artifacts/`).
    root: PathBuf,
}

impl CasStore {
    /// Create a CAS store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory of this store.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Compute the filesystem path for an artifact by type and digest.
    pub fn artifact_path(&self, artifact_type: &str, digest: &ContentDigest) -> PathBuf {
        self.root
            .join(artifact_type)
            .join(format!("{}.json", digest.to_hex()))
    }

    /// Store `content`'s canonical bytes under `<type>/<digest(content)>.json`.
    ///
    /// Idempotent: if a file already exists at that path with matching
    /// content, this is a no-op success. If a file exists with *different*
    /// content, returns [`CasError::HashCollision`] — the digest in the path
    /// name must always describe what's on disk. Writes are atomic: content
    /// is written to a sibling temp file and renamed into place, so a reader
    /// never observes a partially written artifact.
    pub fn store(
        &self,
        artifact_type: &str,
        content: &impl serde::Serialize,
    ) -> Result<ContentDigest, CasError> {
        let canonical = CanonicalBytes::new(content)
            .map_err(|e| CasError::Io(std::io::Error::other(e.to_string())))?;
        let digest = sha256_digest(&canonical);
        self.store_bytes(artifact_type, &digest, canonical.as_bytes())?;
        Ok(digest)
    }

    /// Store raw bytes under an explicitly declared digest.
    ///
    /// Used when the caller has already computed the canonical bytes (and
    /// digest) elsewhere and wants to avoid re-canonicalizing.
    pub fn store_bytes(
        &self,
        artifact_type: &str,
        digest: &ContentDigest,
        bytes: &[u8],
    ) -> Result<(), CasError> {
        let path = self.artifact_path(artifact_type, digest);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            let existing = fs::read(&path)?;
            if existing == bytes {
                return Ok(());
            }
            return Err(CasError::HashCollision {
                artifact_type: artifact_type.to_string(),
                digest: digest.to_hex(),
            });
        }

        let tmp_path = tmp_path_for(&path);
        {
            let mut tmp = fs::File::create(&tmp_path)?;
            tmp.write_all(bytes)?;
            tmp.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Read and hash-verify the artifact at `(type, digest)`.
    ///
    /// Returns [`CasError::NotFound`] if absent, [`CasError::IntegrityMismatch`]
    /// if the content on disk no longer hashes to the requested digest.
    pub fn resolve_bytes(
        &self,
        artifact_type: &str,
        digest: &ContentDigest,
    ) -> Result<Vec<u8>, CasError> {
        let path = self.artifact_path(artifact_type, digest);
        if !path.exists() {
            return Err(CasError::NotFound {
                artifact_type: artifact_type.to_string(),
                digest: digest.to_hex(),
            });
        }
        let bytes = fs::read(&path)?;
        let parsed: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| CasError::Io(std::io::Error::other(e.to_string())))?;
        let canonical = CanonicalBytes::new(&parsed)
            .map_err(|e| CasError::Io(std::io::Error::other(e.to_string())))?;
        let actual = sha256_digest(&canonical);
        if &actual != digest {
            return Err(CasError::IntegrityMismatch {
                artifact_type: artifact_type.to_string(),
                digest: digest.to_hex(),
                actual: actual.to_hex(),
            });
        }
        Ok(bytes)
    }

    /// Whether an artifact exists at `(type, digest)` without reading it.
    pub fn exists(&self, artifact_type: &str, digest: &ContentDigest) -> bool {
        self.artifact_path(artifact_type, digest).exists()
    }
}

/// The name of the environment variable naming additional, read-only CAS
/// search roots, joined with the platform path separator (`:` on Unix,
/// `;` on Windows) — see `std::env::split_paths`.
pub const ARTIFACT_STORE_DIRS_ENV: &str = "MSEZ_ARTIFACT_STORE_DIRS";

/// The default CAS root used when no other root is configured.
pub const DEFAULT_ARTIFACT_STORE_ROOT: &str = "dist/artifacts";

/// A primary (writable) CAS root plus zero or more additional read-only
/// search roots. Resolution tries the primary root first, then each
/// additional root in order — a receipt's attachments may point at
/// artifacts a sibling process staged in a shared, read-only root that
/// this process never writes to.
#[derive(Debug, Clone)]
pub struct CasStoreSet {
    primary: CasStore,
    additional: Vec<CasStore>,
}

impl CasStoreSet {
    /// A store set with a single, writable root and no additional search
    /// roots.
    pub fn single(root: impl Into<PathBuf>) -> Self {
        Self {
            primary: CasStore::new(root),
            additional: Vec::new(),
        }
    }

    /// Builds a store set from an explicit primary root plus additional
    /// read-only search roots.
    pub fn new(primary_root: impl Into<PathBuf>, additional_roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            primary: CasStore::new(primary_root),
            additional: additional_roots.into_iter().map(CasStore::new).collect(),
        }
    }

    /// Builds a store set from `primary_root` plus whatever roots
    /// [`ARTIFACT_STORE_DIRS_ENV`] names in the process environment, if set.
    pub fn from_env(primary_root: impl Into<PathBuf>) -> Self {
        let additional = std::env::var_os(ARTIFACT_STORE_DIRS_ENV)
            .map(|v| std::env::split_paths(&v).collect())
            .unwrap_or_default();
        Self::new(primary_root, additional)
    }

    /// The writable root new artifacts are stored under.
    pub fn primary(&self) -> &CasStore {
        &self.primary
    }

    /// Writes always go to the primary root — see [`CasStore::store`].
    pub fn store(&self, artifact_type: &str, content: &impl serde::Serialize) -> Result<ContentDigest, CasError> {
        self.primary.store(artifact_type, content)
    }

    /// True if `(type, digest)` resolves in the primary root or any
    /// additional search root.
    pub fn exists(&self, artifact_type: &str, digest: &ContentDigest) -> bool {
        self.primary.exists(artifact_type, digest)
            || self.additional.iter().any(|s| s.exists(artifact_type, digest))
    }

    /// Resolves `(type, digest)` against the primary root first, then each
    /// additional root in order; [`CasError::NotFound`] if none has it.
    pub fn resolve_bytes(&self, artifact_type: &str, digest: &ContentDigest) -> Result<Vec<u8>, CasError> {
        let mut last_err = None;
        for store in std::iter::once(&self.primary).chain(self.additional.iter()) {
            match store.resolve_bytes(artifact_type, digest) {
                Ok(bytes) => return Ok(bytes),
                Err(CasError::NotFound { .. }) => continue,
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| CasError::NotFound {
            artifact_type: artifact_type.to_string(),
            digest: digest.to_hex(),
        }))
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp"))
}
