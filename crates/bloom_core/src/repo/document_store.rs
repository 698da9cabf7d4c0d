//! Document store contracts and file-per-document implementation.
//!
//! # Responsibility
//! - Persist one `.bloom` file per document under a single directory.
//! - Enumerate stored documents without decoding them.
//!
//! # Invariants
//! - The file stem is the document id; ids never contain path separators.
//! - Saves write a sibling temp file and rename it over the target.
//! - Listing a missing storage directory yields an empty list.
//! - Deleting a missing document succeeds (best-effort delete).
//! - Listing order is by file name.

use crate::model::document::{Document, DocumentId};
use crate::repo::codec::{deserialize_document, serialize_document, DocumentCodecError};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// File extension (without dot) of persisted documents.
pub const DOCUMENT_FILE_EXTENSION: &str = "bloom";
const TEMP_FILE_SUFFIX: &str = "tmp";
const MEMORY_ROOT: &str = "memory";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation failure.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure at `path`.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Stored text at `path` could not be decoded.
    Codec {
        path: PathBuf,
        source: DocumentCodecError,
    },
    /// No stored document at `path`.
    NotFound(PathBuf),
    /// Id is empty or would escape the storage directory.
    InvalidId(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "storage I/O failed at `{}`: {source}", path.display())
            }
            Self::Codec { path, source } => write!(f, "{source} (`{}`)", path.display()),
            Self::NotFound(path) => write!(f, "document not found: `{}`", path.display()),
            Self::InvalidId(id) => write!(f, "invalid document id: `{id}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Codec { source, .. } => Some(source),
            Self::NotFound(_) | Self::InvalidId(_) => None,
        }
    }
}

/// Listing entry for one stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub id: DocumentId,
    pub file_name: String,
    pub path: PathBuf,
}

/// Persistence port used by the lifecycle manager.
pub trait DocumentStore {
    /// Writes `doc` under `id`, replacing any previous version.
    fn save(&self, id: &str, doc: &Document) -> StoreResult<()>;
    /// Reads and decodes the document at `path` (as returned by `list`).
    fn load(&self, path: &Path) -> StoreResult<Document>;
    /// Enumerates stored documents.
    fn list(&self) -> StoreResult<Vec<DocumentMeta>>;
    /// Removes the document stored under `id`.
    fn delete(&self, id: &str) -> StoreResult<()>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn save(&self, id: &str, doc: &Document) -> StoreResult<()> {
        (**self).save(id, doc)
    }

    fn load(&self, path: &Path) -> StoreResult<Document> {
        (**self).load(path)
    }

    fn list(&self) -> StoreResult<Vec<DocumentMeta>> {
        (**self).list()
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        (**self).delete(id)
    }
}

/// Returns the file name used for `id`.
pub fn document_file_name(id: &str) -> String {
    format!("{id}.{DOCUMENT_FILE_EXTENSION}")
}

/// Accepts ids that map to exactly one file inside the storage directory.
pub fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.chars().any(|c| matches!(c, '/' | '\\' | '\0'))
}

fn ensure_valid_id(id: &str) -> StoreResult<()> {
    if is_valid_document_id(id) {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

/// Filesystem store rooted at one storage directory.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the file for `id`.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(document_file_name(id))
    }
}

impl DocumentStore for FileDocumentStore {
    fn save(&self, id: &str, doc: &Document) -> StoreResult<()> {
        ensure_valid_id(id)?;
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let target = self.path_for(id);
        let temp = target.with_extension(format!("{DOCUMENT_FILE_EXTENSION}.{TEMP_FILE_SUFFIX}"));
        let contents = serialize_document(doc);
        fs::write(&temp, contents.as_bytes()).map_err(|source| StoreError::Io {
            path: temp.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::Io {
                path: target,
                source,
            });
        }

        debug!(
            "event=document_save module=store status=ok id={} bytes={}",
            id,
            contents.len()
        );
        Ok(())
    }

    fn load(&self, path: &Path) -> StoreResult<Document> {
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StoreError::NotFound(path.to_path_buf())
            } else {
                StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        deserialize_document(&contents).map_err(|source| StoreError::Codec {
            path: path.to_path_buf(),
            source,
        })
    }

    fn list(&self) -> StoreResult<Vec<DocumentMeta>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut metas = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_FILE_EXTENSION) {
                continue;
            }
            let (Some(file_name), Some(id)) = (
                path.file_name().and_then(|name| name.to_str()),
                path.file_stem().and_then(|stem| stem.to_str()),
            ) else {
                warn!(
                    "event=document_list module=store status=skip reason=non_utf8_name path={}",
                    path.display()
                );
                continue;
            };
            metas.push(DocumentMeta {
                id: id.to_string(),
                file_name: file_name.to_string(),
                path: path.clone(),
            });
        }
        metas.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        debug!(
            "event=document_list module=store status=ok count={}",
            metas.len()
        );
        Ok(metas)
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        ensure_valid_id(id)?;
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("event=document_delete module=store status=ok id={id}");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("event=document_delete module=store status=missing id={id}");
                Ok(())
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// In-process store keeping serialized documents in memory.
///
/// Stores encoded text rather than `Document` values so the codec runs on
/// every save/load, as it does on disk.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    files: Mutex<BTreeMap<DocumentId, String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw text under `id`, bypassing the encoder.
    pub fn insert_raw(&self, id: impl Into<DocumentId>, contents: impl Into<String>) {
        self.lock().insert(id.into(), contents.into());
    }

    /// Raw stored text for `id`.
    pub fn raw(&self, id: &str) -> Option<String> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Virtual path reported by `list` for `id`.
    pub fn path_for(&self, id: &str) -> PathBuf {
        Path::new(MEMORY_ROOT).join(document_file_name(id))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<DocumentId, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn save(&self, id: &str, doc: &Document) -> StoreResult<()> {
        ensure_valid_id(id)?;
        self.lock().insert(id.to_string(), serialize_document(doc));
        Ok(())
    }

    fn load(&self, path: &Path) -> StoreResult<Document> {
        let id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))?;
        let contents = self
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))?;
        deserialize_document(&contents).map_err(|source| StoreError::Codec {
            path: path.to_path_buf(),
            source,
        })
    }

    fn list(&self) -> StoreResult<Vec<DocumentMeta>> {
        Ok(self
            .lock()
            .keys()
            .map(|id| DocumentMeta {
                id: id.clone(),
                file_name: document_file_name(id),
                path: self.path_for(id),
            })
            .collect())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        ensure_valid_id(id)?;
        self.lock().remove(id);
        Ok(())
    }
}
