// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::Entity;
use crate::portal::models::DocumentKind;
use crate::utils::error::{PortalError, StorageError};

/// Fetch collaborator the store falls back to on a cache miss. The store is
/// the only caller; everything else sees documents through the cache.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, tax_id: &str, kind: &DocumentKind) -> Result<String, PortalError>;
}

/// Cache-first document store. Maps (entity, document kind) to a file under
/// the base directory and fetches a document at most once per key: once a
/// file exists it is read back verbatim and the fetcher is never consulted
/// again, which makes an interrupted run resumable.
pub struct DocumentStore<F> {
    base_dir: PathBuf,
    fetcher: F,
}

impl<F: Fetcher> DocumentStore<F> {
    pub fn new<P: AsRef<Path>>(base_dir: P, fetcher: F) -> Result<Self, StorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
        }
        Ok(Self { base_dir, fetcher })
    }

    /// Storage layout: a folder per entity, a file per document.
    /// Entity details: `<name>/<tax_id>.htm`
    /// Statement:      `<name>/<tax_id>-<year>.html`
    fn document_path(&self, entity: &Entity, kind: &DocumentKind) -> PathBuf {
        let filename = match kind {
            DocumentKind::EntityDetails => format!("{}.htm", entity.tax_id),
            DocumentKind::Statement(statement) => {
                format!("{}-{}.html", entity.tax_id, statement.year)
            }
        };
        self.base_dir.join(&entity.name).join(filename)
    }

    /// Returns the document for (entity, kind), downloading and persisting
    /// it first if it is not cached yet. The raw body is stored untouched,
    /// and only after it has arrived in full - a failed fetch leaves no
    /// partial file behind.
    pub async fn get(&self, entity: &Entity, kind: &DocumentKind) -> Result<String, StorageError> {
        let path = self.document_path(entity, kind);

        if path.exists() {
            tracing::debug!("Cache hit: {}", path.display());
            return Ok(fs::read_to_string(&path)?);
        }

        tracing::info!(
            "Downloading {} for {} to {}",
            kind.describe(),
            entity.name,
            path.display()
        );
        let body = self
            .fetcher
            .fetch(&entity.tax_id, kind)
            .await
            .map_err(|source| StorageError::FetchFailed {
                entity: entity.name.clone(),
                kind: kind.describe(),
                source,
            })?;

        if let Some(entity_dir) = path.parent() {
            fs::create_dir_all(entity_dir)?;
        }
        fs::write(&path, &body)?;

        Ok(body)
    }
}
