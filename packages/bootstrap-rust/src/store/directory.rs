//! JSON-file [`DocumentStore`]: one file per document.
//!
//! Layout: `<root>/<wiki>/<Space.Page>.json`. Writes go to a temporary file
//! that is renamed over the target, so a crash never leaves a torn document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use classsync_core::{DocumentReference, PersistedDocument};
use tracing::debug;

use crate::traits::DocumentStore;

/// Document store writing pretty-printed JSON files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryDocumentStore {
    root: PathBuf,
}

impl DirectoryDocumentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `reference`. Segments that could escape the root are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the wiki id or the local reference contains a path
    /// separator of the host platform or is a relative path component.
    pub fn path_for(&self, reference: &DocumentReference) -> anyhow::Result<PathBuf> {
        let file = reference.local.to_string();
        for segment in [reference.wiki.as_str(), file.as_str()] {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.chars().any(std::path::is_separator)
            {
                anyhow::bail!("reference {reference} cannot be mapped to a file name");
            }
        }
        Ok(self.root.join(&reference.wiki).join(format!("{file}.json")))
    }
}

#[async_trait]
impl DocumentStore for DirectoryDocumentStore {
    async fn load(&self, reference: &DocumentReference) -> anyhow::Result<Option<PersistedDocument>> {
        let path = self.path_for(reference)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        let document: PersistedDocument = serde_json::from_slice(&bytes)
            .with_context(|| format!("decoding {}", path.display()))?;
        if document.reference != *reference {
            anyhow::bail!(
                "{} holds {} instead of {reference}",
                path.display(),
                document.reference
            );
        }
        Ok(Some(document))
    }

    async fn save(&self, document: &PersistedDocument) -> anyhow::Result<()> {
        let path = self.path_for(&document.reference)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let mut stored = document.clone();
        stored.mark_saved();
        let json = serde_json::to_vec_pretty(&stored)?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("replacing {}", path.display()))?;
        debug!(path = %path.display(), "document written");
        Ok(())
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("creating store root {}", self.root.display()))
    }
}
