use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::{ExportConfig, ExportTarget};
use crate::helpers::paths;

use super::ExportError;

/// A rendered document ready to be persisted
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocation {
    File(PathBuf),
    /// Relative URL the browser fetches the document from
    Download(String),
}

/// Host-specific persistence for exported documents.
///
/// One call persists exactly one artifact, or fails leaving nothing behind on
/// the primary medium.
pub trait ArtifactWriter: Send + Sync {
    fn write(&self, artifact: &Artifact) -> Result<ArtifactLocation, ExportError>;
}

/// Writes the artifact into a directory, optionally copying it to a second one.
pub struct DirectoryWriter {
    primary: PathBuf,
    secondary: Option<PathBuf>,
}

impl DirectoryWriter {
    pub fn new(primary: PathBuf, secondary: Option<PathBuf>) -> Self {
        Self { primary, secondary }
    }

    /// Downloads folder, copied into the documents folder.
    pub fn desktop(config: &ExportConfig) -> Result<Self, ExportError> {
        let primary = match &config.output_dir {
            Some(dir) => dir.clone(),
            None => paths::get_downloads_dir().map_err(|e| ExportError::Unavailable(e.to_string()))?,
        };
        let secondary = config.secondary_dir.clone().or_else(dirs::document_dir);

        Ok(Self::new(primary, secondary))
    }

    /// The application's private storage directory; no secondary copy.
    pub fn app_storage(config: &ExportConfig) -> Result<Self, ExportError> {
        let primary = match &config.output_dir {
            Some(dir) => dir.clone(),
            None => {
                paths::get_app_storage_dir().map_err(|e| ExportError::Unavailable(e.to_string()))?
            }
        };

        Ok(Self::new(primary, None))
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }
}

/// Writes through a temp file in `dir` and renames it into place, so a failed
/// write never leaves a truncated document.
fn write_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
    temp_file.write_all(bytes)?;
    temp_file.as_file().sync_all()?;

    let target = dir.join(file_name);
    temp_file.persist(&target).map_err(|e| e.error)?;

    Ok(target)
}

impl ArtifactWriter for DirectoryWriter {
    fn write(&self, artifact: &Artifact) -> Result<ArtifactLocation, ExportError> {
        let path = write_atomically(&self.primary, &artifact.file_name, &artifact.bytes).map_err(
            |source| ExportError::Write {
                file_name: artifact.file_name.clone(),
                source,
            },
        )?;
        tracing::info!("Document saved to {}", path.display());

        if let Some(secondary) = self.secondary.as_deref().filter(|dir| *dir != self.primary.as_path()) {
            match write_atomically(secondary, &artifact.file_name, &artifact.bytes) {
                Ok(copy) => tracing::info!("Copy saved to {}", copy.display()),
                Err(e) => tracing::warn!(
                    "Failed to save copy of {} to {}: {}",
                    artifact.file_name,
                    secondary.display(),
                    e
                ),
            }
        }

        Ok(ArtifactLocation::File(path))
    }
}

/// Browser target: keeps rendered documents in memory until downloaded once.
pub struct DownloadStore {
    pending: Mutex<VecDeque<Artifact>>,
    capacity: usize,
}

impl DownloadStore {
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn download_url(file_name: &str) -> String {
        format!("/api/exports/{}", file_name)
    }

    /// Removes and returns the document; a second download finds nothing.
    pub fn take(&self, file_name: &str) -> Option<Vec<u8>> {
        let mut pending = self.pending.lock().ok()?;
        let index = pending.iter().position(|a| a.file_name == file_name)?;
        pending.remove(index).map(|artifact| artifact.bytes)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DownloadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactWriter for DownloadStore {
    fn write(&self, artifact: &Artifact) -> Result<ArtifactLocation, ExportError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| ExportError::Unavailable("download store lock poisoned".to_string()))?;

        while pending.len() >= self.capacity {
            if let Some(evicted) = pending.pop_front() {
                tracing::warn!("Dropping undownloaded document {}", evicted.file_name);
            }
        }
        pending.push_back(artifact.clone());

        Ok(ArtifactLocation::Download(Self::download_url(&artifact.file_name)))
    }
}

/// Writer picked for the configured host, plus the download store when the
/// browser target is active so the HTTP layer can serve it.
pub struct SelectedWriter {
    pub writer: Arc<dyn ArtifactWriter>,
    pub downloads: Option<Arc<DownloadStore>>,
}

pub fn select_writer(config: &ExportConfig) -> Result<SelectedWriter, ExportError> {
    let selected = match config.target {
        ExportTarget::Downloads => SelectedWriter {
            writer: Arc::new(DirectoryWriter::desktop(config)?),
            downloads: None,
        },
        ExportTarget::AppStorage => SelectedWriter {
            writer: Arc::new(DirectoryWriter::app_storage(config)?),
            downloads: None,
        },
        ExportTarget::Browser => {
            let store = Arc::new(DownloadStore::new());
            SelectedWriter {
                writer: store.clone(),
                downloads: Some(store),
            }
        }
    };

    Ok(selected)
}
