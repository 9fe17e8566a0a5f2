pub mod layout;
pub mod pdf;
pub mod photo;
pub mod writer;

use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use shared_types::{ContactRecord, ExportReceipt};
use std::sync::Arc;

pub use layout::DocumentInfo;
pub use writer::{
    select_writer, Artifact, ArtifactLocation, ArtifactWriter, DirectoryWriter, DownloadStore,
    SelectedWriter,
};

const DEFAULT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to render document: {0}")]
    Render(String),

    #[error("Failed to write {file_name}: {source}")]
    Write {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Export destination unavailable: {0}")]
    Unavailable(String),

    #[error("Export task failed: {0}")]
    Task(String),
}

/// Turns a completed record into a persisted document
#[async_trait]
pub trait ContactExporter: Send + Sync {
    async fn export(&self, record: &ContactRecord) -> Result<ExportReceipt, ExportError>;
}

/// `formulario_{slug}_{token}.pdf`, slug being the lowercase ASCII name with
/// words joined by underscores.
pub fn file_name_for(name: &str, token: i64) -> String {
    let slug = slug::slugify(name).replace('-', "_");
    let slug = if slug.is_empty() { "contato" } else { slug.as_str() };

    format!("formulario_{}_{}.pdf", slug, token)
}

fn format_timestamp(now: chrono::DateTime<chrono::Local>, format: &str) -> String {
    let invalid = StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
    if invalid {
        tracing::warn!("Invalid timestamp format {:?}, using default", format);
        return now.format(DEFAULT_TIMESTAMP_FORMAT).to_string();
    }

    now.format(format).to_string()
}

/// Lays out the record's page. An undecodable photo is logged and left out.
pub fn layout_for(record: &ContactRecord, info: &DocumentInfo) -> layout::PageLayout {
    let photo = if record.has_photo() {
        match photo::decode_photo(&record.photo) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!("Skipping photo in document: {}", e);
                None
            }
        }
    } else {
        None
    };

    layout::build_layout(record, info, photo)
}

pub fn render_document(record: &ContactRecord, info: &DocumentInfo) -> Result<Vec<u8>, ExportError> {
    pdf::render(&layout_for(record, info))
}

pub struct PdfExporter {
    writer: Arc<dyn ArtifactWriter>,
    timestamp_format: String,
}

impl PdfExporter {
    pub fn new(writer: Arc<dyn ArtifactWriter>, timestamp_format: &str) -> Self {
        Self {
            writer,
            timestamp_format: timestamp_format.to_string(),
        }
    }

    fn export_blocking(
        record: &ContactRecord,
        writer: &dyn ArtifactWriter,
        timestamp_format: &str,
    ) -> Result<ExportReceipt, ExportError> {
        let token = chrono::Utc::now().timestamp_millis();
        let info = DocumentInfo {
            generated_at: format_timestamp(chrono::Local::now(), timestamp_format),
            document_id: token,
        };

        let artifact = Artifact {
            file_name: file_name_for(&record.name, token),
            bytes: render_document(record, &info)?,
        };

        let location = writer.write(&artifact)?;
        tracing::info!("Exported {} ({} bytes)", artifact.file_name, artifact.bytes.len());

        Ok(receipt_for(artifact.file_name, location))
    }
}

fn receipt_for(file_name: String, location: ArtifactLocation) -> ExportReceipt {
    match location {
        ArtifactLocation::File(path) => ExportReceipt {
            file_name,
            path: Some(path.display().to_string()),
            download_url: None,
        },
        ArtifactLocation::Download(url) => ExportReceipt {
            file_name,
            path: None,
            download_url: Some(url),
        },
    }
}

#[async_trait]
impl ContactExporter for PdfExporter {
    async fn export(&self, record: &ContactRecord) -> Result<ExportReceipt, ExportError> {
        let record = record.clone();
        let writer = self.writer.clone();
        let timestamp_format = self.timestamp_format.clone();

        tokio::task::spawn_blocking(move || {
            Self::export_blocking(&record, writer.as_ref(), &timestamp_format)
        })
        .await
        .map_err(|e| ExportError::Task(e.to_string()))?
    }
}
