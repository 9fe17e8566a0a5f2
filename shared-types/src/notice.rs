use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::contact::FormSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// User-facing message produced by every form action (shown as a toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Where an exported document ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExportReceipt {
    pub file_name: String,
    /// Filesystem path for desktop/mobile targets
    pub path: Option<String>,
    /// Relative URL for the browser download target
    pub download_url: Option<String>,
}

/// Response for form actions (lookup, submit, photo)
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActionResponse {
    pub notice: Notice,
    pub artifact: Option<ExportReceipt>,
    pub form: FormSnapshot,
}
