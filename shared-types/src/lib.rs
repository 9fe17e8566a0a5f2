use serde::{Deserialize, Serialize};

pub mod address;
pub mod contact;
pub mod network;
pub mod notice;

pub use address::{join_non_empty, AddressResult};
pub use contact::{
    ContactRecord, FormField, FormSnapshot, FormState, UpdateFieldRequest, UpdatePhotoRequest,
};
pub use network::{FeatureAvailability, NetworkStatus};
pub use notice::{ActionResponse, ExportReceipt, Notice, NoticeLevel};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
