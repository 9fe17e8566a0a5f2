use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Connectivity state shown by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NetworkStatus {
    pub is_online: bool,
    pub connection_type: String,
    pub is_loading: bool,
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self {
            is_online: true,
            connection_type: "unknown".to_string(),
            is_loading: true,
        }
    }
}

impl NetworkStatus {
    pub fn feature_availability(&self, requires_internet: bool) -> FeatureAvailability {
        FeatureAvailability {
            is_available: !requires_internet || self.is_online,
            reason: (!self.is_online).then(|| "No internet connection".to_string()),
        }
    }
}

/// Whether a feature can be used under the current connectivity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FeatureAvailability {
    pub is_available: bool,
    pub reason: Option<String>,
}
