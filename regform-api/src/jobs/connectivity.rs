use shared_types::{FeatureAvailability, NetworkStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::ConnectivityConfig;

/// Tracks whether the internet is reachable by probing a URL on an interval.
///
/// The status is advisory only. No action is queued or blocked because of it.
pub struct ConnectivityMonitor {
    status: RwLock<NetworkStatus>,
    client: reqwest::Client,
    probe_url: String,
    interval: Duration,
    shutting_down: AtomicBool,
}

impl ConnectivityMonitor {
    pub fn new(config: &ConnectivityConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &ConnectivityConfig) -> Self {
        Self {
            status: RwLock::new(NetworkStatus::default()),
            client,
            probe_url: config.probe_url.clone(),
            interval: Duration::from_secs(config.interval_secs.max(1)),
            shutting_down: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> NetworkStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn feature_availability(&self, requires_internet: bool) -> FeatureAvailability {
        self.status().feature_availability(requires_internet)
    }

    /// Sends one HEAD request and records the result. Any HTTP response
    /// counts as reachable.
    pub async fn probe_once(&self) -> NetworkStatus {
        let reachable = match self.client.head(&self.probe_url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Connectivity probe failed: {}", e);
                false
            }
        };

        let next = NetworkStatus {
            is_online: reachable,
            connection_type: if reachable { "wifi" } else { "none" }.to_string(),
            is_loading: false,
        };

        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if status.is_online != next.is_online || status.is_loading {
            tracing::info!(
                "Network status: {}",
                if next.is_online { "online" } else { "offline" }
            );
        }
        *status = next.clone();

        next
    }

    /// Starts the probe loop; the first probe runs immediately.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            loop {
                interval.tick().await;
                if self.is_shutting_down() {
                    tracing::debug!("Connectivity monitor stopped");
                    break;
                }
                self.probe_once().await;
            }
        })
    }

    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }
}
