use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::{backend::DataBackend, error::ConnectivityError};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityStatus {
    pub reachable: bool,
    pub cause: Option<ConnectivityError>,
}

impl ConnectivityStatus {
    pub fn reachable() -> Self {
        Self {
            reachable: true,
            cause: None,
        }
    }

    pub fn unreachable(cause: ConnectivityError) -> Self {
        Self {
            reachable: false,
            cause: Some(cause),
        }
    }

    pub fn indicator_label(&self) -> &'static str {
        if self.reachable {
            "API Connected"
        } else {
            "API Disconnected"
        }
    }
}

/// Single health check against the backend. The result stands for the whole
/// session; there is no re-probe.
pub struct ConnectivityProbe {
    backend: Arc<dyn DataBackend>,
    timeout: Duration,
}

impl ConnectivityProbe {
    pub fn new(backend: Arc<dyn DataBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn check(&self) -> ConnectivityStatus {
        match tokio::time::timeout(self.timeout, self.backend.health_check()).await {
            Ok(Ok(())) => {
                info!("probe: backend reachable");
                ConnectivityStatus::reachable()
            }
            Ok(Err(err)) => {
                warn!(error = %format!("{err:#}"), "probe: backend unreachable");
                ConnectivityStatus::unreachable(ConnectivityError::Unreachable(format!("{err:#}")))
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "probe: health check timed out");
                ConnectivityStatus::unreachable(ConnectivityError::Timeout(self.timeout))
            }
        }
    }
}
