//! Backend connectivity indicator.

use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::warn;

use crate::planning::{EcoApiClient, HealthResponse, PlanningError};

/// Whether the planning backend is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connectivity {
    /// The health check has not answered yet.
    Checking,
    /// The backend answered `/healthz`.
    Healthy {
        message: String,
        checked_at: DateTime<Utc>,
    },
    /// The health check failed for any reason.
    Unhealthy { checked_at: DateTime<Utc> },
}

impl Connectivity {
    /// Interpret a `/healthz` result.
    pub fn from_check(check: Result<HealthResponse, PlanningError>) -> Self {
        let checked_at = Utc::now();
        match check {
            Ok(health) => Connectivity::Healthy {
                message: health.message,
                checked_at,
            },
            Err(e) => {
                warn!(error = %e, "backend health check failed");
                Connectivity::Unhealthy { checked_at }
            }
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Connectivity::Healthy { .. })
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Checking => f.write_str("checking backend..."),
            Connectivity::Healthy { message, .. } if message.is_empty() => {
                f.write_str("backend online")
            }
            Connectivity::Healthy { message, .. } => write!(f, "backend online: {message}"),
            Connectivity::Unhealthy { .. } => f.write_str("backend unreachable"),
        }
    }
}

/// Check the backend once.
pub async fn check(client: &EcoApiClient) -> Connectivity {
    Connectivity::from_check(client.health().await)
}

/// Check the backend in the background.
///
/// The receiver reads `Checking` until the check answers, then holds the
/// result.
pub fn spawn_check(client: EcoApiClient) -> watch::Receiver<Connectivity> {
    let (tx, rx) = watch::channel(Connectivity::Checking);
    tokio::spawn(async move {
        tx.send_replace(check(&client).await);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_from_response() {
        let check = Ok(HealthResponse {
            status: "ok".into(),
            message: "Eco-MCP API is running".into(),
        });

        let connectivity = Connectivity::from_check(check);

        assert!(connectivity.is_healthy());
        assert_eq!(
            connectivity.to_string(),
            "backend online: Eco-MCP API is running"
        );
    }

    #[test]
    fn any_error_is_unhealthy() {
        let connectivity = Connectivity::from_check(Err(PlanningError::Timeout));
        assert!(!connectivity.is_healthy());
        assert_eq!(connectivity.to_string(), "backend unreachable");

        let connectivity = Connectivity::from_check(Err(PlanningError::from_response(503, "")));
        assert!(matches!(connectivity, Connectivity::Unhealthy { .. }));
    }

    #[test]
    fn display_states() {
        assert_eq!(Connectivity::Checking.to_string(), "checking backend...");

        let healthy = Connectivity::Healthy {
            message: String::new(),
            checked_at: Utc::now(),
        };
        assert_eq!(healthy.to_string(), "backend online");
    }
}
