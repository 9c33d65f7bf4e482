use std::time::Duration;

use async_trait::async_trait;
use flowsync_core::sync::ConnectivityCheck;
use tokio::net::TcpStream;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Treats the device as online when a TCP connection to the server opens in time.
#[derive(Debug, Clone)]
pub struct TcpConnectivity {
    address: Option<String>,
    timeout: Duration,
}

impl TcpConnectivity {
    /// Checks the host and port of `server_url`. An unparseable URL is always offline.
    pub fn new(server_url: &str) -> Self {
        let address = Url::parse(server_url).ok().and_then(|url| {
            let host = url.host_str()?.to_string();
            let port = url.port_or_known_default()?;
            Some(format!("{host}:{port}"))
        });
        Self {
            address,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ConnectivityCheck for TcpConnectivity {
    async fn is_connected(&self) -> bool {
        let Some(address) = &self.address else {
            return false;
        };
        match tokio::time::timeout(self.timeout, TcpStream::connect(address)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(address, error = %e, "Server unreachable");
                false
            }
            Err(_) => {
                tracing::debug!(address, "Connectivity check timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn test_open_port_is_connected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let check = TcpConnectivity::new(&format!("http://127.0.0.1:{port}"));

        assert!(check.is_connected().await);
    }

    #[tokio::test]
    async fn test_closed_port_is_offline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let check = TcpConnectivity::new(&format!("http://127.0.0.1:{port}"))
            .with_timeout(Duration::from_millis(500));

        assert!(!check.is_connected().await);
    }

    #[tokio::test]
    async fn test_invalid_url_is_offline() {
        assert!(!TcpConnectivity::new("not a url").is_connected().await);
    }
}
