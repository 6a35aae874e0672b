//! Periodic market-cap fetches from the HTTP API.
//!
//! Every tick fires one request without waiting for the previous one, so slow
//! responses may overlap and the last one to resolve wins. Only valid values are
//! forwarded. Failures are logged and otherwise ignored until the next tick.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, header::CACHE_CONTROL};
use serde::Deserialize;
use tokio::{
    sync::mpsc,
    task::{JoinHandle, JoinSet},
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{config::Config, error::PollError, snapshot::is_valid_value};

#[derive(Debug, Deserialize)]
struct MarketCapResponse {
    #[serde(rename = "marketCap", default)]
    market_cap: Option<serde_json::Value>,
}

/// Fetch one market-cap reading with a cache-busting `ts` parameter.
pub async fn fetch_market_cap(
    client: &Client,
    endpoint: &Url,
    timeout: Option<Duration>,
) -> Result<f64, PollError> {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("ts", &Utc::now().timestamp_millis().to_string());

    let mut request = client.get(url).header(CACHE_CONTROL, "no-store");
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(PollError::Status(response.status()));
    }

    let body = response.bytes().await?;
    let parsed: MarketCapResponse = serde_json::from_slice(&body)?;
    let value = parse_market_cap(parsed.market_cap.as_ref()).ok_or(PollError::MissingField)?;

    if is_valid_value(value) {
        Ok(value)
    } else {
        Err(PollError::InvalidValue(value))
    }
}

/// Accept a JSON number or a numeric string.
fn parse_market_cap(value: Option<&serde_json::Value>) -> Option<f64> {
    match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Drives `fetch_market_cap` on a fixed interval.
#[derive(Debug, Clone)]
pub struct SnapshotPoller {
    client: Client,
    endpoint: Url,
    interval: Duration,
    timeout: Option<Duration>,
}

impl SnapshotPoller {
    pub fn new(config: &Config) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &Config, client: Client) -> Self {
        Self {
            client,
            endpoint: config.market_cap_url(),
            interval: config.poll_interval,
            timeout: config.request_timeout,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn poll_once(&self) -> Result<f64, PollError> {
        fetch_market_cap(&self.client, &self.endpoint, self.timeout).await
    }

    /// Start polling immediately and then every interval, forwarding valid
    /// values to `tx`.
    ///
    /// Stops when the returned handle is shut down or dropped, or when the
    /// receiver goes away. In-flight requests are aborted with it.
    pub fn spawn(self, tx: mpsc::Sender<f64>) -> PollerHandle {
        let task = tokio::spawn(async move {
            self.run(tx).await;
        });
        PollerHandle { task }
    }

    async fn run(self, tx: mpsc::Sender<f64>) {
        info!(endpoint = %self.endpoint, interval = ?self.interval, "starting market cap poller");

        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let poller = self.clone();
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        match poller.poll_once().await {
                            Ok(value) => {
                                // Receiver gone means the widget is tearing down
                                let _ = tx.send(value).await;
                            }
                            Err(error) if error.is_bad_data() => {
                                warn!(%error, "ignoring bad market cap payload");
                            }
                            Err(error) => {
                                debug!(%error, "market cap poll failed");
                            }
                        }
                    });
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                _ = tx.closed() => {
                    info!("snapshot receiver dropped, stopping market cap poller");
                    break;
                }
            }
        }
    }
}

/// Owns the polling task. Dropping it cancels polling.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn shutdown(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Serve `body` with `status` to every connection, forwarding each request
    /// head to the returned receiver.
    async fn serve(
        status: &'static str,
        body: &'static str,
    ) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (head_tx, head_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let head_tx = head_tx.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let _ = head_tx.send(String::from_utf8_lossy(&buf).to_string());

                    let response = format!(
                        "HTTP/1.1 {}\r\n\
                         Content-Type: application/json\r\n\
                         Content-Length: {}\r\n\
                         Connection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (addr, head_rx)
    }

    fn poller_for(addr: SocketAddr, interval: Duration) -> SnapshotPoller {
        let config = Config::default()
            .with_api_base(&format!("http://{addr}"))
            .unwrap()
            .with_poll_interval(interval)
            .with_request_timeout(Duration::from_secs(5));
        let client = Client::builder().no_proxy().build().unwrap();
        SnapshotPoller::with_client(&config, client)
    }

    #[tokio::test]
    async fn test_fetch_number_field() {
        let (addr, mut heads) = serve("200 OK", r#"{"marketCap":123456.78,"extra":true}"#).await;
        let poller = poller_for(addr, Duration::from_secs(2));
        assert_eq!(poller.endpoint().path(), "/api/marketcap");

        assert_eq!(poller.poll_once().await.unwrap(), 123456.78);

        let head = heads.recv().await.unwrap().to_lowercase();
        assert!(head.starts_with("get /api/marketcap?ts="));
        assert!(head.contains("cache-control: no-store"));
    }

    #[tokio::test]
    async fn test_fetch_numeric_string_field() {
        let (addr, _heads) = serve("200 OK", r#"{"marketCap":" 98765 "}"#).await;
        let poller = poller_for(addr, Duration::from_secs(2));
        assert_eq!(poller.poll_once().await.unwrap(), 98765.0);
    }

    #[tokio::test]
    async fn test_fetch_failures() {
        struct TestCase {
            status: &'static str,
            body: &'static str,
            check: fn(&PollError) -> bool,
        }

        let tests = vec![
            TestCase {
                // TC0: malformed body
                status: "200 OK",
                body: "<html>",
                check: |e| matches!(e, PollError::Body(_)),
            },
            TestCase {
                // TC1: missing field
                status: "200 OK",
                body: r#"{"cap":5}"#,
                check: |e| matches!(e, PollError::MissingField),
            },
            TestCase {
                // TC2: non-numeric string
                status: "200 OK",
                body: r#"{"marketCap":"lots"}"#,
                check: |e| matches!(e, PollError::MissingField),
            },
            TestCase {
                // TC3: non-positive value
                status: "200 OK",
                body: r#"{"marketCap":0}"#,
                check: |e| matches!(e, PollError::InvalidValue(_)),
            },
            TestCase {
                // TC4: negative value
                status: "200 OK",
                body: r#"{"marketCap":-12.5}"#,
                check: |e| matches!(e, PollError::InvalidValue(v) if *v == -12.5),
            },
            TestCase {
                // TC5: server error
                status: "500 Internal Server Error",
                body: "{}",
                check: |e| matches!(e, PollError::Status(s) if s.as_u16() == 500),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let (addr, _heads) = serve(test.status, test.body).await;
            let poller = poller_for(addr, Duration::from_secs(2));
            let error = poller.poll_once().await.unwrap_err();
            assert!((test.check)(&error), "TC{} failed: {:?}", index, error);
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let poller = poller_for(addr, Duration::from_secs(2));
        assert!(matches!(poller.poll_once().await, Err(PollError::Http(_))));
    }

    #[tokio::test]
    async fn test_spawn_forwards_values_and_stops_on_shutdown() {
        let (addr, _heads) = serve("200 OK", r#"{"marketCap":42000}"#).await;
        let (tx, mut rx) = mpsc::channel(16);
        let handle = poller_for(addr, Duration::from_millis(50)).spawn(tx);

        for _ in 0..2 {
            let value = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(value, 42000.0);
        }

        handle.shutdown();
        let drained = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok());

        let finished = tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(finished.is_ok());
    }

    #[tokio::test]
    async fn test_spawn_skips_bad_payloads() {
        let (addr, _heads) = serve("200 OK", r#"{"marketCap":"NaN"}"#).await;
        let (tx, mut rx) = mpsc::channel(16);
        let _handle = poller_for(addr, Duration::from_millis(20)).spawn(tx);

        let received = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(received.is_err());
    }
}
