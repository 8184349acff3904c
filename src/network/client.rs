//! HTTP client wrapper - times the latency probe round trip

use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;

/// Active latency measurement. Resolves to the round trip in whole
/// milliseconds, or `None` when the probe failed.
pub trait LatencyProbe: Send + Sync + 'static {
    fn probe(&self) -> BoxFuture<'static, Option<u32>>;
}

/// Probe that fetches a small resource and times the round trip
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        HttpProbe {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LatencyProbe for HttpProbe {
    fn probe(&self) -> BoxFuture<'static, Option<u32>> {
        let client = self.client.clone();
        let url = self.url.clone();
        Box::pin(async move { measure_round_trip(&client, &url).await })
    }
}

/// Time one GET of `url`. Any HTTP response counts as a completed round
/// trip; transport failures and timeouts give `None`.
pub async fn measure_round_trip(client: &reqwest::Client, url: &str) -> Option<u32> {
    let cache_buster = chrono::Utc::now().timestamp_millis().to_string();
    let start = Instant::now();

    let result = client
        .get(url)
        .query(&[("t", cache_buster.as_str())])
        .header(reqwest::header::CACHE_CONTROL, "no-store")
        .send()
        .await;

    match result {
        Ok(resp) => {
            let elapsed = start.elapsed();
            tracing::debug!(url, status = resp.status().as_u16(), ms = elapsed.as_millis() as u64, "Probe completed");
            Some(round_ms(elapsed))
        }
        Err(e) => {
            if e.is_timeout() {
                tracing::debug!(url, "Probe timed out");
            } else {
                tracing::debug!(url, error = %e, "Probe failed");
            }
            None
        }
    }
}

/// Nearest whole millisecond
pub fn round_ms(elapsed: Duration) -> u32 {
    let ms = (elapsed.as_secs_f64() * 1000.0).round();
    ms.min(u32::MAX as f64) as u32
}

/// Create an HTTP client for probing
pub fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_ms() {
        assert_eq!(round_ms(Duration::from_micros(41_499)), 41);
        assert_eq!(round_ms(Duration::from_micros(41_500)), 42);
        assert_eq!(round_ms(Duration::ZERO), 0);
    }

    #[tokio::test]
    async fn test_unreachable_target_is_swallowed() {
        let client = create_client(Duration::from_millis(500));
        // Port 9 on localhost is discard; nothing listens there in CI
        let probe = HttpProbe::new(client, "http://127.0.0.1:9/favicon.ico");
        assert_eq!(probe.url(), "http://127.0.0.1:9/favicon.ico");
        assert_eq!(probe.probe().await, None);
    }
}
