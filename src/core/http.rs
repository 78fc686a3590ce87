use std::{
    future::Future,
    time::Duration,
};

use reqwest::{
    header::USER_AGENT,
    Client,
    Response,
};
use serde::de::DeserializeOwned;

use crate::core::DashboardError;

const CLIENT_USER_AGENT: &str = "f1-dashboard/0.1 (+reqwest)";

/// How many times a request is attempted and how long to wait before the
/// second attempt. Each further attempt doubles the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3, base_delay: Duration::from_secs(1) }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { attempts: 1, base_delay: Duration::ZERO }
    }

    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

pub fn http_client() -> Result<Client, DashboardError> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| DashboardError::Custom(format!("HTTP client build failed: {e}")))
}

pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, DashboardError> {
    let resp = client.get(url).header(USER_AGENT, CLIENT_USER_AGENT).send().await?;
    ensure_success(&resp)?;
    Ok(resp.json::<T>().await?)
}

/// Runs `operation` until it succeeds or the policy is exhausted, returning the
/// last error.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, DashboardError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DashboardError>>,
{
    let attempts = policy.attempts.max(1);
    let mut failed: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                failed += 1;
                if failed >= attempts {
                    return Err(e);
                }
                let delay = policy.delay_for(failed);
                tracing::debug!(attempt = failed, ?delay, error = %e, "request failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn ensure_success(resp: &Response) -> Result<(), DashboardError> {
    if !resp.status().is_success() {
        return Err(DashboardError::HttpStatus {
            status: resp.status().as_u16(),
            url: resp.url().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{
        AtomicU32,
        Ordering,
    };

    use super::*;

    #[test]
    fn retry_delay_doubles() {
        let policy = RetryPolicy { attempts: 4, base_delay: Duration::from_millis(100) };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn retry_stops_after_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy { attempts: 3, base_delay: Duration::ZERO };

        let result = with_retry(policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(DashboardError::Custom("first call fails".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_returns_last_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy { attempts: 3, base_delay: Duration::ZERO };

        let result: Result<(), _> = with_retry(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DashboardError::Custom("down".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
