//! HTTP probe executor built on the hyper-util client.

use std::error::Error as StdError;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Empty;
use hyper::header::USER_AGENT;
use hyper::{Method, Request};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::probe::{Interrupted, ProbeContext, ProbeError, ProbeExecutor, ProbeVerdict};

/// Probe executor that issues a real `GET` over HTTP/1.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client<HttpConnector, Empty<Bytes>>,
    user_agent: String,
}

impl HttpProbe {
    pub fn new(user_agent: impl Into<String>) -> Self {
        // Probes are one-shot; idle connections would only pin file descriptors.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(HttpConnector::new());

        Self {
            client,
            user_agent: user_agent.into(),
        }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new(concat!("instance-health/", env!("CARGO_PKG_VERSION")))
    }
}

#[async_trait]
impl ProbeExecutor for HttpProbe {
    async fn fetch(&self, ctx: &ProbeContext, url: &str) -> Result<ProbeVerdict, ProbeError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .body(Empty::<Bytes>::new())
            .map_err(|e| ProbeError::InvalidRequest {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        match ctx.run(self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status != hyper::StatusCode::OK {
                    tracing::debug!(%url, %status, "health endpoint answered non-200");
                }
                Ok(ProbeVerdict::from_status(status.as_u16()))
            }
            Ok(Err(e)) => {
                let reason = describe(&e);
                tracing::debug!(%url, error = %reason, "health probe connection error");
                Err(ProbeError::Transport {
                    url: url.to_string(),
                    reason,
                })
            }
            Err(Interrupted::DeadlineExceeded) => {
                tracing::debug!(%url, "health probe timed out");
                Err(ProbeError::Transport {
                    url: url.to_string(),
                    reason: "deadline exceeded".to_string(),
                })
            }
            Err(Interrupted::Cancelled) => Err(ProbeError::Cancelled),
        }
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn closed_port_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpProbe::default();
        let ctx = ProbeContext::with_timeout(Duration::from_secs(2));
        let err = probe
            .fetch(&ctx, &format!("http://{addr}/health"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Transport { .. }));
        assert!(err.to_string().starts_with("health check request failed"));
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits() {
        let probe = HttpProbe::default();
        let ctx = ProbeContext::background();
        ctx.cancel();

        let err = probe
            .fetch(&ctx, "http://127.0.0.1:9/health")
            .await
            .unwrap_err();
        assert_eq!(err, ProbeError::Cancelled);
    }

    #[tokio::test]
    async fn garbage_url_is_invalid_request() {
        let probe = HttpProbe::default();
        let ctx = ProbeContext::with_timeout(Duration::from_secs(1));
        let err = probe.fetch(&ctx, "http://bad host/health").await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidRequest { .. }));
    }
}
