use futures::future::join_all;
use reqwest::{Client, Method, RequestBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use super::{BatchMode, PaceSchedule};
use crate::models::{HttpMethod, ProbeOutcome, ProbeRequest, snippet};

/// Sends probes and classifies every result into a [`ProbeOutcome`].
/// Never returns an error: transport failures become outcomes.
pub struct ProbeDispatcher {
    client: Client,
    base_url: String,
    /// In-flight window shared by every concurrent batch.
    semaphore: Arc<Semaphore>,
}

enum Failure {
    Timeout,
    Transport(String),
}

impl ProbeDispatcher {
    pub fn new(base_url: &str, max_in_flight: usize) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .danger_accept_invalid_certs(false)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn dispatch(&self, request: &ProbeRequest) -> ProbeOutcome {
        let start = Instant::now();
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), &url)
            .timeout(request.timeout());

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let result = tokio::time::timeout(
            request.timeout(),
            Self::execute(builder, request.body_limit),
        )
        .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(Ok((status, headers, body))) => Self::classify(status, headers, body, latency_ms),
            Ok(Err(Failure::Timeout)) | Err(_) => ProbeOutcome::Timeout { latency_ms },
            Ok(Err(Failure::Transport(reason))) => ProbeOutcome::NetworkError { reason },
        };

        trace!(probe = %request.display_path(), kind = %outcome.kind(), latency_ms, "probe finished");
        outcome
    }

    /// Outcomes come back in input order whatever the completion order.
    pub async fn dispatch_batch(
        &self,
        requests: &[ProbeRequest],
        mode: BatchMode,
    ) -> Vec<ProbeOutcome> {
        debug!(count = requests.len(), ?mode, "dispatching batch");

        match mode {
            BatchMode::Sequential => {
                let mut outcomes = Vec::with_capacity(requests.len());
                for request in requests {
                    outcomes.push(self.dispatch(request).await);
                }
                outcomes
            }
            BatchMode::Concurrent => {
                let futures: Vec<_> = requests
                    .iter()
                    .map(|request| self.dispatch_bounded(request))
                    .collect();
                join_all(futures).await
            }
            BatchMode::Paced(schedule) => self.dispatch_paced(requests, schedule).await,
        }
    }

    async fn dispatch_bounded(&self, request: &ProbeRequest) -> ProbeOutcome {
        // The semaphore is never closed, so a permit is always granted.
        let _permit = self.semaphore.acquire().await.ok();
        self.dispatch(request).await
    }

    async fn dispatch_paced(
        &self,
        requests: &[ProbeRequest],
        schedule: PaceSchedule,
    ) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for (request, tick) in requests.iter().zip(schedule.ticks()) {
            outcomes.push(self.dispatch(request).await);
            if let Some(pause) = tick.pause_after {
                tokio::time::sleep(pause).await;
            }
        }
        outcomes
    }

    /// Reads at most `body_limit` bytes of the body; the rest is never buffered.
    async fn execute(
        request: RequestBuilder,
        body_limit: usize,
    ) -> Result<(u16, BTreeMap<String, String>, String), Failure> {
        let mut response = request.send().await.map_err(Self::failure)?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_lowercase(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let mut body: Vec<u8> = Vec::new();
        while body.len() < body_limit {
            match response.chunk().await.map_err(Self::failure)? {
                Some(chunk) => body.extend_from_slice(&chunk),
                None => break,
            }
        }

        Ok((status, headers, snippet(&body, body_limit)))
    }

    fn failure(error: reqwest::Error) -> Failure {
        if error.is_timeout() {
            Failure::Timeout
        } else {
            Failure::Transport(error.to_string())
        }
    }

    fn classify(
        status: u16,
        headers: BTreeMap<String, String>,
        body: String,
        latency_ms: u64,
    ) -> ProbeOutcome {
        if status >= 500 {
            ProbeOutcome::ServerError {
                status,
                body_snippet: body,
                latency_ms,
            }
        } else {
            ProbeOutcome::Success {
                status,
                body_snippet: body,
                headers,
                latency_ms,
            }
        }
    }

    fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_status() {
        let ok = ProbeDispatcher::classify(404, BTreeMap::new(), "{}".into(), 3);
        assert!(matches!(ok, ProbeOutcome::Success { status: 404, .. }));

        let server = ProbeDispatcher::classify(502, BTreeMap::new(), "bad gateway".into(), 3);
        assert!(matches!(server, ProbeOutcome::ServerError { status: 502, .. }));
        assert_eq!(server.body(), Some("bad gateway"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let dispatcher = ProbeDispatcher::new("http://localhost:3000/", 0).unwrap();
        assert_eq!(dispatcher.base_url(), "http://localhost:3000");
        assert_eq!(dispatcher.semaphore.available_permits(), 1);
    }
}
