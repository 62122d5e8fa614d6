//! Prometheus counters for the issue endpoints, served on `/metrics`.
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct ApiMetrics {
    registry: Registry,
    requests: IntCounterVec,
    issues_created: IntCounter,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("civic_requests_total", "Issue API requests by operation and outcome"),
            &["operation", "outcome"],
        )?;
        let issues_created =
            IntCounter::new("civic_issues_created_total", "Issues filed since process start")?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(issues_created.clone()))?;

        Ok(Self {
            registry,
            requests,
            issues_created,
        })
    }

    /// Records one handled request; `ok` selects the `success`/`error` outcome.
    pub fn observe(&self, operation: &str, ok: bool) {
        let outcome = if ok { "success" } else { "error" };
        self.requests.with_label_values(&[operation, outcome]).inc();
    }

    pub fn issue_created(&self) {
        self.issues_created.inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
