use std::sync::{Arc, Mutex};
use std::time::Duration;

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;

const METRICS_NAMESPACE: &str = "comanda_relay";
const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct InfoLabels {
    version: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct PushRequestLabels {
    kind: String,
    outcome: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct OutcomeLabels {
    outcome: String,
}

/// Kind of push request, used as the `kind` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    Single,
    Role,
}

impl PushKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Role => "role",
        }
    }
}

/// Outcome label for push requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Sent,
    Invalid,
    NoRecipients,
    Failed,
}

impl PushOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Invalid => "invalid",
            Self::NoRecipients => "no_recipients",
            Self::Failed => "failed",
        }
    }
}

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Mutex<Registry>>,
    info: Family<InfoLabels, Gauge>,
    uptime_seconds: Gauge,
    push_requests_total: Family<PushRequestLabels, Counter>,
    push_tokens_total: Family<OutcomeLabels, Counter>,
    push_duration_seconds: Histogram,
    mail_sent_total: Family<OutcomeLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let info = Family::<InfoLabels, Gauge>::default();
        registry.register(
            format!("{METRICS_NAMESPACE}_info"),
            "Information about the comanda-relay server",
            info.clone(),
        );

        let uptime_seconds = Gauge::default();
        registry.register(
            format!("{METRICS_NAMESPACE}_uptime_seconds"),
            "Total uptime of the server in seconds",
            uptime_seconds.clone(),
        );

        let push_requests_total = Family::<PushRequestLabels, Counter>::default();
        for kind in [PushKind::Single, PushKind::Role] {
            for outcome in [
                PushOutcome::Sent,
                PushOutcome::Invalid,
                PushOutcome::NoRecipients,
                PushOutcome::Failed,
            ] {
                let _ = push_requests_total.get_or_create(&PushRequestLabels {
                    kind: kind.as_str().to_string(),
                    outcome: outcome.as_str().to_string(),
                });
            }
        }
        registry.register(
            format!("{METRICS_NAMESPACE}_push_requests"),
            "Push requests handled, by kind and outcome",
            push_requests_total.clone(),
        );

        let push_tokens_total = Family::<OutcomeLabels, Counter>::default();
        for outcome in ["success", "failure"] {
            let _ = push_tokens_total.get_or_create(&OutcomeLabels {
                outcome: outcome.to_string(),
            });
        }
        registry.register(
            format!("{METRICS_NAMESPACE}_push_tokens"),
            "Per-token multicast outcomes reported by the push provider",
            push_tokens_total.clone(),
        );

        let push_duration_seconds = Histogram::new([0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]);
        registry.register(
            format!("{METRICS_NAMESPACE}_push_duration_seconds"),
            "Time spent delivering a push request",
            push_duration_seconds.clone(),
        );

        let mail_sent_total = Family::<OutcomeLabels, Counter>::default();
        for outcome in ["sent", "failed"] {
            let _ = mail_sent_total.get_or_create(&OutcomeLabels {
                outcome: outcome.to_string(),
            });
        }
        registry.register(
            format!("{METRICS_NAMESPACE}_mail_sent"),
            "Decision emails handed to the SMTP relay",
            mail_sent_total.clone(),
        );

        let metrics = Self {
            registry: Arc::new(Mutex::new(registry)),
            info,
            uptime_seconds,
            push_requests_total,
            push_tokens_total,
            push_duration_seconds,
            mail_sent_total,
        };

        metrics.set_static_info();
        metrics
    }

    pub fn set_uptime(&self, uptime: Duration) {
        self.uptime_seconds.set(uptime.as_secs() as i64);
    }

    /// Records one handled push request.
    pub fn record_push_request(&self, kind: PushKind, outcome: PushOutcome, duration: Duration) {
        self.push_requests_total
            .get_or_create(&PushRequestLabels {
                kind: kind.as_str().to_string(),
                outcome: outcome.as_str().to_string(),
            })
            .inc();
        if outcome == PushOutcome::Sent || outcome == PushOutcome::Failed {
            self.push_duration_seconds.observe(duration.as_secs_f64());
        }
    }

    pub fn record_push_tokens(&self, successes: usize, failures: usize) {
        self.push_tokens_total
            .get_or_create(&OutcomeLabels {
                outcome: "success".to_string(),
            })
            .inc_by(successes as u64);
        self.push_tokens_total
            .get_or_create(&OutcomeLabels {
                outcome: "failure".to_string(),
            })
            .inc_by(failures as u64);
    }

    pub fn record_mail(&self, sent: bool) {
        let outcome = if sent { "sent" } else { "failed" };
        self.mail_sent_total
            .get_or_create(&OutcomeLabels {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let registry = self
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut buffer = String::new();
        encode(&mut buffer, &registry)?;
        Ok(buffer)
    }

    fn set_static_info(&self) {
        self.info
            .get_or_create(&InfoLabels {
                version: BUILD_VERSION.to_string(),
            })
            .set(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
