use actix_web::{http::header::ContentType, HttpResponse};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, TextEncoder,
};

static ENVELOPES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "chat_relay_envelopes_total",
            "Inbound envelopes handled, by type",
        ),
        &["type"],
    )
    .expect("failed to create chat_relay_envelopes_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register chat_relay_envelopes_total");
    counter
});

static MALFORMED_FRAMES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "chat_relay_malformed_frames_total",
        "Inbound frames dropped because they did not decode to an envelope",
    )
    .expect("failed to create chat_relay_malformed_frames_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register chat_relay_malformed_frames_total");
    counter
});

static MODERATION_OUTCOMES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "chat_relay_moderation_outcomes_total",
            "Moderation results: pass, flagged or failed_open",
        ),
        &["outcome"],
    )
    .expect("failed to create chat_relay_moderation_outcomes_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register chat_relay_moderation_outcomes_total");
    counter
});

static MODERATION_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    let histogram = Histogram::with_opts(
        HistogramOpts::new(
            "chat_relay_moderation_duration_seconds",
            "Latency of calls to the moderation endpoint",
        )
        .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
    )
    .expect("failed to create chat_relay_moderation_duration_seconds");
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .expect("failed to register chat_relay_moderation_duration_seconds");
    histogram
});

static ACTIVE_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    let gauge = IntGauge::new(
        "chat_relay_active_sessions",
        "Participants with a registered connection",
    )
    .expect("failed to create chat_relay_active_sessions");
    prometheus::default_registry()
        .register(Box::new(gauge.clone()))
        .expect("failed to register chat_relay_active_sessions");
    gauge
});

pub fn record_envelope(kind: &str) {
    ENVELOPES_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_malformed_frame() {
    MALFORMED_FRAMES_TOTAL.inc();
}

pub fn record_moderation(outcome: &str, elapsed_secs: f64) {
    MODERATION_OUTCOMES_TOTAL
        .with_label_values(&[outcome])
        .inc();
    MODERATION_DURATION_SECONDS.observe(elapsed_secs);
}

pub fn set_active_sessions(count: usize) {
    ACTIVE_SESSIONS.set(count as i64);
}

pub async fn metrics_handler() -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!(error = %err, "failed to encode metrics");
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .insert_header(ContentType::plaintext())
        .body(buffer)
}
