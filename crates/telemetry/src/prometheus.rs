// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_histogram, register_histogram_vec, register_int_counter,
    register_int_counter_vec, Encoder, Histogram, HistogramVec, IntCounter, IntCounterVec,
    TextEncoder,
};

// --- Metric Statics ---
// The collectors are initialized exactly once by `install`. Until then every
// report is dropped.

static PIPELINE_TX_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static PIPELINE_TX_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static BLOCKS_COMMITTED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static TICK_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();
static VALIDATOR_UPDATES_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

impl PipelineMetricsSink for PrometheusSink {
    fn inc_tx_outcome(&self, phase: &'static str, outcome: &'static str) {
        if let Some(m) = PIPELINE_TX_TOTAL.get() {
            m.with_label_values(&[phase, outcome]).inc();
        }
    }
    fn observe_tx_duration(&self, phase: &'static str, duration_secs: f64) {
        if let Some(m) = PIPELINE_TX_DURATION_SECONDS.get() {
            m.with_label_values(&[phase]).observe(duration_secs);
        }
    }
}

impl ConsensusMetricsSink for PrometheusSink {
    fn inc_blocks_committed(&self) {
        if let Some(m) = BLOCKS_COMMITTED_TOTAL.get() {
            m.inc();
        }
    }
    fn observe_tick_duration(&self, duration_secs: f64) {
        if let Some(m) = TICK_DURATION_SECONDS.get() {
            m.observe(duration_secs);
        }
    }
    fn inc_validator_updates(&self, count: u64) {
        if let Some(m) = VALIDATOR_UPDATES_TOTAL.get() {
            m.inc_by(count);
        }
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, code: &'static str) {
        if let Some(m) = ERRORS_TOTAL.get() {
            m.with_label_values(&[kind, code]).inc();
        }
    }
}

fn already_registered<T>(_: T) -> prometheus::Error {
    prometheus::Error::Msg("metrics already installed".into())
}

/// Registers every collector with the default registry and returns the sink.
/// Must be called at most once per process.
pub fn install() -> Result<&'static PrometheusSink, prometheus::Error> {
    PIPELINE_TX_TOTAL
        .set(register_int_counter_vec!(
            "fermion_pipeline_tx_total",
            "Finished pipeline runs by phase and outcome.",
            &["phase", "outcome"]
        )?)
        .map_err(already_registered)?;
    PIPELINE_TX_DURATION_SECONDS
        .set(register_histogram_vec!(
            "fermion_pipeline_tx_duration_seconds",
            "Latency of a single pipeline run.",
            &["phase"],
            exponential_buckets(0.00005, 2.0, 16)?
        )?)
        .map_err(already_registered)?;
    BLOCKS_COMMITTED_TOTAL
        .set(register_int_counter!(
            "fermion_blocks_committed_total",
            "Total number of blocks committed by this node."
        )?)
        .map_err(already_registered)?;
    TICK_DURATION_SECONDS
        .set(register_histogram!(
            "fermion_tick_duration_seconds",
            "Latency of a single validator-set tick.",
            exponential_buckets(0.0001, 2.0, 15)?
        )?)
        .map_err(already_registered)?;
    VALIDATOR_UPDATES_TOTAL
        .set(register_int_counter!(
            "fermion_validator_updates_total",
            "Total validator updates reported to consensus."
        )?)
        .map_err(already_registered)?;
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "fermion_errors_total",
            "Total number of errors, categorized by kind and code.",
            &["kind", "code"]
        )?)
        .map_err(already_registered)?;

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}

/// Renders the default registry in the Prometheus text exposition format.
pub fn render_text() -> Result<String, prometheus::Error> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buf)?;
    String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
