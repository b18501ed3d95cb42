// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// The installed sinks, one reference per concern.
#[derive(Clone, Copy)]
pub struct InstalledSinks {
    pipeline: &'static dyn PipelineMetricsSink,
    consensus: &'static dyn ConsensusMetricsSink,
    error: &'static dyn ErrorMetricsSink,
}

/// A lazily-initialized static holding the global sink implementation.
pub static SINK: OnceCell<InstalledSinks> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Installs `sink` as the global metrics sink. Returns `false` if one was already installed.
pub fn install_sink<T: MetricsSink + 'static>(sink: &'static T) -> bool {
    SINK.set(InstalledSinks {
        pipeline: sink,
        consensus: sink,
        error: sink,
    })
    .is_ok()
}

/// Returns the configured pipeline sink, or a no-op sink if none is installed.
pub fn pipeline_metrics() -> &'static dyn PipelineMetricsSink {
    SINK.get().map(|s| s.pipeline).unwrap_or(&NOP_SINK)
}

/// Returns the configured consensus sink, or a no-op sink if none is installed.
pub fn consensus_metrics() -> &'static dyn ConsensusMetricsSink {
    SINK.get().map(|s| s.consensus).unwrap_or(&NOP_SINK)
}

/// Returns the configured error sink, or a no-op sink if none is installed.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().map(|s| s.error).unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics about transactions passing through the pipeline.
pub trait PipelineMetricsSink: Send + Sync + std::fmt::Debug {
    /// Counts one finished pipeline run, labeled by phase and outcome (`ok`, or an error kind).
    fn inc_tx_outcome(&self, phase: &'static str, outcome: &'static str);
    /// Observes the duration of one pipeline run.
    fn observe_tx_duration(&self, phase: &'static str, duration_secs: f64);
}
impl PipelineMetricsSink for NopSink {
    fn inc_tx_outcome(&self, _phase: &'static str, _outcome: &'static str) {}
    fn observe_tx_duration(&self, _phase: &'static str, _duration_secs: f64) {}
}

/// A sink for metrics about block commits and validator reconciliation.
pub trait ConsensusMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for committed blocks.
    fn inc_blocks_committed(&self);
    /// Observes the duration of a single validator-set tick.
    fn observe_tick_duration(&self, duration_secs: f64);
    /// Counts validator updates reported to consensus.
    fn inc_validator_updates(&self, count: u64);
}
impl ConsensusMetricsSink for NopSink {
    fn inc_blocks_committed(&self) {}
    fn observe_tick_duration(&self, _duration_secs: f64) {}
    fn inc_validator_updates(&self, _count: u64) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and stable code.
    fn inc_error(&self, kind: &'static str, code: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _code: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink: PipelineMetricsSink + ConsensusMetricsSink + ErrorMetricsSink {}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where T: PipelineMetricsSink + ConsensusMetricsSink + ErrorMetricsSink {}
