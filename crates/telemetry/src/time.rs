// Path: crates/telemetry/src/time.rs
use crate::sinks::{ConsensusMetricsSink, PipelineMetricsSink};
use std::time::Instant;

enum Target<'a> {
    Tick(&'a dyn ConsensusMetricsSink),
    Tx(&'a dyn PipelineMetricsSink, &'static str),
}

/// Reports its own lifetime to a sink when dropped.
pub struct Timer<'a> {
    target: Target<'a>,
    start: Instant,
}

impl<'a> Timer<'a> {
    /// Times one validator-set tick.
    pub fn tick(sink: &'a dyn ConsensusMetricsSink) -> Self {
        Self {
            target: Target::Tick(sink),
            start: Instant::now(),
        }
    }

    /// Times one pipeline run in `phase`.
    pub fn tx(sink: &'a dyn PipelineMetricsSink, phase: &'static str) -> Self {
        Self {
            target: Target::Tx(sink, phase),
            start: Instant::now(),
        }
    }

    /// Seconds since the timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        let secs = self.elapsed_secs();
        match self.target {
            Target::Tick(sink) => sink.observe_tick_duration(secs),
            Target::Tx(sink, phase) => sink.observe_tx_duration(phase, secs),
        }
    }
}
