// Path: crates/tx/src/system/logger.rs

//! The outermost stage: records the net outcome of every pipeline run.

use fermion_api::state::ScopedState;
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Next, Stage, TxResult};
use fermion_telemetry::sinks::{ErrorMetricsSink, PipelineMetricsSink};
use fermion_telemetry::time::Timer;
use fermion_telemetry::{error_metrics, pipeline_metrics};
use fermion_types::app::Tx;
use fermion_types::error::{ErrorCode, TransactionError};

/// Logs phase, outcome, error code and latency of each transaction.
///
/// Placed outermost, the logger sees the result after every inner stage and
/// checkpoint has run, so what it records is what the caller gets.
pub struct Logger {
    pipeline: &'static dyn PipelineMetricsSink,
    errors: &'static dyn ErrorMetricsSink,
}

impl Logger {
    /// A logger reporting to the globally installed sinks.
    pub fn new() -> Self {
        Self::with_sinks(pipeline_metrics(), error_metrics())
    }

    /// A logger reporting to explicit sinks.
    pub fn with_sinks(
        pipeline: &'static dyn PipelineMetricsSink,
        errors: &'static dyn ErrorMetricsSink,
    ) -> Self {
        Self { pipeline, errors }
    }

    fn observe(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let phase = next.phase();
        let timer = Timer::tx(self.pipeline, phase.as_str());
        let res = next.call(ctx, store, tx);
        let elapsed_us = (timer.elapsed_secs() * 1e6) as u64;

        match &res {
            Ok(out) => {
                tracing::info!(
                    target: "pipeline",
                    %phase,
                    height = ctx.block_height,
                    outcome = "ok",
                    gas = out.gas,
                    elapsed_us,
                    "transaction accepted"
                );
                self.pipeline.inc_tx_outcome(phase.as_str(), "ok");
            }
            Err(e) => {
                let kind = e.kind().as_str();
                tracing::info!(
                    target: "pipeline",
                    %phase,
                    height = ctx.block_height,
                    outcome = kind,
                    code = e.code(),
                    error = %e,
                    elapsed_us,
                    "transaction rejected"
                );
                self.pipeline.inc_tx_outcome(phase.as_str(), kind);
                self.errors.inc_error(kind, e.code());
            }
        }
        res
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Logger {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        self.observe(ctx, store, tx, next)
    }

    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        self.observe(ctx, store, tx, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::test_support::{run, Capture};
    use fermion_api::transaction::Phase;
    use fermion_state::memory::MemoryState;
    use fermion_types::app::{Message, RolesMsg};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Counts(Mutex<Vec<String>>);

    impl PipelineMetricsSink for Counts {
        fn inc_tx_outcome(&self, phase: &'static str, outcome: &'static str) {
            self.0.lock().unwrap().push(format!("{phase}:{outcome}"));
        }
        fn observe_tx_duration(&self, phase: &'static str, _duration_secs: f64) {
            self.0.lock().unwrap().push(format!("{phase}:timed"));
        }
    }

    impl ErrorMetricsSink for Counts {
        fn inc_error(&self, kind: &'static str, code: &'static str) {
            self.0.lock().unwrap().push(format!("{kind}:{code}"));
        }
    }

    fn tx() -> Tx {
        Tx::msg(Message::Roles(RolesMsg::CreateRole {
            role: b"r".to_vec(),
            min_sigs: 1,
            signers: Vec::new(),
        }))
    }

    #[test]
    fn test_counts_net_outcome() {
        let sink: &'static Counts = Box::leak(Box::default());
        let logger: Arc<dyn Stage> = Arc::new(Logger::with_sinks(sink, sink));
        let ctx = TxContext::new("c", 1);
        let mut store = MemoryState::new();

        run(
            vec![logger.clone()],
            &Capture::default(),
            &ctx,
            &mut store,
            &tx(),
            Phase::Check,
        )
        .unwrap();
        assert!(run(
            vec![logger],
            &Capture::failing(),
            &ctx,
            &mut store,
            &tx(),
            Phase::Deliver,
        )
        .is_err());

        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![
                "check:ok",
                "check:timed",
                "deliver:validation",
                "validation:TX_INVALID",
                "deliver:timed",
            ]
        );
    }
}
