// Path: crates/execution/src/app/mod.rs
pub mod end_block;
mod genesis;

use crate::app::end_block::StakeTicker;
use crate::standard::standard_stack;
use fermion_api::lifecycle::Ticker;
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::TxResult;
use fermion_state::memory::MemoryState;
use fermion_telemetry::consensus_metrics;
use fermion_tx::Stack;
use fermion_types::app::{Tx, ValidatorUpdate};
use fermion_types::config::{GenesisDoc, NodeConfig, StakeConfig};
use fermion_types::error::{ChainError, StackError, TransactionError};

/// Where the application is in the block lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockStage {
    /// Between blocks.
    Idle,
    /// Transactions of the block at this height are being delivered.
    Delivering(u64),
    /// The block at this height has ended and awaits commit.
    Ended(u64),
}

/// The application state machine driven by the consensus layer.
///
/// # State Isolation
///
/// Two stores are kept. The deliver state is mutated by the transactions of
/// the current block and becomes the committed state at [`App::commit`]. The
/// check state is a fork of the last committed state used to admit
/// transactions; its writes (nonce bumps, fee payments) never reach the
/// committed state and it is reset from it on every commit.
pub struct App {
    chain_id: String,
    stake: StakeConfig,
    stack: Stack,
    ticker: Box<dyn Ticker>,
    deliver_state: MemoryState,
    check_state: MemoryState,
    height: u64,
    block: BlockStage,
}

impl App {
    /// An application running the standard stack and the staking tick.
    pub fn new(config: &NodeConfig) -> Result<Self, StackError> {
        Ok(Self::with_parts(
            config,
            standard_stack(config)?,
            Box::new(StakeTicker),
        ))
    }

    /// An application over an explicit stack and ticker.
    pub fn with_parts(config: &NodeConfig, stack: Stack, ticker: Box<dyn Ticker>) -> Self {
        Self {
            chain_id: config.chain_id.clone(),
            stake: config.stake.clone(),
            stack,
            ticker,
            deliver_state: MemoryState::new(),
            check_state: MemoryState::new(),
            height: 0,
            block: BlockStage::Idle,
        }
    }

    /// Resumes from a state committed at `height`.
    #[must_use]
    pub fn restored(mut self, height: u64, state: MemoryState) -> Self {
        self.check_state = state.clone();
        self.deliver_state = state;
        self.height = height;
        self.block = BlockStage::Idle;
        self
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// The height of the last committed block. Zero before the first commit.
    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// The deliver state. Between blocks this is the committed state.
    pub fn state(&self) -> &MemoryState {
        &self.deliver_state
    }

    /// The check state transactions are admitted against.
    pub fn check_state(&self) -> &MemoryState {
        &self.check_state
    }

    /// The root hash of the deliver state.
    pub fn root_hash(&self) -> [u8; 32] {
        self.deliver_state.root_hash()
    }

    fn out_of_sequence(call: &'static str, reason: &'static str) -> ChainError {
        ChainError::OutOfSequence { call, reason }
    }

    /// Loads the genesis document. Only valid before the first block.
    pub fn init_chain(&mut self, doc: &GenesisDoc) -> Result<(), ChainError> {
        if self.height != 0 || self.block != BlockStage::Idle {
            return Err(Self::out_of_sequence(
                "init_chain",
                "the chain has already started",
            ));
        }
        let applied = genesis::apply_genesis(
            &self.chain_id,
            self.stack.dispatcher(),
            &self.stake,
            doc,
            &mut self.deliver_state,
        )?;
        self.check_state = self.deliver_state.clone();
        tracing::info!(
            target: "app",
            chain_id = %self.chain_id,
            options = applied,
            root = %hex::encode(self.root_hash()),
            "genesis loaded"
        );
        Ok(())
    }

    /// Admits or rejects `tx` against the check state.
    pub fn check_tx(&mut self, tx: &Tx) -> Result<TxResult, TransactionError> {
        let ctx = TxContext::new(self.chain_id.as_str(), self.height.saturating_add(1));
        self.stack.check_tx(&ctx, &mut self.check_state, tx)
    }

    /// Starts the block at `height`, which must follow the last commit.
    pub fn begin_block(&mut self, height: u64) -> Result<(), ChainError> {
        if self.block != BlockStage::Idle {
            return Err(Self::out_of_sequence(
                "begin_block",
                "the previous block was not committed",
            ));
        }
        let expected = self.height.saturating_add(1);
        if height != expected {
            return Err(ChainError::HeightMismatch {
                expected,
                got: height,
            });
        }
        self.block = BlockStage::Delivering(height);
        tracing::debug!(target: "app", height, "block started");
        Ok(())
    }

    /// Executes `tx` against the deliver state.
    ///
    /// A rejected transaction is reported to the caller and the block goes on;
    /// checkpoints keep the deliver state consistent for the next transaction.
    pub fn deliver_tx(&mut self, tx: &Tx) -> Result<TxResult, TransactionError> {
        let BlockStage::Delivering(height) = self.block else {
            return Err(TransactionError::Invalid(
                "deliver_tx called outside of a block".into(),
            ));
        };
        let ctx = TxContext::new(self.chain_id.as_str(), height);
        self.stack.deliver_tx(&ctx, &mut self.deliver_state, tx)
    }

    /// Ends the block and returns the validator updates for consensus.
    ///
    /// A tick failure is returned as is: without it no trustworthy validator
    /// set exists, so the caller must not commit.
    pub fn end_block(&mut self) -> Result<Vec<ValidatorUpdate>, ChainError> {
        let BlockStage::Delivering(height) = self.block else {
            return Err(Self::out_of_sequence("end_block", "no block in progress"));
        };
        let ctx = TxContext::new(self.chain_id.as_str(), height);
        let updates = match self.ticker.tick(&ctx, &mut self.deliver_state) {
            Ok(updates) => updates,
            Err(e) => {
                tracing::error!(target: "app", height, error = %e, "tick failed");
                return Err(e.into());
            }
        };
        self.block = BlockStage::Ended(height);
        tracing::debug!(target: "app", height, updates = updates.len(), "block ended");
        Ok(updates)
    }

    /// Commits the ended block, resets the check state and returns the root hash.
    pub fn commit(&mut self) -> Result<[u8; 32], ChainError> {
        let BlockStage::Ended(height) = self.block else {
            return Err(Self::out_of_sequence("commit", "the block has not ended"));
        };
        self.height = height;
        self.block = BlockStage::Idle;
        self.check_state = self.deliver_state.clone();
        let root = self.root_hash();
        consensus_metrics().inc_blocks_committed();
        tracing::info!(
            target: "app",
            height,
            keys = self.deliver_state.len(),
            root = %hex::encode(root),
            "block committed"
        );
        Ok(root)
    }
}
