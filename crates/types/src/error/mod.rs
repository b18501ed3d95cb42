// Path: crates/types/src/error/mod.rs
//! Core error types for the Fermion node.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors related to the state store or a scoped view of it.
#[derive(Error, Debug)]
pub enum StateError {
    /// The requested key was not found in the state.
    #[error("Key not found in state")]
    KeyNotFound,
    /// An error occurred in the state backend.
    #[error("State backend error: {0}")]
    Backend(String),
    /// The provided value was invalid.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// An error occurred during state deserialization.
    #[error("Decode error: {0}")]
    Decode(String),
    /// The operation touched keys outside of the caller's granted namespaces.
    #[error("Permission denied for state key: {0}")]
    PermissionDenied(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound => "STATE_KEY_NOT_FOUND",
            Self::Backend(_) => "STATE_BACKEND_ERROR",
            Self::InvalidValue(_) => "STATE_INVALID_VALUE",
            Self::Decode(_) => "STATE_DECODE_ERROR",
            Self::PermissionDenied(_) => "STATE_PERMISSION_DENIED",
        }
    }
}

/// The class a transaction error belongs to, which decides how callers report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The transaction was rejected by a stage or handler before committing.
    Validation,
    /// The dispatcher found no terminal handler for the transaction.
    Unroutable,
    /// A fault inside the pipeline was caught by the recovery stage.
    Recovered,
    /// The state store failed underneath the pipeline.
    State,
}

impl ErrorKind {
    /// A stable lowercase label, used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Unroutable => "unroutable",
            Self::Recovered => "recovered",
            Self::State => "state",
        }
    }
}

/// Errors raised while processing a single transaction.
///
/// None of these escape the block: the application reports them against the
/// offending transaction and continues with the next one.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// An error occurred during serialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error occurred during deserialization.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// The transaction is invalid for a handler-specific reason.
    #[error("Invalid transaction: {0}")]
    Invalid(String),
    /// An error originating from the state store.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// The transaction is not wrapped in a signature envelope.
    #[error("Transaction carries no signatures")]
    MissingSignature,
    /// A signature did not verify against the sign bytes.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The transaction is not wrapped in a chain envelope.
    #[error("Transaction is not bound to a chain")]
    MissingChain,
    /// The transaction was built for another chain.
    #[error("Wrong chain. Expected {expected}, got {got}")]
    WrongChain {
        /// The chain this node runs.
        expected: String,
        /// The chain named in the transaction.
        got: String,
    },
    /// The transaction's expiry height has passed.
    #[error("Transaction expired at height {expires_at} (current height {height})")]
    Expired {
        /// The current block height.
        height: u64,
        /// The last height at which the transaction was valid.
        expires_at: u64,
    },

    /// The transaction is not wrapped in a nonce envelope.
    #[error("Transaction carries no nonce")]
    MissingNonce,
    /// The sequence number is not the next one for the signer set.
    #[error("Bad nonce. Expected {expected}, got {got}")]
    BadNonce {
        /// The sequence the signer set must use next.
        expected: u64,
        /// The sequence the transaction carried.
        got: u64,
    },

    /// A required permission is not held by the transaction context.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The fee envelope is missing, in the wrong denomination, or too small.
    #[error("Insufficient fee: {0}")]
    InsufficientFee(String),
    /// The account has insufficient funds to cover the transaction amount.
    #[error("Insufficient funds")]
    InsufficientFunds,
    /// The transaction resulted in a balance overflow.
    #[error("Balance overflow")]
    BalanceOverflow,
    /// A coin set is malformed (unsorted, duplicated, or non-positive).
    #[error("Invalid coins: {0}")]
    InvalidCoins(String),

    /// No terminal handler is registered for the transaction's message type.
    #[error("Unroutable message: {0}")]
    UnroutableMessage(String),

    /// The referenced role does not exist.
    #[error("Role not found: {0}")]
    RoleNotFound(String),
    /// A role with this name already exists.
    #[error("Role already exists: {0}")]
    RoleAlreadyExists(String),

    /// The source chain of a packet is not registered.
    #[error("Unknown IBC chain: {0}")]
    IbcUnknownChain(String),
    /// The chain is already registered.
    #[error("IBC chain already registered: {0}")]
    IbcChainAlreadyRegistered(String),
    /// A packet arrived out of sequence.
    #[error("IBC packet out of order. Expected {expected}, got {got}")]
    IbcPacketOutOfOrder {
        /// The next sequence expected from the source chain.
        expected: u64,
        /// The sequence carried by the packet.
        got: u64,
    },

    /// The referenced validator candidate does not exist.
    #[error("Candidate not found: {0}")]
    CandidateNotFound(String),
    /// A candidate with this public key is already declared.
    #[error("Candidate already exists: {0}")]
    CandidateExists(String),
    /// The bond uses a denomination the staking module does not accept.
    #[error("Invalid bond denomination. Expected {expected}, got {got}")]
    InvalidBondDenom {
        /// The denomination accepted for bonding.
        expected: String,
        /// The denomination offered.
        got: String,
    },
    /// The delegator does not hold enough shares to unbond.
    #[error("Insufficient bonded shares")]
    InsufficientShares,

    /// A stage or handler faulted and the recovery stage caught it.
    #[error("Recovered from internal fault: {0}")]
    Recovered(String),
}

impl TransactionError {
    /// Classifies the error for reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnroutableMessage(_) => ErrorKind::Unroutable,
            Self::Recovered(_) => ErrorKind::Recovered,
            Self::State(_) => ErrorKind::State,
            _ => ErrorKind::Validation,
        }
    }
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Serialization(_) => "TX_SERIALIZATION_ERROR",
            Self::Deserialization(_) => "TX_DESERIALIZATION_ERROR",
            Self::Invalid(_) => "TX_INVALID",
            Self::State(_) => "TX_STATE_ERROR",
            Self::MissingSignature => "TX_MISSING_SIGNATURE",
            Self::InvalidSignature(_) => "TX_INVALID_SIGNATURE",
            Self::MissingChain => "TX_MISSING_CHAIN",
            Self::WrongChain { .. } => "TX_WRONG_CHAIN",
            Self::Expired { .. } => "TX_EXPIRED",
            Self::MissingNonce => "TX_MISSING_NONCE",
            Self::BadNonce { .. } => "TX_BAD_NONCE",
            Self::Unauthorized(_) => "TX_UNAUTHORIZED",
            Self::InsufficientFee(_) => "TX_INSUFFICIENT_FEE",
            Self::InsufficientFunds => "TX_INSUFFICIENT_FUNDS",
            Self::BalanceOverflow => "TX_BALANCE_OVERFLOW",
            Self::InvalidCoins(_) => "TX_INVALID_COINS",
            Self::UnroutableMessage(_) => "TX_UNROUTABLE_MESSAGE",
            Self::RoleNotFound(_) => "TX_ROLE_NOT_FOUND",
            Self::RoleAlreadyExists(_) => "TX_ROLE_ALREADY_EXISTS",
            Self::IbcUnknownChain(_) => "TX_IBC_UNKNOWN_CHAIN",
            Self::IbcChainAlreadyRegistered(_) => "TX_IBC_CHAIN_ALREADY_REGISTERED",
            Self::IbcPacketOutOfOrder { .. } => "TX_IBC_PACKET_OUT_OF_ORDER",
            Self::CandidateNotFound(_) => "TX_CANDIDATE_NOT_FOUND",
            Self::CandidateExists(_) => "TX_CANDIDATE_EXISTS",
            Self::InvalidBondDenom { .. } => "TX_INVALID_BOND_DENOM",
            Self::InsufficientShares => "TX_INSUFFICIENT_SHARES",
            Self::Recovered(_) => "TX_RECOVERED",
        }
    }
}

/// Errors raised by the per-block validator reconciliation.
///
/// A node that hits one of these cannot produce a trustworthy validator set,
/// so callers must surface it to the consensus layer.
#[derive(Error, Debug)]
pub enum TickError {
    /// Reading or writing the candidate registry failed.
    #[error("State access error: {0}")]
    State(#[from] StateError),
    /// The candidate registry is internally inconsistent.
    #[error("Candidate registry error: {0}")]
    Registry(String),
}

impl ErrorCode for TickError {
    fn code(&self) -> &'static str {
        match self {
            Self::State(_) => "TICK_STATE_ERROR",
            Self::Registry(_) => "TICK_REGISTRY_ERROR",
        }
    }
}

/// Errors raised while assembling a processing stack.
#[derive(Error, Debug)]
pub enum StackError {
    /// Two terminal handlers claim the same message type.
    #[error("Duplicate route for message type '{0}'")]
    DuplicateRoute(&'static str),
    /// Two stages share a name, and therefore a namespace.
    #[error("Duplicate stage '{0}'")]
    DuplicateStage(&'static str),
}

impl ErrorCode for StackError {
    fn code(&self) -> &'static str {
        match self {
            Self::DuplicateRoute(_) => "STACK_DUPLICATE_ROUTE",
            Self::DuplicateStage(_) => "STACK_DUPLICATE_STAGE",
        }
    }
}

/// Errors raised while loading genesis options into the initial state.
#[derive(Error, Debug)]
pub enum GenesisError {
    /// The option string is not of the form `module/key/value`.
    #[error("Malformed genesis option: {0}")]
    Malformed(String),
    /// The genesis document names another chain.
    #[error("Genesis is for chain {got}, node runs {expected}")]
    ChainMismatch {
        /// The chain this node runs.
        expected: String,
        /// The chain named in the genesis document.
        got: String,
    },
    /// No module with this name accepts genesis options.
    #[error("Unknown genesis module: {0}")]
    UnknownModule(String),
    /// The module rejected the option.
    #[error("Module '{module}' rejected option '{key}': {source}")]
    Rejected {
        /// The module named by the option.
        module: String,
        /// The option key.
        key: String,
        /// The module's reason for rejecting it.
        #[source]
        source: TransactionError,
    },
}

impl ErrorCode for GenesisError {
    fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "GENESIS_MALFORMED_OPTION",
            Self::ChainMismatch { .. } => "GENESIS_CHAIN_MISMATCH",
            Self::UnknownModule(_) => "GENESIS_UNKNOWN_MODULE",
            Self::Rejected { .. } => "GENESIS_OPTION_REJECTED",
        }
    }
}

/// Errors raised by the block lifecycle of the application.
#[derive(Error, Debug)]
pub enum ChainError {
    /// A block was started at a height other than the next one.
    #[error("Block height out of order. Expected {expected}, got {got}")]
    HeightMismatch {
        /// The next height.
        expected: u64,
        /// The height requested.
        got: u64,
    },
    /// A lifecycle call arrived in the wrong order.
    #[error("Unexpected {call}: {reason}")]
    OutOfSequence {
        /// The call that was rejected.
        call: &'static str,
        /// Why it cannot run now.
        reason: &'static str,
    },
    /// Loading genesis failed.
    #[error("Genesis error: {0}")]
    Genesis(#[from] GenesisError),
    /// The end-block tick failed; no validator set can be produced.
    #[error("Tick error: {0}")]
    Tick(#[from] TickError),
    /// The state store failed.
    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl ErrorCode for ChainError {
    fn code(&self) -> &'static str {
        match self {
            Self::HeightMismatch { .. } => "CHAIN_HEIGHT_MISMATCH",
            Self::OutOfSequence { .. } => "CHAIN_OUT_OF_SEQUENCE",
            Self::Genesis(_) => "CHAIN_GENESIS_ERROR",
            Self::Tick(_) => "CHAIN_TICK_ERROR",
            Self::State(_) => "CHAIN_STATE_ERROR",
        }
    }
}
