// Path: crates/types/src/keys/mod.rs
//! Namespaces and well-known state keys.
//!
//! Every module owns exactly one namespace. Keys below are relative to that
//! namespace; the scoped state view adds the `<namespace>::` prefix.

/// Namespace of the signature verification stage.
pub const SIGS_NAMESPACE: &str = "sigs";
/// Namespace of the chain-context stage.
pub const CHAIN_NAMESPACE: &str = "base";
/// Namespace of the replay-nonce stage.
pub const NONCE_NAMESPACE: &str = "nonce";
/// Namespace of the coin module.
pub const COIN_NAMESPACE: &str = "coin";
/// Namespace of the fee stage.
pub const FEE_NAMESPACE: &str = "fee";
/// Namespace of the roles module.
pub const ROLES_NAMESPACE: &str = "roles";
/// Namespace of the IBC module.
pub const IBC_NAMESPACE: &str = "ibc";
/// Namespace of the staking module.
pub const STAKE_NAMESPACE: &str = "stake";

/// The separator placed between a namespace and its keys.
pub const NAMESPACE_SEPARATOR: &[u8] = b"::";

/// Builds the physical key prefix for a namespace.
///
/// # Example
/// `namespace_prefix("stake")` -> `b"stake::"`
pub fn namespace_prefix(namespace: &str) -> Vec<u8> {
    [namespace.as_bytes(), NAMESPACE_SEPARATOR].concat()
}

/// Nonce module: last used sequence per signer set.
pub const NONCE_SEQUENCE_PREFIX: &[u8] = b"seq::";

/// Coin module: balance per account.
pub const COIN_ACCOUNT_PREFIX: &[u8] = b"account::";

/// Roles module: role definitions.
pub const ROLE_PREFIX: &[u8] = b"role::";

/// IBC module: registered remote chains.
pub const IBC_CHAIN_PREFIX: &[u8] = b"chain::";
/// IBC module: last received sequence per source chain.
pub const IBC_INBOUND_SEQUENCE_PREFIX: &[u8] = b"inbound::";
/// IBC module: outbound packet queue per destination chain.
pub const IBC_OUTBOUND_PREFIX: &[u8] = b"outbound::";
/// IBC module: next outbound sequence per destination chain.
pub const IBC_OUTBOUND_SEQUENCE_PREFIX: &[u8] = b"outbound_seq::";

/// Staking module: governance-free parameters.
pub const STAKE_PARAMS_KEY: &[u8] = b"params";
/// Staking module: candidate records keyed by public key.
pub const STAKE_CANDIDATE_PREFIX: &[u8] = b"candidate::";
/// Staking module: delegator bonds keyed by delegator then candidate.
pub const STAKE_BOND_PREFIX: &[u8] = b"bond::";

/// Creates a key by appending `suffix` to `prefix`.
pub fn prefixed_key(prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
    [prefix, suffix].concat()
}
