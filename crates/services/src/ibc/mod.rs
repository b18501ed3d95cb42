// Path: crates/services/src/ibc/mod.rs
//! Inter-chain packets.
//!
//! Remote chains are registered by transaction. Inbound packets are accepted
//! strictly in sequence per source chain; outbound packets are queued per
//! destination for a relayer to pick up. Proofs are not verified here: the
//! packet envelope is trusted once its source chain is registered.

use fermion_api::state::{read_decoded, write_encoded, ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{MessageHandler, Next, Stage, TxResult};
use fermion_types::app::{Actor, IbcMsg, IbcPacketTx, Message, MessageKind, Packet, Tx};
use fermion_types::codec;
use fermion_types::error::{StateError, TransactionError};
use fermion_types::keys::{
    prefixed_key, IBC_CHAIN_PREFIX, IBC_INBOUND_SEQUENCE_PREFIX, IBC_NAMESPACE,
    IBC_OUTBOUND_PREFIX, IBC_OUTBOUND_SEQUENCE_PREFIX,
};
use parity_scale_codec::{Decode, Encode};

/// What is recorded about a registered remote chain.
#[derive(Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub struct ChainInfo {
    /// The local height at which the chain was registered.
    pub registered_at: u64,
}

fn chain_key(chain_id: &str) -> Vec<u8> {
    prefixed_key(IBC_CHAIN_PREFIX, chain_id.as_bytes())
}

fn inbound_key(chain_id: &str) -> Vec<u8> {
    prefixed_key(IBC_INBOUND_SEQUENCE_PREFIX, chain_id.as_bytes())
}

fn outbound_seq_key(chain_id: &str) -> Vec<u8> {
    prefixed_key(IBC_OUTBOUND_SEQUENCE_PREFIX, chain_id.as_bytes())
}

/// `outbound::<dest>::<sequence, big-endian>` so a scan yields packets in order.
fn outbound_queue_prefix(chain_id: &str) -> Vec<u8> {
    [IBC_OUTBOUND_PREFIX, chain_id.as_bytes(), b"::"].concat()
}

fn packet_key(chain_id: &str, sequence: u64) -> Vec<u8> {
    [outbound_queue_prefix(chain_id), sequence.to_be_bytes().to_vec()].concat()
}

/// The registration record of `chain_id`, if registered.
pub fn chain_info<S: StateAccess + ?Sized>(
    store: &S,
    chain_id: &str,
) -> Result<Option<ChainInfo>, StateError> {
    read_decoded(store, &chain_key(chain_id))
}

/// The last sequence received from `chain_id`.
pub fn last_inbound<S: StateAccess + ?Sized>(store: &S, chain_id: &str) -> Result<u64, StateError> {
    Ok(read_decoded(store, &inbound_key(chain_id))?.unwrap_or(0))
}

/// The sequence following `last`. Running out is an error, never a wrap or a repeat.
fn next_sequence(last: u64) -> Result<u64, TransactionError> {
    last.checked_add(1)
        .ok_or_else(|| TransactionError::Invalid("ibc sequence exhausted".into()))
}

fn next_outbound<S: StateAccess + ?Sized>(
    store: &S,
    dest_chain: &str,
) -> Result<u64, TransactionError> {
    next_sequence(read_decoded::<u64, _>(store, &outbound_seq_key(dest_chain))?.unwrap_or(0))
}

/// Every queued packet for `dest_chain`, in sequence order.
pub fn outbound_packets<S: StateAccess + ?Sized>(
    store: &S,
    dest_chain: &str,
) -> Result<Vec<Packet>, StateError> {
    store
        .prefix_scan(&outbound_queue_prefix(dest_chain))?
        .map(|entry| {
            let (_, value) = entry?;
            codec::from_bytes_canonical(&value).map_err(StateError::Decode)
        })
        .collect()
}

/// Unwraps `IbcPacket` envelopes from registered chains, in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct IbcStage;

impl IbcStage {
    fn receive<'t>(
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &'t Tx,
    ) -> Result<Option<(TxContext, &'t Tx)>, TransactionError> {
        let Tx::IbcPacket(IbcPacketTx {
            src_chain,
            sequence,
            permissions,
            inner,
        }) = tx
        else {
            return Ok(None);
        };
        if chain_info(&*store, src_chain)?.is_none() {
            return Err(TransactionError::IbcUnknownChain(src_chain.clone()));
        }
        let expected = next_sequence(last_inbound(&*store, src_chain)?)?;
        if *sequence != expected {
            return Err(TransactionError::IbcPacketOutOfOrder {
                expected,
                got: *sequence,
            });
        }
        write_encoded(store, &inbound_key(src_chain), sequence)?;
        log::debug!("[IBC] received packet {} from {}", sequence, src_chain);

        // Permissions only ever speak for the chain the packet came from.
        let granted: Vec<Actor> = permissions.iter().map(|p| p.with_chain(src_chain)).collect();
        Ok(Some((ctx.with_signers(granted), inner.as_ref())))
    }
}

impl Stage for IbcStage {
    fn name(&self) -> &'static str {
        IBC_NAMESPACE
    }

    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        match Self::receive(ctx, store, tx)? {
            Some((ctx, inner)) => next.call(&ctx, store, inner),
            None => next.call(ctx, store, tx),
        }
    }

    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        match Self::receive(ctx, store, tx)? {
            Some((ctx, inner)) => next.call(&ctx, store, inner),
            None => next.call(ctx, store, tx),
        }
    }
}

/// Handles `IbcMsg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IbcModule;

impl IbcModule {
    fn ibc_msg(msg: &Message) -> Result<&IbcMsg, TransactionError> {
        match msg {
            Message::Ibc(inner) => Ok(inner),
            other => Err(TransactionError::UnroutableMessage(format!(
                "ibc module cannot handle '{}' messages",
                other.kind()
            ))),
        }
    }

    fn validate(
        ctx: &TxContext,
        store: &ScopedState<'_>,
        msg: &IbcMsg,
    ) -> Result<(), TransactionError> {
        match msg {
            IbcMsg::RegisterChain { chain_id } => {
                if chain_id.is_empty() || *chain_id == ctx.chain_id {
                    return Err(TransactionError::Invalid(format!(
                        "cannot register chain '{chain_id}'"
                    )));
                }
                if chain_info(store, chain_id)?.is_some() {
                    return Err(TransactionError::IbcChainAlreadyRegistered(chain_id.clone()));
                }
            }
            IbcMsg::CreatePacket {
                dest_chain,
                permissions,
                ..
            } => {
                if chain_info(store, dest_chain)?.is_none() {
                    return Err(TransactionError::IbcUnknownChain(dest_chain.clone()));
                }
                if let Some(missing) = permissions.iter().find(|p| !ctx.has_signer(p)) {
                    return Err(TransactionError::Unauthorized(format!(
                        "packet permission {missing} is not held"
                    )));
                }
                next_outbound(store, dest_chain)?;
            }
        }
        Ok(())
    }
}

impl MessageHandler for IbcModule {
    fn name(&self) -> &'static str {
        IBC_NAMESPACE
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Ibc
    }

    fn check(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError> {
        Self::validate(ctx, store, Self::ibc_msg(msg)?)?;
        Ok(TxResult::default())
    }

    fn deliver(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError> {
        let msg = Self::ibc_msg(msg)?;
        Self::validate(ctx, store, msg)?;
        match msg {
            IbcMsg::RegisterChain { chain_id } => {
                let info = ChainInfo {
                    registered_at: ctx.block_height,
                };
                write_encoded(store, &chain_key(chain_id), &info)?;
                log::info!("[IBC] registered chain {}", chain_id);
                Ok(TxResult::with_log(format!("registered {chain_id}")))
            }
            IbcMsg::CreatePacket {
                dest_chain,
                permissions,
                tx,
            } => {
                let sequence = next_outbound(&*store, dest_chain)?;
                let packet = Packet {
                    dest_chain: dest_chain.clone(),
                    sequence,
                    permissions: permissions.clone(),
                    tx: tx.as_ref().clone(),
                };
                write_encoded(store, &packet_key(dest_chain, sequence), &packet)?;
                write_encoded(store, &outbound_seq_key(dest_chain), &sequence)?;
                log::debug!("[IBC] queued packet {} for {}", sequence, dest_chain);
                Ok(TxResult {
                    data: sequence.encode(),
                    log: format!("queued packet {sequence} for {dest_chain}"),
                    gas: 0,
                })
            }
        }
    }
}
