// Path: crates/types/src/app/transaction.rs

//! The transaction model: a chain of envelopes around one terminal message.
//!
//! A client wraps a `Message` from the inside out; each processing stage
//! unwraps exactly the envelope it owns and hands the inner transaction on.
//! Whatever reaches the dispatcher must be a bare `Tx::Msg`.

use crate::app::{Actor, Coin, Coins, PubKey};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single ed25519 signature over the sign bytes of a `SignedTx`'s inner transaction.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Signature {
    /// The key that produced the signature.
    pub pub_key: PubKey,
    /// The 64-byte signature.
    pub signature: Vec<u8>,
}

/// Envelope carrying the signatures over its inner transaction.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct SignedTx {
    /// One entry per signer.
    pub signatures: Vec<Signature>,
    /// The signed transaction.
    pub inner: Box<Tx>,
}

/// Envelope binding a transaction to a chain and an optional expiry height.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ChainTx {
    /// The chain the transaction is valid on.
    pub chain_id: String,
    /// The last height at which the transaction is valid. Zero means no expiry.
    pub expires_at: u64,
    /// The wrapped transaction.
    pub inner: Box<Tx>,
}

/// Envelope carrying the replay-protection sequence of a signer set.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct NonceTx {
    /// The sequence number; must be one more than the last one used by `signers`.
    pub sequence: u64,
    /// The signer set the sequence belongs to.
    pub signers: Vec<Actor>,
    /// The wrapped transaction.
    pub inner: Box<Tx>,
}

/// Envelope for a packet relayed from another chain.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct IbcPacketTx {
    /// The chain the packet was created on.
    pub src_chain: String,
    /// The packet's sequence number on the source chain.
    pub sequence: u64,
    /// The permissions granted to the packet on its source chain.
    pub permissions: Vec<Actor>,
    /// The transaction to execute locally.
    pub inner: Box<Tx>,
}

/// Envelope requesting that the transaction run with a role's permission.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct AssumeRoleTx {
    /// The role name.
    pub role: Vec<u8>,
    /// The wrapped transaction.
    pub inner: Box<Tx>,
}

/// Envelope paying a fee for the transaction.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct FeeTx {
    /// The fee offered.
    pub fee: Coin,
    /// The account paying the fee.
    pub payer: Actor,
    /// The wrapped transaction.
    pub inner: Box<Tx>,
}

/// A transaction: either an envelope or a terminal message.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub enum Tx {
    /// Signatures over the inner transaction.
    Signed(SignedTx),
    /// Chain binding.
    Chain(ChainTx),
    /// Replay protection.
    Nonce(NonceTx),
    /// A packet relayed from another chain.
    IbcPacket(IbcPacketTx),
    /// Role assumption.
    AssumeRole(AssumeRoleTx),
    /// Fee payment.
    Fee(FeeTx),
    /// A terminal message for the dispatcher.
    Msg(Message),
}

impl Tx {
    /// The name of the outermost layer, used in logs and routing errors.
    pub fn layer(&self) -> &'static str {
        match self {
            Tx::Signed(_) => "signed",
            Tx::Chain(_) => "chain",
            Tx::Nonce(_) => "nonce",
            Tx::IbcPacket(_) => "ibc_packet",
            Tx::AssumeRole(_) => "assume_role",
            Tx::Fee(_) => "fee",
            Tx::Msg(m) => m.kind().as_str(),
        }
    }

    /// The canonical bytes a signer commits to.
    pub fn sign_bytes(&self) -> Vec<u8> {
        self.encode()
    }

    /// Wraps a message.
    pub fn msg(message: Message) -> Self {
        Tx::Msg(message)
    }

    /// Wraps `self` in a fee envelope.
    pub fn with_fee(self, fee: Coin, payer: Actor) -> Self {
        Tx::Fee(FeeTx {
            fee,
            payer,
            inner: Box::new(self),
        })
    }

    /// Wraps `self` in a role envelope.
    pub fn with_role(self, role: impl Into<Vec<u8>>) -> Self {
        Tx::AssumeRole(AssumeRoleTx {
            role: role.into(),
            inner: Box::new(self),
        })
    }

    /// Wraps `self` in a nonce envelope.
    pub fn with_nonce(self, sequence: u64, signers: Vec<Actor>) -> Self {
        Tx::Nonce(NonceTx {
            sequence,
            signers,
            inner: Box::new(self),
        })
    }

    /// Wraps `self` in a chain envelope.
    pub fn with_chain(self, chain_id: impl Into<String>, expires_at: u64) -> Self {
        Tx::Chain(ChainTx {
            chain_id: chain_id.into(),
            expires_at,
            inner: Box::new(self),
        })
    }
}

/// The discriminant of a terminal message, used as the routing key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum MessageKind {
    /// Coin transfers.
    Coin,
    /// Role management.
    Roles,
    /// IBC chain registration and outbound packets.
    Ibc,
    /// Stake operations.
    Stake,
}

impl MessageKind {
    /// A stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Coin => "coin",
            MessageKind::Roles => "roles",
            MessageKind::Ibc => "ibc",
            MessageKind::Stake => "stake",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal message handled by exactly one module.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub enum Message {
    /// Coin module.
    Coin(CoinMsg),
    /// Roles module.
    Roles(RolesMsg),
    /// IBC module.
    Ibc(IbcMsg),
    /// Staking module.
    Stake(StakeMsg),
}

impl Message {
    /// The routing key for this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Coin(_) => MessageKind::Coin,
            Message::Roles(_) => MessageKind::Roles,
            Message::Ibc(_) => MessageKind::Ibc,
            Message::Stake(_) => MessageKind::Stake,
        }
    }
}

/// Coin module messages.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub enum CoinMsg {
    /// Moves coins from one account to another.
    Send {
        /// The paying account; must hold the permission in the context.
        from: Actor,
        /// The receiving account.
        to: Actor,
        /// The amount to move.
        coins: Coins,
    },
}

/// Roles module messages.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub enum RolesMsg {
    /// Creates a new multi-signature role.
    CreateRole {
        /// The role name.
        role: Vec<u8>,
        /// How many members must sign to assume the role.
        min_sigs: u32,
        /// The role members.
        signers: Vec<Actor>,
    },
}

/// IBC module messages.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub enum IbcMsg {
    /// Registers a remote chain so that its packets are accepted.
    RegisterChain {
        /// The remote chain id.
        chain_id: String,
    },
    /// Queues a packet for relaying to a remote chain.
    CreatePacket {
        /// The destination chain.
        dest_chain: String,
        /// Permissions the packet carries; each must be held by the sender.
        permissions: Vec<Actor>,
        /// The transaction to execute on the destination chain.
        tx: Box<Tx>,
    },
}

/// Staking module messages.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub enum StakeMsg {
    /// Declares a new validator candidate with an initial self-bond.
    DeclareCandidacy {
        /// The validator key.
        pub_key: PubKey,
        /// The initial bond.
        bond: Coin,
    },
    /// Bonds coins to a candidate.
    Bond {
        /// The candidate key.
        pub_key: PubKey,
        /// The amount to bond.
        amount: Coin,
    },
    /// Unbonds shares from a candidate.
    Unbond {
        /// The candidate key.
        pub_key: PubKey,
        /// The shares to release.
        shares: u64,
    },
}

/// An outbound packet waiting to be relayed.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Packet {
    /// The destination chain.
    pub dest_chain: String,
    /// The packet's sequence on this chain's outbound queue for `dest_chain`.
    pub sequence: u64,
    /// Permissions the packet carries.
    pub permissions: Vec<Actor>,
    /// The transaction to execute on the destination chain.
    pub tx: Tx,
}
