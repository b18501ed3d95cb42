// Path: crates/services/src/stake/candidates.rs
//! The candidate registry read by the end-block tick.
//!
//! Candidates live under `candidate::<pubkey>` in the `stake` namespace. The
//! registry is loaded in key order, which is public-key order, so every pass
//! over it is deterministic.

use super::load_params;
use fermion_api::state::{read_decoded, write_encoded, StateAccess};
use fermion_types::app::{Candidate, CandidateStatus, PubKey, Validator, ValidatorUpdate};
use fermion_types::codec;
use fermion_types::error::StateError;
use fermion_types::keys::{prefixed_key, STAKE_CANDIDATE_PREFIX};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

pub(crate) fn candidate_key(pub_key: &PubKey) -> Vec<u8> {
    prefixed_key(STAKE_CANDIDATE_PREFIX, &pub_key.0)
}

/// Loads one candidate.
pub fn load_candidate<S: StateAccess + ?Sized>(
    store: &S,
    pub_key: &PubKey,
) -> Result<Option<Candidate>, StateError> {
    read_decoded(store, &candidate_key(pub_key))
}

/// Writes one candidate record.
pub fn save_candidate<S: StateAccess + ?Sized>(
    store: &mut S,
    candidate: &Candidate,
) -> Result<(), StateError> {
    write_encoded(store, &candidate_key(&candidate.pub_key), candidate)
}

/// Higher weight first, then lower public key.
fn by_rank(a: (u64, &PubKey), b: (u64, &PubKey)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

fn is_retired(candidate: &Candidate) -> bool {
    candidate.status != CandidateStatus::Bonded && candidate.shares == 0
}

/// Snapshot of every candidate, ordered by public key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

/// Loads the full registry.
pub fn load_candidates<S: StateAccess + ?Sized>(store: &S) -> Result<CandidateSet, StateError> {
    let mut candidates = store
        .prefix_scan(STAKE_CANDIDATE_PREFIX)?
        .map(|entry| {
            let (_, value) = entry?;
            codec::from_bytes_canonical::<Candidate>(&value).map_err(StateError::Decode)
        })
        .collect::<Result<Vec<_>, _>>()?;
    candidates.sort_by(|a, b| a.pub_key.cmp(&b.pub_key));
    Ok(CandidateSet { candidates })
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn get(&self, pub_key: &PubKey) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.pub_key == *pub_key)
    }

    /// The validator set implied by the persisted voting power: at most
    /// `max_vals` candidates with non-zero power, strongest first.
    pub fn validators<S: StateAccess + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Vec<Validator>, StateError> {
        let params = load_params(store)?;
        let mut validators: Vec<Validator> = self
            .candidates
            .iter()
            .filter(|c| c.voting_power > 0)
            .map(|c| Validator {
                pub_key: c.pub_key,
                power: c.voting_power,
            })
            .collect();
        validators.sort_by(|a, b| by_rank((a.power, &a.pub_key), (b.power, &b.pub_key)));
        validators.truncate(params.max_vals as usize);
        Ok(validators)
    }

    /// Recomputes voting power from bonded shares and persists it.
    ///
    /// Only the top `max_vals` bonded candidates by shares hold power; every
    /// other candidate is set to zero. Candidates that are no longer bonded
    /// and hold no shares are deleted. Returns whether any power changed.
    pub fn update_voting_power<S: StateAccess + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<bool, StateError> {
        let params = load_params(&*store)?;
        let mut ranked: Vec<(u64, &PubKey)> = self
            .candidates
            .iter()
            .filter(|c| c.status == CandidateStatus::Bonded && c.shares > 0)
            .map(|c| (c.shares, &c.pub_key))
            .collect();
        ranked.sort_by(|a, b| by_rank(*a, *b));
        let elected: BTreeSet<PubKey> = ranked
            .into_iter()
            .take(params.max_vals as usize)
            .map(|(_, pk)| *pk)
            .collect();

        let mut changed = false;
        for candidate in self.candidates.iter_mut() {
            let power = if elected.contains(&candidate.pub_key) {
                candidate.shares
            } else {
                0
            };
            if power != candidate.voting_power {
                changed = true;
                candidate.voting_power = power;
                if !is_retired(candidate) {
                    save_candidate(store, candidate)?;
                }
            }
        }

        for candidate in self.candidates.iter().filter(|c| is_retired(c)) {
            store.delete(&candidate_key(&candidate.pub_key))?;
            log::debug!("[Stake] removed unbonded candidate {}", candidate.pub_key);
        }
        self.candidates.retain(|c| !is_retired(c));
        Ok(changed)
    }
}

/// The updates that turn `start` into `new`.
///
/// Members of `new` that are absent from `start` or whose power differs come
/// first, in `new` order. Members of `start` missing from `new` follow with
/// power 0, in `start` order.
pub fn validators_diff(start: &[Validator], new: &[Validator]) -> Vec<ValidatorUpdate> {
    let before: BTreeMap<&PubKey, u64> = start.iter().map(|v| (&v.pub_key, v.power)).collect();
    let after: BTreeSet<&PubKey> = new.iter().map(|v| &v.pub_key).collect();

    let mut diff: Vec<ValidatorUpdate> = new
        .iter()
        .filter(|v| before.get(&v.pub_key) != Some(&v.power))
        .map(ValidatorUpdate::from)
        .collect();
    diff.extend(
        start
            .iter()
            .filter(|v| !after.contains(&v.pub_key))
            .map(|v| ValidatorUpdate {
                pub_key: v.pub_key,
                power: 0,
            }),
    );
    diff
}
