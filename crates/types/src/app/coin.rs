// Path: crates/types/src/app/coin.rs

//! Fungible coin amounts and the ordered coin sets held by accounts.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An amount of a single denomination.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct Coin {
    /// The denomination name, e.g. `fermion`.
    pub denom: String,
    /// The amount in the smallest unit.
    pub amount: u64,
}

impl Coin {
    /// Creates a new coin.
    pub fn new(denom: impl Into<String>, amount: u64) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A set of coins, at most one entry per denomination.
///
/// A valid set is sorted by denomination, has no duplicates, and holds only
/// positive amounts. The arithmetic helpers always return valid sets.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
#[serde(transparent)]
pub struct Coins(pub Vec<Coin>);

impl Coins {
    /// Builds a valid set from arbitrary coins, merging duplicates and dropping zeros.
    pub fn normalized(coins: impl IntoIterator<Item = Coin>) -> Option<Self> {
        let mut merged: BTreeMap<String, u64> = BTreeMap::new();
        for coin in coins {
            let entry = merged.entry(coin.denom).or_insert(0);
            *entry = entry.checked_add(coin.amount)?;
        }
        Some(Self::from_map(merged))
    }

    fn from_map(map: BTreeMap<String, u64>) -> Self {
        Self(
            map.into_iter()
                .filter(|(_, amount)| *amount > 0)
                .map(|(denom, amount)| Coin { denom, amount })
                .collect(),
        )
    }

    fn to_map(&self) -> BTreeMap<String, u64> {
        self.0
            .iter()
            .map(|c| (c.denom.clone(), c.amount))
            .collect()
    }

    /// Checks that the set is sorted, duplicate-free and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|c| c.amount > 0 && !c.denom.is_empty())
            && self.0.windows(2).all(|w| match w {
                [a, b] => a.denom < b.denom,
                _ => true,
            })
    }

    /// True if the set holds nothing.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the amount held of `denom`.
    pub fn amount_of(&self, denom: &str) -> u64 {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    /// Adds two sets, returning `None` on overflow.
    pub fn checked_add(&self, other: &Coins) -> Option<Coins> {
        let mut map = self.to_map();
        for coin in &other.0 {
            let entry = map.entry(coin.denom.clone()).or_insert(0);
            *entry = entry.checked_add(coin.amount)?;
        }
        Some(Self::from_map(map))
    }

    /// Subtracts `other`, returning `None` if any denomination would go negative.
    pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
        let mut map = self.to_map();
        for coin in &other.0 {
            let entry = map.get_mut(&coin.denom)?;
            *entry = entry.checked_sub(coin.amount)?;
        }
        Some(Self::from_map(map))
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        if coin.amount == 0 {
            Self::default()
        } else {
            Self(vec![coin])
        }
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coins(list: &[(&str, u64)]) -> Coins {
        Coins(list.iter().map(|(d, a)| Coin::new(*d, *a)).collect())
    }

    #[test]
    fn test_validity_rules() {
        assert!(coins(&[("atom", 1), ("fermion", 5)]).is_valid());
        assert!(!coins(&[("fermion", 5), ("atom", 1)]).is_valid());
        assert!(!coins(&[("atom", 1), ("atom", 2)]).is_valid());
        assert!(!coins(&[("atom", 0)]).is_valid());
        assert!(Coins::default().is_valid());
    }

    #[test]
    fn test_arithmetic_keeps_sets_valid() {
        let a = coins(&[("atom", 5), ("fermion", 10)]);
        let b = coins(&[("fermion", 10)]);

        let diff = a.checked_sub(&b).unwrap();
        assert_eq!(diff, coins(&[("atom", 5)]));
        assert!(diff.is_valid());

        assert!(b.checked_sub(&a).is_none());
        assert_eq!(
            diff.checked_add(&b).unwrap(),
            coins(&[("atom", 5), ("fermion", 10)])
        );
        assert!(coins(&[("x", u64::MAX)])
            .checked_add(&coins(&[("x", 1)]))
            .is_none());
    }

    #[test]
    fn test_normalized_merges_and_sorts() {
        let set = Coins::normalized(vec![
            Coin::new("fermion", 3),
            Coin::new("atom", 0),
            Coin::new("fermion", 4),
            Coin::new("atom", 1),
        ])
        .unwrap();
        assert_eq!(set, coins(&[("atom", 1), ("fermion", 7)]));
        assert_eq!(set.amount_of("fermion"), 7);
        assert_eq!(set.to_string(), "1atom,7fermion");
    }
}
