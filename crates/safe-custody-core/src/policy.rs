//! Owner/threshold reconciliation for Safe multisig accounts.
//!
//! A [`Policy`] mirrors the Safe owner linked list: the order of `owners` is
//! the on-chain order and the predecessor of the first owner is the sentinel.
//! [`Policy::safe_transactions`] computes the ordered owner mutations that
//! turn one policy into another.

use std::collections::HashSet;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::constants::SENTINEL_ADDRESS;
use crate::ports::CustodyError;

/// A primitive owner mutation accepted by the Safe OwnerManager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SafeTx {
    #[serde(rename_all = "camelCase")]
    SwapOwner {
        prev: Address,
        old: Address,
        new: Address,
    },
    #[serde(rename_all = "camelCase")]
    AddOwnerWithThreshold { owner: Address, threshold: u64 },
    #[serde(rename_all = "camelCase")]
    RemoveOwner {
        prev: Address,
        owner: Address,
        threshold: u64,
    },
    #[serde(rename_all = "camelCase")]
    ChangeThreshold { threshold: u64 },
}

impl SafeTx {
    /// Copy of this transaction carrying `threshold`, if the variant has one.
    fn with_threshold(self, threshold: u64) -> Option<SafeTx> {
        match self {
            SafeTx::AddOwnerWithThreshold { owner, .. } => {
                Some(SafeTx::AddOwnerWithThreshold { owner, threshold })
            }
            SafeTx::RemoveOwner { prev, owner, .. } => Some(SafeTx::RemoveOwner {
                prev,
                owner,
                threshold,
            }),
            SafeTx::ChangeThreshold { .. } => Some(SafeTx::ChangeThreshold { threshold }),
            SafeTx::SwapOwner { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub owners: Vec<Address>,
    pub threshold: u64,
}

impl Policy {
    pub fn new(owners: Vec<Address>, threshold: u64) -> Result<Self, CustodyError> {
        let policy = Self { owners, threshold };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), CustodyError> {
        if self.owners.is_empty() {
            return Err(CustodyError::Invariant("policy has no owners".to_owned()));
        }
        let mut seen = HashSet::with_capacity(self.owners.len());
        for owner in &self.owners {
            if !seen.insert(owner) {
                return Err(CustodyError::Invariant(format!("duplicate owner {owner}")));
            }
        }
        check_threshold(self.threshold, self.owners.len())
    }

    pub fn contains(&self, owner: Address) -> bool {
        self.owners.contains(&owner)
    }

    /// Owners as a set, ignoring linked-list order.
    pub fn same_owners(&self, other: &Policy) -> bool {
        let ours: HashSet<_> = self.owners.iter().collect();
        let theirs: HashSet<_> = other.owners.iter().collect();
        ours == theirs
    }

    fn index_of(&self, owner: Address) -> Result<usize, CustodyError> {
        self.owners
            .iter()
            .position(|o| *o == owner)
            .ok_or_else(|| CustodyError::NotFound(format!("owner {owner}")))
    }

    fn prev_at(&self, index: usize) -> Address {
        if index == 0 {
            SENTINEL_ADDRESS
        } else {
            self.owners[index - 1]
        }
    }

    /// Predecessor of `owner` in the owner linked list.
    pub fn prev_owner(&self, owner: Address) -> Result<Address, CustodyError> {
        self.index_of(owner).map(|index| self.prev_at(index))
    }

    fn check_prev(&self, index: usize, prev: Address) -> Result<(), CustodyError> {
        let expected = self.prev_at(index);
        if prev != expected {
            return Err(CustodyError::Invariant(format!(
                "prev owner mismatch for {}: expected {expected}, got {prev}",
                self.owners[index]
            )));
        }
        Ok(())
    }

    fn check_new_owner(&self, owner: Address) -> Result<(), CustodyError> {
        if owner == SENTINEL_ADDRESS || owner == Address::ZERO {
            return Err(CustodyError::Invariant(format!("{owner} cannot be an owner")));
        }
        if self.contains(owner) {
            return Err(CustodyError::Invariant(format!("{owner} is already an owner")));
        }
        Ok(())
    }

    /// The policy that results from executing `tx` against this one.
    pub fn apply_transaction(&self, tx: &SafeTx) -> Result<Policy, CustodyError> {
        match *tx {
            SafeTx::SwapOwner { prev, old, new } => {
                let index = self.index_of(old)?;
                self.check_prev(index, prev)?;
                self.check_new_owner(new)?;
                let mut owners = self.owners.clone();
                owners[index] = new;
                Ok(Policy {
                    owners,
                    threshold: self.threshold,
                })
            }
            SafeTx::AddOwnerWithThreshold { owner, threshold } => {
                self.check_new_owner(owner)?;
                let mut owners = Vec::with_capacity(self.owners.len() + 1);
                owners.push(owner);
                owners.extend_from_slice(&self.owners);
                check_threshold(threshold, owners.len())?;
                Ok(Policy { owners, threshold })
            }
            SafeTx::RemoveOwner {
                prev,
                owner,
                threshold,
            } => {
                let index = self.index_of(owner)?;
                self.check_prev(index, prev)?;
                let mut owners = self.owners.clone();
                owners.remove(index);
                check_threshold(threshold, owners.len())?;
                Ok(Policy { owners, threshold })
            }
            SafeTx::ChangeThreshold { threshold } => {
                check_threshold(threshold, self.owners.len())?;
                Ok(Policy {
                    owners: self.owners.clone(),
                    threshold,
                })
            }
        }
    }

    /// Applies `txs` in order, failing on the first invalid step.
    pub fn apply_all(&self, txs: &[SafeTx]) -> Result<Policy, CustodyError> {
        txs.iter()
            .try_fold(self.clone(), |policy, tx| policy.apply_transaction(tx))
    }

    /// Ordered owner mutations turning `self` into `target`, and the policy
    /// they produce (the target's owners in final on-chain order).
    pub fn safe_transactions(
        &self,
        target: &Policy,
    ) -> Result<(Vec<SafeTx>, Policy), CustodyError> {
        self.validate()?;
        target.validate()?;

        let mut to_add: Vec<Address> = target
            .owners
            .iter()
            .filter(|o| !self.contains(**o))
            .copied()
            .collect();
        let mut to_remove: Vec<Address> = self
            .owners
            .iter()
            .filter(|o| !target.contains(**o))
            .copied()
            .collect();
        to_add.sort_unstable();
        to_remove.sort_unstable();

        let num_swaps = to_add.len().min(to_remove.len());
        let num_adds = to_add.len() - num_swaps;
        let num_removes = to_remove.len() - num_swaps;

        let mut plan = Plan::new(self.clone());

        for (old, new) in to_remove.iter().zip(to_add.iter()) {
            let prev = plan.policy.prev_owner(*old)?;
            plan.push(SafeTx::SwapOwner {
                prev,
                old: *old,
                new: *new,
            })?;
        }

        for owner in &to_add[num_swaps..] {
            let threshold = plan.policy.threshold;
            plan.push(SafeTx::AddOwnerWithThreshold {
                owner: *owner,
                threshold,
            })?;
        }

        for (i, owner) in to_remove.iter().enumerate().skip(num_swaps) {
            let step = (1 + i - num_swaps) as u64;
            let threshold = self.threshold.saturating_sub(step).max(1);
            let prev = plan.policy.prev_owner(*owner)?;
            plan.push(SafeTx::RemoveOwner {
                prev,
                owner: *owner,
                threshold,
            })?;
        }

        if plan.policy.threshold != target.threshold {
            if plan.txs.is_empty() || (num_adds == 0 && num_removes == 0) {
                plan.push(SafeTx::ChangeThreshold {
                    threshold: target.threshold,
                })?;
            } else {
                plan.fold_threshold(target.threshold)?;
            }
        }

        let Plan { policy, txs, .. } = plan;
        tracing::debug!(
            swaps = num_swaps,
            adds = num_adds,
            removes = num_removes,
            transactions = txs.len(),
            "computed owner policy transactions"
        );

        Ok((txs, policy))
    }
}

/// Transactions emitted so far and the policy they lead to.
struct Plan {
    policy: Policy,
    previous: Policy,
    txs: Vec<SafeTx>,
}

impl Plan {
    fn new(policy: Policy) -> Self {
        Self {
            previous: policy.clone(),
            policy,
            txs: Vec::new(),
        }
    }

    fn push(&mut self, tx: SafeTx) -> Result<(), CustodyError> {
        let next = self.policy.apply_transaction(&tx)?;
        self.previous = std::mem::replace(&mut self.policy, next);
        self.txs.push(tx);
        Ok(())
    }

    /// Rewrites the last transaction to also set `threshold`.
    fn fold_threshold(&mut self, threshold: u64) -> Result<(), CustodyError> {
        let last = self
            .txs
            .pop()
            .ok_or_else(|| CustodyError::Invariant("no transaction to fold into".to_owned()))?;
        let folded = last.with_threshold(threshold).ok_or_else(|| {
            CustodyError::Invariant("last transaction carries no threshold".to_owned())
        })?;
        self.policy = self.previous.apply_transaction(&folded)?;
        self.txs.push(folded);
        Ok(())
    }
}

fn check_threshold(threshold: u64, owner_count: usize) -> Result<(), CustodyError> {
    if threshold == 0 || threshold > owner_count as u64 {
        return Err(CustodyError::Invariant(format!(
            "threshold {threshold} outside 1..={owner_count}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x10;
        bytes[19] = n;
        Address::from(bytes)
    }

    #[test]
    fn prev_owner_of_head_is_sentinel() {
        let policy = Policy::new(vec![addr(1), addr(2)], 1).expect("policy");
        assert_eq!(policy.prev_owner(addr(1)).expect("head"), SENTINEL_ADDRESS);
        assert_eq!(policy.prev_owner(addr(2)).expect("second"), addr(1));
        let err = policy.prev_owner(addr(9)).expect_err("absent");
        assert!(matches!(err, CustodyError::NotFound(_)));
    }

    #[test]
    fn swap_rejects_wrong_prev() {
        let policy = Policy::new(vec![addr(1), addr(2)], 1).expect("policy");
        let err = policy
            .apply_transaction(&SafeTx::SwapOwner {
                prev: SENTINEL_ADDRESS,
                old: addr(2),
                new: addr(3),
            })
            .expect_err("prev mismatch");
        assert!(err.to_string().contains("prev owner mismatch"));
    }

    #[test]
    fn add_prepends_and_checks_bounds() {
        let policy = Policy::new(vec![addr(1)], 1).expect("policy");
        let next = policy
            .apply_transaction(&SafeTx::AddOwnerWithThreshold {
                owner: addr(2),
                threshold: 2,
            })
            .expect("add");
        assert_eq!(next.owners, vec![addr(2), addr(1)]);
        assert_eq!(next.threshold, 2);

        let err = policy
            .apply_transaction(&SafeTx::AddOwnerWithThreshold {
                owner: addr(2),
                threshold: 3,
            })
            .expect_err("threshold above owner count");
        assert!(matches!(err, CustodyError::Invariant(_)));
    }

    #[test]
    fn add_rejects_existing_owner() {
        let policy = Policy::new(vec![addr(1)], 1).expect("policy");
        assert!(policy
            .apply_transaction(&SafeTx::AddOwnerWithThreshold {
                owner: addr(1),
                threshold: 1,
            })
            .is_err());
    }

    #[test]
    fn remove_last_owner_is_rejected() {
        let policy = Policy::new(vec![addr(1)], 1).expect("policy");
        assert!(policy
            .apply_transaction(&SafeTx::RemoveOwner {
                prev: SENTINEL_ADDRESS,
                owner: addr(1),
                threshold: 1,
            })
            .is_err());
    }

    #[test]
    fn new_rejects_duplicates_and_bad_threshold() {
        assert!(Policy::new(vec![addr(1), addr(1)], 1).is_err());
        assert!(Policy::new(vec![addr(1)], 0).is_err());
        assert!(Policy::new(vec![addr(1)], 2).is_err());
        assert!(Policy::new(vec![], 1).is_err());
    }

    #[test]
    fn fold_replaces_last_remove_threshold() {
        let current = Policy::new(vec![addr(1), addr(2), addr(3)], 3).expect("current");
        let target = Policy::new(vec![addr(1), addr(2)], 1).expect("target");
        let (txs, result) = current.safe_transactions(&target).expect("plan");
        assert_eq!(
            txs,
            vec![SafeTx::RemoveOwner {
                prev: addr(2),
                owner: addr(3),
                threshold: 1,
            }]
        );
        assert_eq!(result, target);
    }

    #[test]
    fn fold_replaces_last_add_threshold() {
        let current = Policy::new(vec![addr(1)], 1).expect("current");
        let target = Policy::new(vec![addr(1), addr(2), addr(3)], 3).expect("target");
        let (txs, result) = current.safe_transactions(&target).expect("plan");
        assert_eq!(
            txs,
            vec![
                SafeTx::AddOwnerWithThreshold {
                    owner: addr(2),
                    threshold: 1,
                },
                SafeTx::AddOwnerWithThreshold {
                    owner: addr(3),
                    threshold: 3,
                },
            ]
        );
        assert_eq!(result.owners, vec![addr(3), addr(2), addr(1)]);
        assert_eq!(result.threshold, 3);
    }

    #[test]
    fn serde_uses_tagged_camel_case() {
        let tx = SafeTx::AddOwnerWithThreshold {
            owner: addr(1),
            threshold: 2,
        };
        let json = serde_json::to_value(tx).expect("serialize");
        assert_eq!(json["type"], "addOwnerWithThreshold");
        assert_eq!(json["threshold"], 2);
        let back: SafeTx = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, tx);
    }
}
