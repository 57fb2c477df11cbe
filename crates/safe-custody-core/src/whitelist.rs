//! Guard whitelist diffing and guard contract resolution.

use std::collections::{HashMap, HashSet};

use alloy::primitives::Address;

use crate::constants::{
    GuardContract, CENSO_GUARD, CENSO_TRANSFERS_ONLY_GUARD,
    CENSO_TRANSFERS_ONLY_WHITELISTING_GUARD, CENSO_WHITELISTING_GUARD, DEFAULT_GUARD_NAME,
    SENTINEL_ADDRESS,
};
use crate::domain::{EvmDestination, WhitelistInstruction, WhitelistSettings};
use crate::ports::CustodyError;

const GUARD_SETTINGS: [(WhitelistSettings, &str); 4] = [
    (WhitelistSettings::new(false, true), CENSO_GUARD),
    (WhitelistSettings::new(false, false), CENSO_TRANSFERS_ONLY_GUARD),
    (WhitelistSettings::new(true, true), CENSO_WHITELISTING_GUARD),
    (
        WhitelistSettings::new(true, false),
        CENSO_TRANSFERS_ONLY_WHITELISTING_GUARD,
    ),
];

/// A run of consecutive whitelist entries to drop, anchored at `prev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RemovalRun {
    prev: Address,
    start: usize,
    count: u64,
}

/// Diffs the guard's current whitelist (in linked-list order) against the
/// desired destinations.
#[derive(Debug, Clone)]
pub struct WhitelistDiff<'a> {
    current: &'a [Address],
    target: &'a [EvmDestination],
}

impl<'a> WhitelistDiff<'a> {
    pub fn new(current: &'a [Address], target: &'a [EvmDestination]) -> Self {
        Self { current, target }
    }

    /// Removal instructions first, then additions.
    pub fn all_changes(&self) -> Vec<WhitelistInstruction> {
        let mut changes = self.removals();
        changes.extend(self.additions());
        tracing::debug!(
            current = self.current.len(),
            target = self.target.len(),
            instructions = changes.len(),
            "computed whitelist changes"
        );
        changes
    }

    pub fn additions(&self) -> Vec<WhitelistInstruction> {
        let current: HashSet<&Address> = self.current.iter().collect();
        let by_address: HashMap<Address, &EvmDestination> =
            self.target.iter().map(|d| (d.address, d)).collect();
        let mut added: Vec<Address> = by_address
            .keys()
            .filter(|address| !current.contains(address))
            .copied()
            .collect();
        added.sort_unstable();
        added
            .iter()
            .filter_map(|address| by_address.get(address))
            .map(|destination| WhitelistInstruction::add(destination))
            .collect()
    }

    pub fn removals(&self) -> Vec<WhitelistInstruction> {
        self.removal_runs()
            .into_iter()
            .map(|run| WhitelistInstruction::remove_run(run.count, run.prev))
            .collect()
    }

    fn removal_runs(&self) -> Vec<RemovalRun> {
        let target: HashSet<Address> = self.target.iter().map(|d| d.address).collect();
        let mut runs: Vec<RemovalRun> = Vec::new();
        for (index, address) in self.current.iter().enumerate() {
            if target.contains(address) {
                continue;
            }
            match runs.last_mut() {
                Some(run) if run.start + run.count as usize == index => run.count += 1,
                _ => runs.push(RemovalRun {
                    prev: if index == 0 {
                        SENTINEL_ADDRESS
                    } else {
                        self.current[index - 1]
                    },
                    start: index,
                    count: 1,
                }),
            }
        }
        runs
    }
}

/// Convenience wrapper over [`WhitelistDiff::all_changes`].
pub fn all_changes(current: &[Address], target: &[EvmDestination]) -> Vec<WhitelistInstruction> {
    WhitelistDiff::new(current, target).all_changes()
}

pub fn current_settings_for_guard_name(name: &str) -> Result<WhitelistSettings, CustodyError> {
    GUARD_SETTINGS
        .iter()
        .find(|(_, guard)| *guard == name)
        .map(|(settings, _)| *settings)
        .ok_or_else(|| CustodyError::UnknownGuard(name.to_owned()))
}

pub fn guard_name_for_target_settings(settings: WhitelistSettings) -> &'static str {
    GUARD_SETTINGS
        .iter()
        .find(|(s, _)| *s == settings)
        .map(|(_, name)| *name)
        .unwrap_or(DEFAULT_GUARD_NAME)
}

/// Address of the guard matching the requested settings.
///
/// Flags left as `None` keep their current value. The current guard address
/// is returned when no deployed guard matches.
pub fn target_guard_address(
    current_guard: Address,
    guard_addresses: &[GuardContract],
    whitelist_enabled: Option<bool>,
    dapps_enabled: Option<bool>,
) -> Address {
    let current_name = guard_addresses
        .iter()
        .find(|guard| guard.address == current_guard)
        .map(|guard| guard.name.as_str())
        .unwrap_or(DEFAULT_GUARD_NAME);
    let current = current_settings_for_guard_name(current_name).unwrap_or_else(|_| {
        tracing::warn!(guard = current_name, "unrecognized guard, assuming default");
        WhitelistSettings::new(false, true)
    });
    let target = WhitelistSettings {
        whitelist_enabled: whitelist_enabled.unwrap_or(current.whitelist_enabled),
        dapps_enabled: dapps_enabled.unwrap_or(current.dapps_enabled),
    };
    let target_name = guard_name_for_target_settings(target);
    guard_addresses
        .iter()
        .find(|guard| guard.name == target_name)
        .map(|guard| guard.address)
        .unwrap_or(current_guard)
}
