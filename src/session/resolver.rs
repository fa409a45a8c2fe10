// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Safe selection policy.
//!
//! Pure derivation, re-run whenever the session, the owned-Safe list, or the
//! provider changes. The async counterfactual lookup stays in the session
//! manager; this module only decides which path applies.

/// Outcome of the selection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafeSelectionPolicy {
    /// No provider: nothing can be selected.
    NoSelection,
    /// An owned Safe (stored preference or first of the list).
    Existing(String),
    /// No owned Safes: ask the account-abstraction client for the
    /// counterfactual address.
    Counterfactual,
}

/// Decide how the selected Safe is derived.
///
/// Order: no provider wins, then the stored preference, then the first owned
/// Safe, then the counterfactual path.
pub fn select_safe(
    provider_present: bool,
    safes: &[String],
    stored_preference: Option<&str>,
) -> SafeSelectionPolicy {
    if !provider_present {
        return SafeSelectionPolicy::NoSelection;
    }

    if safes.is_empty() {
        return SafeSelectionPolicy::Counterfactual;
    }

    let selected = stored_preference
        .filter(|stored| !stored.is_empty())
        .unwrap_or(&safes[0]);

    SafeSelectionPolicy::Existing(selected.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFE_A: &str = "0xaaaa000000000000000000000000000000000001";
    const SAFE_B: &str = "0xbbbb000000000000000000000000000000000002";

    fn safes(addrs: &[&str]) -> Vec<String> {
        addrs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_provider_means_no_selection() {
        assert_eq!(
            select_safe(false, &safes(&[SAFE_A]), Some(SAFE_B)),
            SafeSelectionPolicy::NoSelection
        );
    }

    #[test]
    fn first_owned_safe_without_stored_preference() {
        assert_eq!(
            select_safe(true, &safes(&[SAFE_A, SAFE_B]), None),
            SafeSelectionPolicy::Existing(SAFE_A.to_string())
        );
    }

    #[test]
    fn stored_preference_wins_over_first_entry() {
        assert_eq!(
            select_safe(true, &safes(&[SAFE_A, SAFE_B]), Some(SAFE_B)),
            SafeSelectionPolicy::Existing(SAFE_B.to_string())
        );
    }

    #[test]
    fn empty_stored_preference_is_ignored() {
        assert_eq!(
            select_safe(true, &safes(&[SAFE_A]), Some("")),
            SafeSelectionPolicy::Existing(SAFE_A.to_string())
        );
    }

    #[test]
    fn empty_safe_list_goes_counterfactual() {
        assert_eq!(
            select_safe(true, &[], None),
            SafeSelectionPolicy::Counterfactual
        );
        // A stored preference for a Safe the user no longer owns does not
        // override the counterfactual path.
        assert_eq!(
            select_safe(true, &[], Some(SAFE_A)),
            SafeSelectionPolicy::Counterfactual
        );
    }
}
