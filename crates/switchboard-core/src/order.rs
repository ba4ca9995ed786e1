//! Provider preference order.
//!
//! The fallback order is the global preference used when a request names
//! no provider, or names one that is not registered. Planning a request's
//! try-order is pure: it only needs to know which providers are registered.

use serde::{Deserialize, Serialize};

use crate::types::ProviderId;

/// Ordered global provider preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FallbackOrder(Vec<ProviderId>);

impl Default for FallbackOrder {
    /// Paid providers first, the free-tier provider last.
    fn default() -> Self {
        Self(vec![
            ProviderId::OpenAi,
            ProviderId::Anthropic,
            ProviderId::Google,
            ProviderId::HuggingFace,
        ])
    }
}

impl FallbackOrder {
    /// Create an order from an explicit sequence. Duplicates are kept here
    /// and dropped when a try-order is planned.
    pub fn new(providers: impl IntoIterator<Item = ProviderId>) -> Self {
        Self(providers.into_iter().collect())
    }

    pub fn providers(&self) -> &[ProviderId] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plan the candidates for one request.
    ///
    /// The preferred provider goes first when it is registered. The rest of
    /// the registered providers follow in fallback order. Each provider
    /// appears at most once, and unregistered providers never appear.
    pub fn try_order<F>(&self, preferred: Option<ProviderId>, is_registered: F) -> Vec<ProviderId>
    where
        F: Fn(ProviderId) -> bool,
    {
        let mut plan = Vec::with_capacity(self.0.len() + 1);

        if let Some(id) = preferred {
            if is_registered(id) {
                plan.push(id);
            }
        }

        for &id in &self.0 {
            if is_registered(id) && !plan.contains(&id) {
                plan.push(id);
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    use ProviderId::*;

    #[test]
    fn test_default_order() {
        assert_eq!(
            FallbackOrder::default().providers(),
            &[OpenAi, Anthropic, Google, HuggingFace]
        );
    }

    #[test]
    fn test_preferred_goes_first() {
        let order = FallbackOrder::default();
        let plan = order.try_order(Some(Google), |_| true);
        assert_eq!(plan, vec![Google, OpenAi, Anthropic, HuggingFace]);
    }

    #[test]
    fn test_unregistered_preference_is_ignored() {
        let order = FallbackOrder::default();
        let registered = [Anthropic, HuggingFace];
        let plan = order.try_order(Some(OpenAi), |id| registered.contains(&id));
        assert_eq!(plan, vec![Anthropic, HuggingFace]);
    }

    #[test]
    fn test_duplicates_in_order_are_dropped() {
        let order = FallbackOrder::new([Anthropic, OpenAi, Anthropic, HuggingFace, OpenAi]);
        let plan = order.try_order(None, |_| true);
        assert_eq!(plan, vec![Anthropic, OpenAi, HuggingFace]);
    }

    #[test]
    fn test_empty_registry_plans_nothing() {
        let plan = FallbackOrder::default().try_order(Some(OpenAi), |_| false);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_preferred_outside_order_still_tried_first() {
        let order = FallbackOrder::new([OpenAi]);
        let plan = order.try_order(Some(HuggingFace), |_| true);
        assert_eq!(plan, vec![HuggingFace, OpenAi]);
    }

    #[test]
    fn test_deserializes_from_list() {
        let order: FallbackOrder = serde_json::from_str(r#"["google", "openai"]"#).unwrap();
        assert_eq!(order.providers(), &[Google, OpenAi]);
    }

    fn provider() -> impl Strategy<Value = ProviderId> {
        prop::sample::select(ProviderId::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_try_order_invariants(
            order in prop::collection::vec(provider(), 0..8),
            registered in prop::collection::btree_set(provider(), 0..=4),
            preferred in prop::option::of(provider()),
        ) {
            let order = FallbackOrder::new(order);
            let plan = order.try_order(preferred, |id| registered.contains(&id));

            // No duplicates, nothing unregistered
            let unique: BTreeSet<_> = plan.iter().copied().collect();
            prop_assert_eq!(unique.len(), plan.len());
            prop_assert!(plan.iter().all(|id| registered.contains(id)));

            // Registered preference always leads
            if let Some(id) = preferred.filter(|id| registered.contains(id)) {
                prop_assert_eq!(plan.first().copied(), Some(id));
            }

            // Everything after the preference follows fallback order
            let skip = usize::from(preferred.is_some_and(|id| registered.contains(&id)));
            let expected: Vec<ProviderId> = {
                let mut seen = BTreeSet::new();
                if skip == 1 {
                    seen.insert(plan[0]);
                }
                order
                    .providers()
                    .iter()
                    .copied()
                    .filter(|id| registered.contains(id) && seen.insert(*id))
                    .collect()
            };
            prop_assert_eq!(&plan[skip..], expected.as_slice());
        }
    }
}
