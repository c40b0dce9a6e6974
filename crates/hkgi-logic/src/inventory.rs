//! Inventory ledger - all-or-nothing debits and credits over item counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kinds::ItemKind;

/// Item counts. A missing key means zero; zero entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeMap<ItemKind, u64>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, item: ItemKind) -> u64 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    pub fn has(&self, item: ItemKind, qty: u64) -> bool {
        self.count(item) >= qty
    }

    /// Debit every `(item, qty)` in `costs`, or nothing at all.
    ///
    /// Returns `false` without touching the inventory if any single line is
    /// short.
    pub fn try_debit<'a, I>(&mut self, costs: I) -> bool
    where
        I: IntoIterator<Item = (&'a ItemKind, &'a u64)>,
    {
        // Duplicate lines in `costs` must be checked against their sum.
        let mut totals: BTreeMap<ItemKind, u64> = BTreeMap::new();
        for (item, qty) in costs {
            let entry = totals.entry(*item).or_insert(0);
            *entry = entry.saturating_add(*qty);
        }
        if totals.iter().any(|(item, qty)| !self.has(*item, *qty)) {
            return false;
        }

        for (item, qty) in totals {
            if qty == 0 {
                continue;
            }
            if let Some(count) = self.items.get_mut(&item) {
                *count -= qty;
                if *count == 0 {
                    self.items.remove(&item);
                }
            }
        }
        true
    }

    /// Convenience for a single-line debit.
    pub fn try_debit_one(&mut self, item: ItemKind, qty: u64) -> bool {
        self.try_debit([(&item, &qty)])
    }

    /// Add every `(item, qty)` in `gains`. Never fails.
    pub fn credit<'a, I>(&mut self, gains: I)
    where
        I: IntoIterator<Item = (&'a ItemKind, &'a u64)>,
    {
        for (item, qty) in gains {
            self.credit_one(*item, *qty);
        }
    }

    pub fn credit_one(&mut self, item: ItemKind, qty: u64) {
        if qty == 0 {
            return;
        }
        let entry = self.items.entry(item).or_insert(0);
        *entry = entry.saturating_add(qty);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemKind, &u64)> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(ItemKind, u64)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (ItemKind, u64)>>(iter: T) -> Self {
        let mut inv = Inventory::new();
        for (item, qty) in iter {
            inv.credit_one(item, qty);
        }
        inv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Family, Tier};

    fn starter() -> Inventory {
        [
            (ItemKind::Seed(Family::Bbc), 2),
            (ItemKind::Essence(Family::Hvv), 5),
            (ItemKind::Powder(Tier::T1), 1),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_debit_success() {
        let mut inv = starter();
        let costs = BTreeMap::from([
            (ItemKind::Seed(Family::Bbc), 1),
            (ItemKind::Essence(Family::Hvv), 5),
        ]);
        assert!(inv.try_debit(&costs));
        assert_eq!(inv.count(ItemKind::Seed(Family::Bbc)), 1);
        assert_eq!(inv.count(ItemKind::Essence(Family::Hvv)), 0);
        assert_eq!(inv.iter().count(), 2, "emptied lines are dropped");
    }

    #[test]
    fn test_debit_is_all_or_nothing() {
        let mut inv = starter();
        let before = inv.clone();
        let costs = BTreeMap::from([
            (ItemKind::Seed(Family::Bbc), 1),
            (ItemKind::Essence(Family::Hvv), 6),
        ]);
        assert!(!inv.try_debit(&costs));
        assert_eq!(inv, before);
    }

    #[test]
    fn test_debit_missing_item() {
        let mut inv = starter();
        assert!(!inv.try_debit_one(ItemKind::LandDeed, 1));
        assert!(inv.try_debit_one(ItemKind::LandDeed, 0));
    }

    #[test]
    fn test_duplicate_lines_are_summed() {
        let mut inv = starter();
        let bbc = ItemKind::Seed(Family::Bbc);
        let costs = [(&bbc, &2u64), (&bbc, &1u64)];
        assert!(!inv.try_debit(costs));
        assert_eq!(inv.count(bbc), 2);
    }

    #[test]
    fn test_credit_initializes_missing() {
        let mut inv = Inventory::new();
        inv.credit(&BTreeMap::from([(ItemKind::NestEgg, 1)]));
        inv.credit_one(ItemKind::NestEgg, 2);
        assert_eq!(inv.count(ItemKind::NestEgg), 3);
    }

    #[test]
    fn test_credit_saturates() {
        let mut inv = Inventory::new();
        inv.credit_one(ItemKind::LandDeed, u64::MAX);
        inv.credit_one(ItemKind::LandDeed, 10);
        assert_eq!(inv.count(ItemKind::LandDeed), u64::MAX);
    }
}
