//! Low-stock evaluation and sales ranking over a snapshot.
//!
//! Everything here is a pure function of its input snapshot.

use crate::item::InventoryItem;
use crate::snapshot::Snapshot;

/// Finds items whose stock has fallen below their reorder point.
#[derive(Debug, Copy, Clone, Default)]
pub struct ReorderAnalyzer;

impl ReorderAnalyzer {
    /// Names of every item with `units_on_hand < reorder_point`, in snapshot order.
    pub fn evaluate(snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .iter()
            .filter(|item| item.needs_reorder())
            .map(|item| item.name().to_owned())
            .collect()
    }
}

/// Restocking warning shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderAlert {
    items: Vec<String>,
}

impl ReorderAlert {
    /// `None` when nothing needs reordering.
    pub fn from_snapshot(snapshot: &Snapshot) -> Option<Self> {
        let items = ReorderAnalyzer::evaluate(snapshot);
        if items.is_empty() {
            None
        } else {
            Some(Self { items })
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

impl core::fmt::Display for ReorderAlert {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "We're running dangerously low on the items below:")?;
        for name in &self.items {
            write!(f, "\n* {name}")?;
        }
        Ok(())
    }
}

/// Items ordered by units sold, highest first. Ties keep snapshot order.
pub fn best_sellers(snapshot: &Snapshot) -> Vec<&InventoryItem> {
    let mut ranked: Vec<_> = snapshot.iter().collect();
    ranked.sort_by(|a, b| b.units_sold().cmp(&a.units_sold()));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewItem;
    use stockroom_core::ItemId;

    fn snapshot(rows: &[(&str, i64, i64, i64)]) -> Snapshot {
        let items = rows
            .iter()
            .enumerate()
            .map(|(i, (name, sold, on_hand, reorder))| {
                NewItem::named(*name)
                    .units_sold(*sold)
                    .units_on_hand(*on_hand)
                    .reorder_point(*reorder)
                    .into_item(ItemId::new(i as u64 + 1))
                    .unwrap()
            })
            .collect();
        Snapshot::from_items(items, 0).unwrap()
    }

    #[test]
    fn flags_items_strictly_below_reorder_point() {
        let snap = snapshot(&[
            ("Widget", 0, 5, 10),
            ("Exact", 0, 10, 10),
            ("Plenty", 0, 20, 10),
            ("Empty", 0, 0, 1),
        ]);
        assert_eq!(ReorderAnalyzer::evaluate(&snap), vec!["Widget", "Empty"]);
    }

    #[test]
    fn nothing_low_yields_empty_list_and_no_alert() {
        let snap = snapshot(&[("Gadget", 0, 2, 1)]);
        assert!(ReorderAnalyzer::evaluate(&snap).is_empty());
        assert!(ReorderAlert::from_snapshot(&snap).is_none());
        assert!(ReorderAnalyzer::evaluate(&Snapshot::default()).is_empty());
    }

    #[test]
    fn alert_lists_each_low_item() {
        let snap = snapshot(&[("Soda (355ml)", 93, 8, 10), ("Juice", 1, 9, 5), ("Candy Bar", 6, 2, 15)]);
        let alert = ReorderAlert::from_snapshot(&snap).unwrap();
        assert_eq!(alert.items(), ["Soda (355ml)", "Candy Bar"]);
        assert_eq!(
            alert.to_string(),
            "We're running dangerously low on the items below:\n* Soda (355ml)\n* Candy Bar"
        );
    }

    #[test]
    fn best_sellers_rank_by_units_sold() {
        let snap = snapshot(&[("a", 3, 0, 0), ("b", 9, 0, 0), ("c", 3, 0, 0), ("d", 11, 0, 0)]);
        let names: Vec<_> = best_sellers(&snap).into_iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["d", "b", "a", "c"]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: evaluate is deterministic and leaves its input untouched.
            #[test]
            fn evaluate_is_pure(rows in prop::collection::vec((0i64..30, 0i64..30), 0..20)) {
                let named: Vec<_> = rows
                    .iter()
                    .enumerate()
                    .map(|(i, (on_hand, reorder))| (format!("item-{i}"), *on_hand, *reorder))
                    .collect();
                let borrowed: Vec<_> = named
                    .iter()
                    .map(|(n, on_hand, reorder)| (n.as_str(), 0, *on_hand, *reorder))
                    .collect();
                let snap = snapshot(&borrowed);
                let before = snap.clone();

                let first = ReorderAnalyzer::evaluate(&snap);
                let second = ReorderAnalyzer::evaluate(&snap);

                prop_assert_eq!(&first, &second);
                prop_assert_eq!(&snap, &before);
                let expected = rows.iter().filter(|(on_hand, reorder)| on_hand < reorder).count();
                prop_assert_eq!(first.len(), expected);
            }
        }
    }
}
