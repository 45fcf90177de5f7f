use std::collections::HashSet;

use stockroom_core::{DomainError, DomainResult, Entity, ItemId};

use crate::changeset::Changeset;
use crate::item::{InventoryItem, ItemPatch};
use crate::report::{ApplyReport, RowRef};

/// Ordered, read-only view of every item at one point in time.
///
/// Items iterate in insertion order, which is also ascending id order since
/// ids are only ever handed out in increasing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    items: Vec<InventoryItem>,
    version: u64,
}

/// Row-level writes needed to move the backing table from one snapshot to the next.
///
/// Executed as updates, then inserts, then deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    pub updates: Vec<InventoryItem>,
    pub inserts: Vec<InventoryItem>,
    pub deletes: Vec<ItemId>,
}

impl WriteBatch {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inserts.is_empty() && self.deletes.is_empty()
    }
}

/// Result of planning a changeset against a snapshot. Nothing has been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub snapshot: Snapshot,
    pub batch: WriteBatch,
    pub report: ApplyReport,
    /// First id still free after this plan's insertions.
    pub next_id: ItemId,
}

impl Snapshot {
    /// Build a snapshot from stored rows. Rows are ordered by id.
    pub fn from_items(mut items: Vec<InventoryItem>, version: u64) -> DomainResult<Self> {
        items.sort_by_key(|item| item.id());

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(DomainError::validation(format!("duplicate item id {}", item.id())));
            }
        }

        Ok(Self { items, version })
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.iter()
    }

    pub fn get(&self, id: ItemId) -> Option<&InventoryItem> {
        self.position(id).map(|idx| &self.items[idx])
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of committed applies that produced writes.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn max_id(&self) -> Option<ItemId> {
        self.items.iter().map(Entity::id).max()
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Compute the snapshot that results from `changeset`.
    ///
    /// Edits run first, then insertions, then deletions. Rows that reference
    /// unknown ids or carry invalid values are skipped and reported; the rest
    /// of the batch still applies. Insertions take ids from `next_id` upward.
    /// Deletions only match items present in `self`, so a row inserted by
    /// the same changeset cannot be deleted by it. Rows dropped while parsing
    /// the changeset are carried into the report unchanged.
    ///
    /// `report.edited` lists only items whose stored values changed and that
    /// still exist afterwards.
    pub fn plan(&self, changeset: &Changeset, next_id: ItemId) -> Plan {
        let mut items = self.items.clone();
        let mut batch = WriteBatch::default();
        let mut report = ApplyReport {
            rejected: changeset.rejected().to_vec(),
            ..ApplyReport::default()
        };
        let mut next_id = next_id;

        for (&id, patch) in &changeset.edited {
            let Some(idx) = items.iter().position(|item| item.id() == id) else {
                report.reject(RowRef::Existing(id), DomainError::not_found(id));
                continue;
            };
            match patch.apply_to(&items[idx]) {
                Ok(updated) if updated == items[idx] => {}
                Ok(updated) => {
                    items[idx] = updated.clone();
                    batch.updates.push(updated);
                    report.edited.push(id);
                }
                Err(err) => report.reject(RowRef::Existing(id), err),
            }
        }

        let unparsed: HashSet<usize> = changeset
            .rejected()
            .iter()
            .filter_map(|r| match r.row {
                RowRef::Added(index) => Some(index),
                _ => None,
            })
            .collect();
        let positions = (0..).filter(|index| !unparsed.contains(index));

        for (index, new_item) in positions.zip(&changeset.added) {
            match new_item.clone().into_item(next_id) {
                Ok(item) => {
                    report.inserted.push(next_id);
                    batch.inserts.push(item.clone());
                    items.push(item);
                    next_id = next_id.next();
                }
                Err(err) => report.reject(RowRef::Added(index), err),
            }
        }

        for &id in &changeset.deleted {
            if !self.contains(id) {
                report.reject(RowRef::Existing(id), DomainError::not_found(id));
                continue;
            }
            items.retain(|item| item.id() != id);
            batch.updates.retain(|item| item.id() != id);
            report.edited.retain(|edited| *edited != id);
            batch.deletes.push(id);
            report.deleted.push(id);
        }

        let version = if batch.is_empty() {
            self.version
        } else {
            self.version + 1
        };

        Plan {
            snapshot: Snapshot { items, version },
            batch,
            report,
            next_id,
        }
    }

    /// Changeset recording the sale of `quantity` units of `id`.
    pub fn sale(&self, id: ItemId, quantity: i64) -> DomainResult<Changeset> {
        let item = self.get(id).ok_or(DomainError::not_found(id))?;
        if quantity <= 0 {
            return Err(DomainError::validation("sale quantity must be positive"));
        }
        let quantity = quantity.unsigned_abs();
        if quantity > item.units_on_hand() {
            return Err(DomainError::validation(format!(
                "cannot sell {quantity} units of {}: only {} on hand",
                item.name(),
                item.units_on_hand()
            )));
        }

        let on_hand = item.units_on_hand() - quantity;
        let sold = item.units_sold().saturating_add(quantity);
        let patch = ItemPatch::new()
            .units_on_hand(to_signed(on_hand)?)
            .units_sold(to_signed(sold)?);
        Ok(Changeset::new().edit(id, patch))
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a InventoryItem;
    type IntoIter = core::slice::Iter<'a, InventoryItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn to_signed(units: u64) -> DomainResult<i64> {
    i64::try_from(units).map_err(|_| DomainError::validation("quantity out of range"))
}
