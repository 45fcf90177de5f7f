use serde::Deserialize;

use stockroom_core::{DomainError, DomainResult, Entity, ItemId, ValueObject};

/// One row of the inventory table.
///
/// Quantities are unsigned: a record that exists is always valid. Raw user
/// input goes through [`NewItem`] or [`ItemPatch`] and is validated on the way in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    id: ItemId,
    name: String,
    units_sold: u64,
    units_on_hand: u64,
    reorder_point: u64,
    description: String,
}

impl InventoryItem {
    /// Rebuild an item from stored column values (e.g. a database row).
    pub fn restore(
        id: ItemId,
        name: impl Into<String>,
        units_sold: i64,
        units_on_hand: i64,
        reorder_point: i64,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validate_name(name.into())?,
            units_sold: validate_quantity("units_sold", units_sold)?,
            units_on_hand: validate_quantity("units_on_hand", units_on_hand)?,
            reorder_point: validate_quantity("reorder_point", reorder_point)?,
            description: description.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units_sold(&self) -> u64 {
        self.units_sold
    }

    pub fn units_on_hand(&self) -> u64 {
        self.units_on_hand
    }

    pub fn reorder_point(&self) -> u64 {
        self.reorder_point
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Stock has fallen strictly below the reorder point.
    pub fn needs_reorder(&self) -> bool {
        self.units_on_hand < self.reorder_point
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

/// Payload of an insertion. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub units_sold: i64,
    #[serde(default)]
    pub units_on_hand: i64,
    #[serde(default)]
    pub reorder_point: i64,
    #[serde(default)]
    pub description: String,
}

impl ValueObject for NewItem {}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units_sold: 0,
            units_on_hand: 0,
            reorder_point: 0,
            description: String::new(),
        }
    }

    pub fn units_sold(mut self, units: i64) -> Self {
        self.units_sold = units;
        self
    }

    pub fn units_on_hand(mut self, units: i64) -> Self {
        self.units_on_hand = units;
        self
    }

    pub fn reorder_point(mut self, units: i64) -> Self {
        self.reorder_point = units;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Validate the payload and materialize it under `id`.
    pub fn into_item(self, id: ItemId) -> DomainResult<InventoryItem> {
        InventoryItem::restore(
            id,
            self.name,
            self.units_sold,
            self.units_on_hand,
            self.reorder_point,
            self.description,
        )
    }
}

/// Partial update of an existing item.
///
/// `None` leaves the field untouched; only named fields are overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub units_sold: Option<i64>,
    #[serde(default)]
    pub units_on_hand: Option<i64>,
    #[serde(default)]
    pub reorder_point: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ValueObject for ItemPatch {}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn units_sold(mut self, units: i64) -> Self {
        self.units_sold = Some(units);
        self
    }

    pub fn units_on_hand(mut self, units: i64) -> Self {
        self.units_on_hand = Some(units);
        self
    }

    pub fn reorder_point(mut self, units: i64) -> Self {
        self.reorder_point = Some(units);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Produce the updated item. The input is never modified.
    pub fn apply_to(&self, item: &InventoryItem) -> DomainResult<InventoryItem> {
        let mut updated = item.clone();
        if let Some(name) = &self.name {
            updated.name = validate_name(name.clone())?;
        }
        if let Some(units) = self.units_sold {
            updated.units_sold = validate_quantity("units_sold", units)?;
        }
        if let Some(units) = self.units_on_hand {
            updated.units_on_hand = validate_quantity("units_on_hand", units)?;
        }
        if let Some(units) = self.reorder_point {
            updated.reorder_point = validate_quantity("reorder_point", units)?;
        }
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        Ok(updated)
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name)
}

fn validate_quantity(field: &'static str, raw: i64) -> DomainResult<u64> {
    u64::try_from(raw)
        .map_err(|_| DomainError::validation(format!("{field} cannot be negative (got {raw})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> InventoryItem {
        NewItem::named("Widget")
            .units_sold(3)
            .units_on_hand(5)
            .reorder_point(10)
            .description("A widget")
            .into_item(ItemId::new(1))
            .unwrap()
    }

    #[test]
    fn patch_only_touches_named_fields() {
        let item = widget();
        let updated = ItemPatch::new().units_on_hand(15).apply_to(&item).unwrap();

        assert_eq!(updated.units_on_hand(), 15);
        assert_eq!(updated.name(), "Widget");
        assert_eq!(updated.units_sold(), 3);
        assert_eq!(updated.reorder_point(), 10);
        assert_eq!(updated.description(), "A widget");
        assert_eq!(updated.id(), item.id());
    }

    #[test]
    fn patch_rejects_negative_quantities_and_blank_names() {
        let item = widget();

        let err = ItemPatch::new().units_on_hand(-1).apply_to(&item).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("units_on_hand")));

        let err = ItemPatch::new().name("   ").apply_to(&item).unwrap_err();
        assert_eq!(err, DomainError::validation("name cannot be empty"));
    }

    #[test]
    fn empty_patch_is_identity() {
        let item = widget();
        let patch = ItemPatch::new();
        assert!(patch.is_empty());
        assert_eq!(patch.apply_to(&item).unwrap(), item);
    }

    #[test]
    fn needs_reorder_is_strict() {
        let item = widget();
        assert!(item.needs_reorder());

        let at_threshold = ItemPatch::new().units_on_hand(10).apply_to(&item).unwrap();
        assert!(!at_threshold.needs_reorder());
    }

    #[test]
    fn new_item_defaults_from_json() {
        let new: NewItem = serde_json::from_str(r#"{"name":"Gadget","units_on_hand":2}"#).unwrap();
        assert_eq!(new, NewItem::named("Gadget").units_on_hand(2));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<ItemPatch>(r#"{"id":4}"#).is_err());
        assert!(serde_json::from_str::<ItemPatch>(r#"{"cost":1.5}"#).is_err());
        assert!(serde_json::from_str::<NewItem>(r#"{"name":"x","id":9}"#).is_err());
    }

    #[test]
    fn null_patch_field_means_unchanged() {
        let patch: ItemPatch =
            serde_json::from_str(r#"{"description":null,"units_on_hand":1}"#).unwrap();
        let updated = patch.apply_to(&widget()).unwrap();
        assert_eq!(updated.description(), "A widget");
        assert_eq!(updated.units_on_hand(), 1);
    }
}
