use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use stockroom_core::{DomainError, DomainResult, ItemId};

use crate::item::{ItemPatch, NewItem};
use crate::report::{RowRef, RowRejection};

/// A batch of proposed edits, insertions and deletions.
///
/// Built by the caller from user interaction and consumed by exactly one
/// apply. Edits are keyed by the id of an existing row; insertions carry no
/// id; deletions name existing rows only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub edited: BTreeMap<ItemId, ItemPatch>,
    pub added: Vec<NewItem>,
    pub deleted: BTreeSet<ItemId>,
    rejected: Vec<RowRejection>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a changeset document:
    /// `{"edited": {"<id>": {..}}, "added": [{..}], "deleted": [<id>, ..]}`.
    ///
    /// A row with an unknown field, a wrongly typed value or a malformed id
    /// is kept out of the changeset and carried as a validation rejection,
    /// so the remaining rows still apply. Only a document that is not JSON,
    /// or has an unknown section or a section of the wrong shape, fails as a whole.
    pub fn from_json(doc: &str) -> DomainResult<Self> {
        let value: Value = serde_json::from_str(doc)
            .map_err(|e| DomainError::validation(format!("changeset is not valid JSON: {e}")))?;
        let Value::Object(sections) = value else {
            return Err(DomainError::validation("changeset must be a JSON object"));
        };

        let mut changeset = Self::new();
        for (section, body) in sections {
            match section.as_str() {
                "edited" => changeset.parse_edited(body)?,
                "added" => changeset.parse_added(body)?,
                "deleted" => changeset.parse_deleted(body)?,
                other => {
                    return Err(DomainError::validation(format!(
                        "unknown changeset section '{other}'"
                    )));
                }
            }
        }
        Ok(changeset)
    }

    fn parse_edited(&mut self, body: Value) -> DomainResult<()> {
        let rows = match body {
            Value::Null => return Ok(()),
            Value::Object(rows) => rows,
            _ => return Err(DomainError::validation("'edited' must map item ids to updates")),
        };

        for (key, row) in rows {
            let id = match key.parse::<ItemId>() {
                Ok(id) => id,
                Err(err) => {
                    self.reject(RowRef::Malformed(key), err);
                    continue;
                }
            };
            match serde_json::from_value::<ItemPatch>(row) {
                Ok(patch) => {
                    self.edited.insert(id, patch);
                }
                Err(e) => self.reject(
                    RowRef::Existing(id),
                    DomainError::validation(format!("invalid edit: {e}")),
                ),
            }
        }
        Ok(())
    }

    fn parse_added(&mut self, body: Value) -> DomainResult<()> {
        let rows = match body {
            Value::Null => return Ok(()),
            Value::Array(rows) => rows,
            _ => return Err(DomainError::validation("'added' must be a list of items")),
        };

        for (index, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<NewItem>(row) {
                Ok(item) => self.added.push(item),
                Err(e) => self.reject(
                    RowRef::Added(index),
                    DomainError::validation(format!("invalid item: {e}")),
                ),
            }
        }
        Ok(())
    }

    fn parse_deleted(&mut self, body: Value) -> DomainResult<()> {
        let entries = match body {
            Value::Null => return Ok(()),
            Value::Array(entries) => entries,
            _ => return Err(DomainError::validation("'deleted' must be a list of item ids")),
        };

        for entry in entries {
            match serde_json::from_value::<ItemId>(entry.clone()) {
                Ok(id) => {
                    self.deleted.insert(id);
                }
                Err(e) => self.reject(
                    RowRef::Malformed(entry.to_string()),
                    DomainError::invalid_id(e.to_string()),
                ),
            }
        }
        Ok(())
    }

    fn reject(&mut self, row: RowRef, error: DomainError) {
        self.rejected.push(RowRejection { row, error });
    }

    /// Queue a partial update. A second edit of the same id replaces the first.
    pub fn edit(mut self, id: ItemId, patch: ItemPatch) -> Self {
        self.edited.insert(id, patch);
        self
    }

    pub fn add(mut self, item: NewItem) -> Self {
        self.added.push(item);
        self
    }

    pub fn delete(mut self, id: ItemId) -> Self {
        self.deleted.insert(id);
        self
    }

    /// Rows dropped while parsing the changeset document.
    pub fn rejected(&self) -> &[RowRejection] {
        &self.rejected
    }

    /// No pending changes, i.e. nothing to commit.
    pub fn is_empty(&self) -> bool {
        self.edited.is_empty() && self.added.is_empty() && self.deleted.is_empty()
    }

    /// Number of rows this changeset touches.
    pub fn len(&self) -> usize {
        self.edited.len() + self.added.len() + self.deleted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_changeset_document() {
        let doc = r#"{
            "edited": {"1": {"units_on_hand": 15}},
            "added": [{"name": "Gadget", "units_on_hand": 2, "reorder_point": 1}],
            "deleted": [3]
        }"#;
        let changeset = Changeset::from_json(doc).unwrap();

        let expected = Changeset::new()
            .edit(ItemId::new(1), ItemPatch::new().units_on_hand(15))
            .add(NewItem::named("Gadget").units_on_hand(2).reorder_point(1))
            .delete(ItemId::new(3));
        assert_eq!(changeset, expected);
        assert_eq!(changeset.len(), 3);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let changeset = Changeset::from_json("{}").unwrap();
        assert!(changeset.is_empty());
        assert!(changeset.rejected().is_empty());
    }

    #[test]
    fn malformed_documents_fail_as_a_whole() {
        for doc in [r#"{"renamed":{}}"#, "[]", "not json", r#"{"added":{"name":"x"}}"#] {
            assert!(
                matches!(Changeset::from_json(doc), Err(DomainError::Validation(_))),
                "{doc}"
            );
        }
    }

    #[test]
    fn bad_rows_are_rejected_individually() {
        let doc = r#"{
            "edited": {"1": {"units_on_hand": 4}, "2": {"id": 7}, "x": {"name": "y"}},
            "added": [{"name": "Good", "units_on_hand": 3}, {"name": "Bad", "cost": 1.5}],
            "deleted": [5, -1]
        }"#;
        let changeset = Changeset::from_json(doc).unwrap();

        assert_eq!(changeset.added, vec![NewItem::named("Good").units_on_hand(3)]);
        assert_eq!(changeset.edited.keys().copied().collect::<Vec<_>>(), vec![ItemId::new(1)]);
        assert_eq!(changeset.deleted.iter().copied().collect::<Vec<_>>(), vec![ItemId::new(5)]);

        let rows: Vec<_> = changeset.rejected().iter().map(|r| r.row.clone()).collect();
        assert!(rows.contains(&RowRef::Existing(ItemId::new(2))));
        assert!(rows.contains(&RowRef::Malformed("x".to_string())));
        assert!(rows.contains(&RowRef::Added(1)));
        assert!(rows.contains(&RowRef::Malformed("-1".to_string())));
        assert_eq!(rows.len(), 4);

        let bad_insert = changeset
            .rejected()
            .iter()
            .find(|r| r.row == RowRef::Added(1))
            .unwrap();
        assert!(matches!(&bad_insert.error, DomainError::Validation(msg) if msg.contains("cost")));
    }
}
