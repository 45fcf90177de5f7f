use stockroom_core::{DomainError, ItemId};

/// Which row of a changeset an outcome refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRef {
    /// An edit or deletion of an existing item.
    Existing(ItemId),
    /// The n-th entry of the `added` list, counted in document order.
    Added(usize),
    /// An entry whose id could not be read, as it appeared in the document.
    Malformed(String),
}

impl core::fmt::Display for RowRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RowRef::Existing(id) => write!(f, "item {id}"),
            RowRef::Added(index) => write!(f, "new row #{index}"),
            RowRef::Malformed(raw) => write!(f, "entry '{raw}'"),
        }
    }
}

/// A single row that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    pub row: RowRef,
    pub error: DomainError,
}

/// Per-row outcome of applying a changeset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub edited: Vec<ItemId>,
    pub inserted: Vec<ItemId>,
    pub deleted: Vec<ItemId>,
    pub rejected: Vec<RowRejection>,
}

impl ApplyReport {
    pub(crate) fn reject(&mut self, row: RowRef, error: DomainError) {
        self.rejected.push(RowRejection { row, error });
    }

    /// Every row of the changeset was applied.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Ids that were skipped because they do not exist.
    pub fn not_found(&self) -> Vec<ItemId> {
        self.rejected
            .iter()
            .filter_map(|r| match r.error {
                DomainError::NotFound(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Rows skipped because a field failed validation.
    pub fn invalid(&self) -> impl Iterator<Item = &RowRejection> {
        self.rejected
            .iter()
            .filter(|r| matches!(r.error, DomainError::Validation(_)))
    }
}
