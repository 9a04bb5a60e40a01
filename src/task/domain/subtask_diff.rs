//! Three-way reconciliation between a subtask snapshot and the edited list.

use super::Subtask;
use std::collections::HashSet;

/// Write required to persist one subtask of the current list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtaskUpsert {
    /// The subtask already exists in the store and is rewritten.
    Update(Subtask),
    /// The subtask carries a pending identifier and must be created.
    Create(Subtask),
}

impl SubtaskUpsert {
    /// Returns the subtask the write applies to.
    #[must_use]
    pub const fn subtask(&self) -> &Subtask {
        match self {
            Self::Update(subtask) | Self::Create(subtask) => subtask,
        }
    }
}

/// Store writes that turn an original subtask snapshot into the current list.
///
/// Every surviving subtask is rewritten; no field comparison is made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtaskDiff {
    deleted: Vec<Subtask>,
    upserts: Vec<SubtaskUpsert>,
}

impl SubtaskDiff {
    /// Computes the diff between `original` and `current`.
    ///
    /// An original subtask is deleted when its identifier is persisted-form
    /// and no current subtask carries the same identifier. Each deleted
    /// identifier is reported once, even if the snapshot repeats it.
    #[must_use]
    pub fn between(original: &[Subtask], current: &[Subtask]) -> Self {
        let surviving: HashSet<&str> = current
            .iter()
            .filter_map(|subtask| subtask.id().persisted_id())
            .collect();

        let mut reported = HashSet::new();
        let deleted = original
            .iter()
            .filter(|subtask| {
                subtask.id().persisted_id().is_some_and(|id| {
                    !surviving.contains(id) && reported.insert(id.to_owned())
                })
            })
            .cloned()
            .collect();

        let upserts = current
            .iter()
            .map(|subtask| {
                if subtask.id().is_persisted() {
                    SubtaskUpsert::Update(subtask.clone())
                } else {
                    SubtaskUpsert::Create(subtask.clone())
                }
            })
            .collect();

        Self { deleted, upserts }
    }

    /// Returns subtasks to delete.
    #[must_use]
    pub fn deleted(&self) -> &[Subtask] {
        &self.deleted
    }

    /// Returns writes for the current list, in list order.
    #[must_use]
    pub fn upserts(&self) -> &[SubtaskUpsert] {
        &self.upserts
    }

    /// Returns `true` when there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.upserts.is_empty()
    }

    /// Splits the diff into deletions and upserts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Subtask>, Vec<SubtaskUpsert>) {
        (self.deleted, self.upserts)
    }
}
