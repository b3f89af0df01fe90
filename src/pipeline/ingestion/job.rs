use uuid::Uuid;

use super::types::{IngestionProgress, ItemStatus};
use crate::pipeline::analysis::ReportFile;

#[derive(Debug, Clone)]
pub struct IngestionItem {
    pub file: ReportFile,
    pub status: ItemStatus,
}

/// One batch of selected files and how far processing got.
///
/// Items are worked strictly in order; `cursor` points at the next pending
/// item. Nothing is removed while the batch runs, so a caller can inspect
/// per-item status afterwards.
#[derive(Debug, Clone)]
pub struct IngestionJob {
    pub id: Uuid,
    items: Vec<IngestionItem>,
    cursor: usize,
}

impl IngestionJob {
    pub fn new(files: Vec<ReportFile>) -> Self {
        Self {
            id: Uuid::new_v4(),
            items: files
                .into_iter()
                .map(|file| IngestionItem {
                    file,
                    status: ItemStatus::Pending,
                })
                .collect(),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[IngestionItem] {
        &self.items
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.items.len()
    }

    /// Next pending item and its queue position.
    pub fn next_pending(&self) -> Option<(usize, &ReportFile)> {
        self.items
            .get(self.cursor)
            .map(|item| (self.cursor, &item.file))
    }

    /// Record the outcome of the item under the cursor and advance.
    pub fn complete_current(&mut self, status: ItemStatus) {
        if let Some(item) = self.items.get_mut(self.cursor) {
            item.status = status;
            self.cursor += 1;
        }
    }

    pub fn progress(&self) -> Option<IngestionProgress> {
        self.next_pending().map(|(index, file)| IngestionProgress {
            current_index: index,
            total: self.items.len(),
            current_file: file.name.clone(),
        })
    }

    pub fn count_where(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.status)).count()
    }
}
