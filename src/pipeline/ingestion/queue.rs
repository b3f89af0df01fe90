use std::collections::HashSet;
use std::time::Instant;

use super::job::IngestionJob;
use super::types::*;
use crate::dates;
use crate::identity::UserIdentity;
use crate::models::{AnalysisResult, DocumentId, DocumentRecord};
use crate::pipeline::analysis::{AnalysisClient, AnalysisError, ReportFile};
use crate::store::DocumentStore;

/// Files waiting for analysis and the state of the batch working them.
#[derive(Debug, Default)]
pub struct DocumentIngestionQueue {
    job: Option<IngestionJob>,
    progress: Option<IngestionProgress>,
    last_error: Option<String>,
}

impl DocumentIngestionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a new selection. An empty selection is ignored.
    pub fn select_files(&mut self, files: Vec<ReportFile>) {
        if files.is_empty() {
            return;
        }
        self.job = Some(IngestionJob::new(files));
        self.last_error = None;
    }

    /// Drop the selection without processing it.
    pub fn clear(&mut self) {
        self.job = None;
        self.progress = None;
    }

    pub fn pending(&self) -> Vec<&ReportFile> {
        self.job
            .as_ref()
            .map(|job| {
                job.items()
                    .iter()
                    .filter(|i| i.status.is_pending())
                    .map(|i| &i.file)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.job.as_ref().map_or(true, IngestionJob::is_empty)
    }

    pub fn progress(&self) -> Option<&IngestionProgress> {
        self.progress.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Analyze every queued file in order, one request at a time.
    ///
    /// A failed file is recorded and skipped; the rest of the batch still
    /// runs. Each success is written to `store` as soon as it arrives. When
    /// the queue is exhausted the new records are placed in front of
    /// `existing`, the local copy is synced, and the queue is cleared.
    pub fn run(
        &mut self,
        user: &UserIdentity,
        client: &dyn AnalysisClient,
        store: &DocumentStore,
        existing: &[DocumentRecord],
        progress_fn: Option<&dyn Fn(IngestionEvent)>,
    ) -> IngestionOutcome {
        let Some(mut job) = self.job.take().filter(|job| !job.is_empty()) else {
            return IngestionOutcome::empty(existing);
        };

        let start = Instant::now();
        let submitted_ms = dates::now_millis();
        let mut taken: HashSet<DocumentId> = existing.iter().map(|r| r.id.clone()).collect();
        let mut outcome = IngestionOutcome::empty(existing);
        self.last_error = None;

        tracing::info!(job_id = %job.id, total = job.len(), "Ingestion batch started");
        emit(progress_fn, IngestionEvent::Started {
            job_id: job.id.to_string(),
            total: job.len(),
        });

        while let Some(progress) = job.progress() {
            self.progress = Some(progress.clone());
            emit(progress_fn, IngestionEvent::Progress(progress));

            let Some((index, file)) = job.next_pending() else {
                break;
            };

            match client.analyze(file) {
                Ok(analysis) => {
                    let id = unique_id(submitted_ms, index, &taken);
                    taken.insert(id.clone());
                    let record = DocumentRecord::new(id, file.name.clone(), dates::format_today(), analysis);

                    if let Err(e) = store.insert(user, &record) {
                        tracing::warn!(file = %record.name, error = %e, "Failed to persist analyzed document");
                    }
                    tracing::info!(file = %record.name, id = %record.id, "Document analyzed");
                    emit(progress_fn, IngestionEvent::ItemSucceeded {
                        index,
                        file_name: record.name.clone(),
                    });

                    outcome.completed.push(record);
                    job.complete_current(ItemStatus::Succeeded);
                }
                Err(e) => {
                    let message = item_error_message(&file.name, &e);
                    tracing::warn!(file = %file.name, error = %e, "Document analysis failed");
                    emit(progress_fn, IngestionEvent::ItemFailed {
                        index,
                        error: message.clone(),
                    });

                    outcome.errors.push(message.clone());
                    self.last_error = Some(message.clone());
                    job.complete_current(ItemStatus::Failed { error: message });
                }
            }
        }

        outcome.documents = outcome
            .completed
            .iter()
            .cloned()
            .chain(existing.iter().cloned())
            .collect();
        if let Err(e) = store.sync_local(user, &outcome.documents) {
            tracing::warn!(error = %e, "Failed to sync local document cache");
        }
        outcome.last_error = self.last_error.clone();

        self.progress = None;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            job_id = %job.id,
            succeeded = outcome.completed.len(),
            failed = outcome.errors.len(),
            duration_ms,
            "Ingestion batch completed"
        );
        emit(progress_fn, IngestionEvent::Completed {
            succeeded: outcome.completed.len(),
            failed: outcome.errors.len(),
            duration_ms,
        });

        outcome
    }
}

/// Analyze a single file outside of any batch, for direct promotion to the
/// dashboard. Nothing is added to the history.
pub fn analyze_single(client: &dyn AnalysisClient, file: &ReportFile) -> Result<AnalysisResult, AnalysisError> {
    let result = client.analyze(file);
    if let Err(e) = &result {
        tracing::warn!(file = %file.name, error = %e, "Quick analysis failed");
    }
    result
}

fn emit(progress_fn: Option<&dyn Fn(IngestionEvent)>, event: IngestionEvent) {
    if let Some(f) = progress_fn {
        f(event);
    }
}

/// Batch ids are `<submitted_ms>-<index>`; on the unlikely clash with an
/// existing id the timestamp is bumped until free.
fn unique_id(submitted_ms: i64, index: usize, taken: &HashSet<DocumentId>) -> DocumentId {
    let mut ms = submitted_ms;
    loop {
        let id = DocumentId::for_batch_item(ms, index);
        if !taken.contains(&id) {
            return id;
        }
        ms += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::Arc;

    use crate::models::{Metric, MetricStatus, MetricValue};
    use crate::store::{MemoryUserData, SqliteUserData};

    /// Analysis double: fails for file names listed in `failing`.
    struct MockAnalysisClient {
        failing: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl MockAnalysisClient {
        fn new(failing: &[&'static str]) -> Self {
            Self {
                failing: failing.to_vec(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl AnalysisClient for MockAnalysisClient {
        fn analyze(&self, file: &ReportFile) -> Result<AnalysisResult, AnalysisError> {
            self.calls.borrow_mut().push(file.name.clone());
            if self.failing.contains(&file.name.as_str()) {
                return Err(AnalysisError::Rejected {
                    status: 500,
                    message: "Failed to analyze report: quota exceeded".into(),
                });
            }
            Ok(AnalysisResult {
                metrics: vec![Metric {
                    name: "Hemoglobin".into(),
                    value: MetricValue::Number(12.0),
                    unit: "g/dL".into(),
                    status: MetricStatus::Normal,
                    reference_range: None,
                    confidence_score: None,
                    insights: None,
                }],
                overall_summary: format!("analysis of {}", file.name),
                ..Default::default()
            })
        }
    }

    fn user() -> UserIdentity {
        UserIdentity::new("u-1", "patient@example.org")
    }

    fn files(names: &[&str]) -> Vec<ReportFile> {
        names
            .iter()
            .map(|n| ReportFile::new(n, b"%PDF-1.4".to_vec()))
            .collect()
    }

    fn local_store() -> DocumentStore {
        DocumentStore::local(Arc::new(MemoryUserData::new()))
    }

    #[test]
    fn empty_queue_is_noop() {
        let mut queue = DocumentIngestionQueue::new();
        let client = MockAnalysisClient::new(&[]);
        let store = local_store();
        let outcome = queue.run(&user(), &client, &store, &[], None);
        assert!(outcome.completed.is_empty());
        assert!(outcome.documents.is_empty());
        assert!(client.calls.borrow().is_empty());
        assert!(store.list_all(&user()).unwrap().is_empty());
    }

    #[test]
    fn middle_failure_does_not_stop_batch() {
        let mut queue = DocumentIngestionQueue::new();
        queue.select_files(files(&["one.pdf", "two.pdf", "three.pdf"]));
        let client = MockAnalysisClient::new(&["two.pdf"]);
        let store = local_store();

        let outcome = queue.run(&user(), &client, &store, &[], None);

        assert_eq!(*client.calls.borrow(), vec!["one.pdf", "two.pdf", "three.pdf"]);
        assert_eq!(outcome.completed.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Error on two.pdf: "));
        assert!(outcome.errors[0].contains("quota exceeded"));
        assert_eq!(outcome.last_error.as_deref(), Some(outcome.errors[0].as_str()));
        assert_eq!(queue.last_error(), outcome.last_error.as_deref());
        assert!(queue.is_empty());
        assert!(queue.progress().is_none());

        let names: Vec<String> = store.list_all(&user()).unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["one.pdf", "three.pdf"]);
    }

    #[test]
    fn new_records_precede_existing_in_batch_order() {
        let store = local_store();
        let mut queue = DocumentIngestionQueue::new();
        queue.select_files(files(&["old.pdf"]));
        let client = MockAnalysisClient::new(&[]);
        let first = queue.run(&user(), &client, &store, &[], None);

        queue.select_files(files(&["a.pdf", "b.pdf"]));
        let second = queue.run(&user(), &client, &store, &first.documents, None);

        let names: Vec<&str> = second.documents.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "old.pdf"]);
        assert_eq!(store.list_all(&user()).unwrap(), second.documents);
    }

    #[test]
    fn ids_unique_within_batch_and_history() {
        let store = local_store();
        let client = MockAnalysisClient::new(&[]);
        let mut queue = DocumentIngestionQueue::new();
        queue.select_files(files(&["a.pdf", "b.pdf", "c.pdf"]));
        let first = queue.run(&user(), &client, &store, &[], None);
        queue.select_files(files(&["d.pdf", "e.pdf", "f.pdf"]));
        let second = queue.run(&user(), &client, &store, &first.documents, None);

        let ids: HashSet<DocumentId> = second.documents.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn all_failures_keep_last_error() {
        let mut queue = DocumentIngestionQueue::new();
        queue.select_files(files(&["a.pdf", "b.pdf"]));
        let client = MockAnalysisClient::new(&["a.pdf", "b.pdf"]);
        let outcome = queue.run(&user(), &client, &local_store(), &[], None);
        assert!(outcome.completed.is_empty());
        assert_eq!(outcome.failed_count(), 2);
        assert!(outcome.last_error.unwrap().starts_with("Error on b.pdf"));
        assert!(queue.is_empty());
    }

    #[test]
    fn progress_reported_before_each_file() {
        let mut queue = DocumentIngestionQueue::new();
        queue.select_files(files(&["a.pdf", "b.pdf"]));
        let client = MockAnalysisClient::new(&["b.pdf"]);
        let events = RefCell::new(Vec::new());
        let record = |e: IngestionEvent| events.borrow_mut().push(e);

        queue.run(&user(), &client, &local_store(), &[], Some(&record));

        let kinds: Vec<String> = events
            .borrow()
            .iter()
            .map(|e| match e {
                IngestionEvent::Started { total, .. } => format!("start:{total}"),
                IngestionEvent::Progress(p) => format!("progress:{}", p.current_index),
                IngestionEvent::ItemSucceeded { index, .. } => format!("ok:{index}"),
                IngestionEvent::ItemFailed { index, .. } => format!("fail:{index}"),
                IngestionEvent::Completed { succeeded, failed, .. } => format!("done:{succeeded}/{failed}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["start:2", "progress:0", "ok:0", "progress:1", "fail:1", "done:1/1"]
        );
    }

    #[test]
    fn select_and_clear() {
        let mut queue = DocumentIngestionQueue::new();
        queue.select_files(files(&["a.pdf"]));
        queue.select_files(Vec::new());
        assert_eq!(queue.pending().len(), 1);
        queue.select_files(files(&["b.pdf", "c.pdf"]));
        assert_eq!(queue.pending().len(), 2);
        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn batch_persists_through_sqlite_cache() {
        let store = DocumentStore::local(Arc::new(SqliteUserData::in_memory().unwrap()));
        let mut queue = DocumentIngestionQueue::new();
        queue.select_files(files(&["a.pdf", "b.pdf"]));
        let outcome = queue.run(&user(), &MockAnalysisClient::new(&[]), &store, &[], None);
        assert_eq!(store.list_all(&user()).unwrap(), outcome.documents);
        assert_eq!(outcome.documents[0].date, dates::format_today());
    }

    #[test]
    fn unique_id_skips_taken() {
        let mut taken = HashSet::new();
        taken.insert(DocumentId::for_batch_item(100, 0));
        assert_eq!(unique_id(100, 0, &taken), DocumentId::for_batch_item(101, 0));
        assert_eq!(unique_id(100, 1, &taken), DocumentId::for_batch_item(100, 1));
    }

    #[test]
    fn analyze_single_returns_result() {
        let client = MockAnalysisClient::new(&["bad.pdf"]);
        let ok = analyze_single(&client, &files(&["good.pdf"])[0]).unwrap();
        assert_eq!(ok.overall_summary, "analysis of good.pdf");
        assert!(analyze_single(&client, &files(&["bad.pdf"])[0]).is_err());
    }
}
