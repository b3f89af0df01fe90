//! Application state shared by every front end.
//!
//! `CoreState` owns the resolved configuration, the local cache, the
//! document store (backend chosen once here) and the signed-in user. Every
//! per-user operation goes through it so nothing reads a dataset without
//! knowing whose it is.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::{self, AppConfig};
use crate::health::DashboardView;
use crate::identity::UserIdentity;
use crate::models::{ActiveDocument, AnalysisResult, DocumentRecord};
use crate::physio::{
    consistency_window, weekly_chart, CalendarDay, ChartBar, PlanConversation, SessionLog,
    SessionTracker,
};
use crate::pipeline::analysis::{AnalysisClient, AnalysisError, ReportFile};
use crate::pipeline::ingestion::{analyze_single, DocumentIngestionQueue, IngestionEvent, IngestionOutcome};
use crate::store::{DocumentStore, SqliteUserData, StoreError, UserDataRepository};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No user signed in")]
    NoActiveUser,
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    config: AppConfig,
    cache: Arc<dyn UserDataRepository>,
    documents: DocumentStore,
    user: RwLock<Option<UserIdentity>>,
}

impl CoreState {
    pub fn new(config: AppConfig, cache: Arc<dyn UserDataRepository>) -> Result<Self, CoreError> {
        let documents = DocumentStore::from_config(&config, cache.clone())?;
        Ok(Self {
            config,
            cache,
            documents,
            user: RwLock::new(None),
        })
    }

    /// Configuration from the environment, cache at the default location.
    pub fn open_default() -> Result<Self, CoreError> {
        let cache = SqliteUserData::open(&config::local_db_path())?;
        Self::new(AppConfig::from_env(), Arc::new(cache))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn document_store(&self) -> &DocumentStore {
        &self.documents
    }

    // ── Identity ────────────────────────────────────────────

    pub fn sign_in(&self, identity: UserIdentity) -> Result<(), CoreError> {
        let mut guard = self.user.write().map_err(|_| CoreError::LockPoisoned)?;
        tracing::info!(user = %identity.email, "User signed in");
        *guard = Some(identity);
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), CoreError> {
        let mut guard = self.user.write().map_err(|_| CoreError::LockPoisoned)?;
        if guard.take().is_some() {
            tracing::info!("User signed out");
        }
        Ok(())
    }

    pub fn current_user(&self) -> Result<UserIdentity, CoreError> {
        self.read_user()?.clone().ok_or(CoreError::NoActiveUser)
    }

    pub fn is_signed_in(&self) -> bool {
        self.read_user().map(|u| u.is_some()).unwrap_or(false)
    }

    fn read_user(&self) -> Result<RwLockReadGuard<'_, Option<UserIdentity>>, CoreError> {
        self.user.read().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Documents ───────────────────────────────────────────

    pub fn list_documents(&self) -> Result<Vec<DocumentRecord>, CoreError> {
        Ok(self.documents.list_all(&self.current_user()?)?)
    }

    /// Drain `queue` for the signed-in user against their current history.
    pub fn ingest(
        &self,
        queue: &mut DocumentIngestionQueue,
        client: &dyn AnalysisClient,
        progress_fn: Option<&dyn Fn(IngestionEvent)>,
    ) -> Result<IngestionOutcome, CoreError> {
        let user = self.current_user()?;
        let existing = self.documents.list_all(&user)?;
        Ok(queue.run(&user, client, &self.documents, &existing, progress_fn))
    }

    /// Make a stored document the one the dashboard shows.
    pub fn load_to_dashboard(&self, record: &DocumentRecord) -> Result<(), CoreError> {
        let user = self.current_user()?;
        self.documents.set_active(&user, record)?;
        tracing::info!(document = %record.id, "Document loaded to dashboard");
        Ok(())
    }

    /// Analyze one file and show it on the dashboard straight away.
    pub fn quick_analyze(&self, client: &dyn AnalysisClient, file: &ReportFile) -> Result<AnalysisResult, CoreError> {
        let user = self.current_user()?;
        let result = analyze_single(client, file)?;
        self.documents.set_active_analysis(&user, &result)?;
        Ok(result)
    }

    /// What the dashboard shows, with the history entry it came from.
    pub fn active_document(&self) -> Result<Option<ActiveDocument>, CoreError> {
        Ok(self.documents.get_active(&self.current_user()?)?)
    }

    pub fn active_analysis(&self) -> Result<Option<AnalysisResult>, CoreError> {
        Ok(self.active_document()?.map(|active| active.analysis))
    }

    pub fn dashboard(&self) -> Result<DashboardView, CoreError> {
        let active = self.active_analysis()?;
        Ok(DashboardView::build(active.as_ref()))
    }

    // ── Exercise ────────────────────────────────────────────

    pub fn session_log(&self) -> Result<SessionLog, CoreError> {
        let user = self.current_user()?;
        Ok(SessionLog::load(self.cache.clone(), user.storage_key())?)
    }

    /// Stopwatch bound to the signed-in user's log.
    pub fn session_tracker(&self) -> Result<SessionTracker, CoreError> {
        Ok(SessionTracker::new(self.session_log()?))
    }

    pub fn plan_conversation(&self) -> Result<PlanConversation, CoreError> {
        let user = self.current_user()?;
        Ok(PlanConversation::load(self.cache.clone(), user.storage_key())?)
    }

    pub fn consistency(&self, today: NaiveDate) -> Result<Vec<CalendarDay>, CoreError> {
        Ok(consistency_window(self.session_log()?.entries(), today))
    }

    pub fn weekly_minutes(&self) -> Result<Vec<ChartBar>, CoreError> {
        Ok(weekly_chart(self.session_log()?.entries()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Metric, MetricInsights, MetricStatus, MetricValue};
    use crate::physio::TickMode;
    use crate::store::MemoryUserData;

    struct StaticAnalysis;

    impl AnalysisClient for StaticAnalysis {
        fn analyze(&self, file: &ReportFile) -> Result<AnalysisResult, AnalysisError> {
            if file.name.starts_with("bad") {
                return Err(AnalysisError::Rejected {
                    status: 400,
                    message: "Invalid file type. Allowed: PDF, JPEG, PNG, WEBP".into(),
                });
            }
            Ok(AnalysisResult {
                metrics: vec![Metric {
                    name: "Serum Creatinine".into(),
                    value: MetricValue::Text("1.9".into()),
                    unit: "mg/dL".into(),
                    status: MetricStatus::High,
                    reference_range: Some("0.7-1.3".into()),
                    confidence_score: Some(0.9),
                    insights: Some(MetricInsights {
                        affected_organs: vec!["Kidneys".into()],
                        ..Default::default()
                    }),
                }],
                overall_summary: "Reduced kidney function.".into(),
                ..Default::default()
            })
        }
    }

    fn state() -> CoreState {
        CoreState::new(AppConfig::default(), Arc::new(MemoryUserData::new())).unwrap()
    }

    fn alice() -> UserIdentity {
        UserIdentity::new("u-alice", "alice@example.org")
    }

    fn pdf(name: &str) -> ReportFile {
        ReportFile::new(name, b"%PDF-1.4".to_vec())
    }

    #[test]
    fn per_user_operations_require_sign_in() {
        let state = state();
        assert!(!state.is_signed_in());
        assert!(matches!(state.list_documents(), Err(CoreError::NoActiveUser)));
        assert!(matches!(state.dashboard(), Err(CoreError::NoActiveUser)));
    }

    #[test]
    fn sign_out_clears_user() {
        let state = state();
        state.sign_in(alice()).unwrap();
        assert_eq!(state.current_user().unwrap(), alice());
        state.sign_out().unwrap();
        assert!(matches!(state.current_user(), Err(CoreError::NoActiveUser)));
    }

    #[test]
    fn ingest_then_load_to_dashboard() {
        let state = state();
        state.sign_in(alice()).unwrap();

        let mut queue = DocumentIngestionQueue::new();
        queue.select_files(vec![pdf("renal.pdf"), pdf("bad.txt.pdf"), pdf("renal-2.pdf")]);
        let outcome = state.ingest(&mut queue, &StaticAnalysis, None).unwrap();
        assert_eq!(outcome.completed.len(), 2);
        assert_eq!(state.list_documents().unwrap().len(), 2);

        let empty = state.dashboard().unwrap();
        assert_eq!(empty.score, 100);
        assert!(!empty.has_report);
        state.load_to_dashboard(&outcome.documents[0]).unwrap();
        let active = state.active_document().unwrap().unwrap();
        assert_eq!(active.name.as_deref(), Some("renal.pdf"));
        assert_eq!(active.record(), Some(outcome.documents[0].clone()));
        let view = state.dashboard().unwrap();
        assert_eq!(view.score, 90);
        assert_eq!(view.affected_organs[0].id, "kidneys");
    }

    #[test]
    fn quick_analyze_sets_active_without_history() {
        let state = state();
        state.sign_in(alice()).unwrap();
        let result = state.quick_analyze(&StaticAnalysis, &pdf("single.pdf")).unwrap();
        assert_eq!(state.active_analysis().unwrap(), Some(result));
        assert!(!state.active_document().unwrap().unwrap().is_from_history());
        assert!(state.list_documents().unwrap().is_empty());

        assert!(matches!(
            state.quick_analyze(&StaticAnalysis, &pdf("bad.pdf")),
            Err(CoreError::Analysis(_))
        ));
    }

    #[test]
    fn users_do_not_share_datasets() {
        let state = state();
        state.sign_in(alice()).unwrap();
        state.quick_analyze(&StaticAnalysis, &pdf("a.pdf")).unwrap();

        state.sign_in(UserIdentity::new("u-bob", "bob@example.org")).unwrap();
        assert!(state.active_analysis().unwrap().is_none());
    }

    #[test]
    fn sessions_feed_calendar_and_chart() {
        let state = state();
        state.sign_in(alice()).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();

        let mut tracker = SessionTracker::with_mode(state.session_log().unwrap(), TickMode::Manual);
        tracker.start("Clamshells");
        for _ in 0..90 {
            tracker.tick();
        }
        tracker.stop_at(today, 0).unwrap();

        let days = state.consistency(today).unwrap();
        assert_eq!(days.len(), 14);
        assert!(days.last().unwrap().is_active);
        assert_eq!(state.weekly_minutes().unwrap()[0].duration, 2);
    }

    #[test]
    fn plan_conversation_is_per_user() {
        let state = state();
        state.sign_in(alice()).unwrap();
        let conv = state.plan_conversation().unwrap();
        assert_eq!(conv.messages().len(), 1);
    }
}
