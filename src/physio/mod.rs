//! Guided exercise: plan consultation, the session stopwatch, and the
//! activity views built from the session log.

pub mod calendar;
pub mod consult;
pub mod log;
pub mod ticker;
pub mod tracker;

pub use calendar::{consistency_window, weekly_chart, CalendarDay, ChartBar};
pub use consult::{ConsultClient, ConsultError, HttpConsultClient, PlanConversation};
pub use log::SessionLog;
pub use ticker::Ticker;
pub use tracker::{format_elapsed, SessionTracker, TickMode, TimerSnapshot, TimerStatus};
