//! Daily engagement counters per quiz.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::quiz::QuizId;

/// Engagement event emitted by the delivery surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    View,
    Start,
    Complete,
    ShareCopy,
    PromoGenerate,
    RecoClick,
}

impl EventKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Start => "start",
            Self::Complete => "complete",
            Self::ShareCopy => "share_copy",
            Self::PromoGenerate => "promo_generate",
            Self::RecoClick => "reco_click",
        }
    }
}

/// Counter row for one quiz on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuizStats {
    pub quiz_id: QuizId,
    pub date: NaiveDate,
    pub views: u64,
    pub starts: u64,
    pub completes: u64,
    pub share_copy: u64,
    pub promo_generate: u64,
    pub reco_click: u64,
}

impl DailyQuizStats {
    pub fn new(quiz_id: QuizId, date: NaiveDate) -> Self {
        Self {
            quiz_id,
            date,
            views: 0,
            starts: 0,
            completes: 0,
            share_copy: 0,
            promo_generate: 0,
            reco_click: 0,
        }
    }

    pub fn increment(&mut self, kind: EventKind) {
        let counter = match kind {
            EventKind::View => &mut self.views,
            EventKind::Start => &mut self.starts,
            EventKind::Complete => &mut self.completes,
            EventKind::ShareCopy => &mut self.share_copy,
            EventKind::PromoGenerate => &mut self.promo_generate,
            EventKind::RecoClick => &mut self.reco_click,
        };
        *counter += 1;
    }

    pub fn count(&self, kind: EventKind) -> u64 {
        match kind {
            EventKind::View => self.views,
            EventKind::Start => self.starts,
            EventKind::Complete => self.completes,
            EventKind::ShareCopy => self.share_copy,
            EventKind::PromoGenerate => self.promo_generate,
            EventKind::RecoClick => self.reco_click,
        }
    }
}

/// Storage for the daily counters; `increment` upserts the row.
pub trait StatsRepository: Send + Sync {
    fn increment(
        &self,
        quiz_id: &QuizId,
        kind: EventKind,
        date: NaiveDate,
    ) -> Result<DailyQuizStats, StatsError>;
    fn daily(&self, quiz_id: &QuizId) -> Result<Vec<DailyQuizStats>, StatsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("stats store unavailable: {0}")]
    Unavailable(String),
}
