//! services/functions/src/handlers/progress.rs
//!
//! Adds experience points to a user's running totals and bumps their streak.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use study_aid_core::domain::{Progress, ProgressIncrement};
use study_aid_core::ports::ProgressStore;
use tracing::info;

use super::envelope::{ApiResponse, GatewayEvent, Payload};
use super::Handler;
use crate::config::{Config, PROGRESS_TABLE};
use crate::error::HandlerError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBody {
    pub user_id: String,
    pub xp: i64,
    pub streak: i64,
    pub last_activity: i64,
}

impl From<Progress> for ProgressBody {
    fn from(progress: Progress) -> Self {
        Self {
            user_id: progress.user_id,
            xp: progress.xp,
            streak: progress.streak,
            last_activity: progress.last_activity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub progress: ProgressBody,
}

pub struct ProgressHandler {
    progress: Option<Arc<dyn ProgressStore>>,
}

impl ProgressHandler {
    pub fn new(progress: Option<Arc<dyn ProgressStore>>) -> Self {
        Self { progress }
    }
}

#[async_trait]
impl Handler for ProgressHandler {
    type Event = GatewayEvent;

    async fn handle(&self, event: GatewayEvent) -> Result<ApiResponse, HandlerError> {
        let (user_id, xp) = match Payload::from_event(&event).and_then(|payload| {
            let user_id = payload.required_str("userId")?.to_string();
            let xp = payload.optional_int("xp", 0)?;
            Ok((user_id, xp))
        }) {
            Ok(fields) => fields,
            Err(e) => return Ok(e.into()),
        };

        let store = match Config::require(self.progress.as_ref(), PROGRESS_TABLE) {
            Ok(store) => store,
            Err(e) => return Ok(ApiResponse::misconfigured(&e)),
        };

        let increment = ProgressIncrement {
            user_id,
            xp,
            at: Utc::now().timestamp(),
        };
        let progress = store.record_activity(&increment).await?;
        info!(user_id = %progress.user_id, xp = progress.xp, streak = progress.streak, "Progress updated");

        ApiResponse::ok(&ProgressResponse {
            progress: progress.into(),
        })
    }
}
