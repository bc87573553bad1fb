// [apps/central/src/handlers/scheduler.rs]
/*!
 * =================================================================
 * APARATO: SCHEDULER CONTROL HANDLER (V4.0)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: INTERRUPTOR Y ESTATUS DE LA CADENCIA
 * =================================================================
 */

use crate::state::CommandState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::{info, instrument};

pub struct SchedulerControlHandler;

impl SchedulerControlHandler {
    /// GET /api/scheduler/status
    #[instrument(skip(application_state))]
    pub async fn handle_status(State(application_state): State<CommandState>) -> impl IntoResponse {
        Json(json!({
            "success": true,
            "enabled": application_state.scheduler_enabled.load(Ordering::SeqCst),
            "cronSchedule": application_state.config.cron_schedule,
        }))
    }

    /// POST /api/scheduler/toggle
    #[instrument(skip(application_state))]
    pub async fn handle_toggle(State(application_state): State<CommandState>) -> impl IntoResponse {
        let previous = application_state.scheduler_enabled.fetch_xor(true, Ordering::SeqCst);
        let current = !previous;
        info!("⏱️  [CONTROL]: Scheduler toggled -> {}.", if current { "ENABLED" } else { "DISABLED" });

        Json(json!({ "success": true, "enabled": current }))
    }
}
