// [apps/central/src/handlers/scraper.rs]
/*!
 * =================================================================
 * APARATO: SCRAPER CONTROL HANDLER (V5.0)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: ESTATUS Y DISPARO MANUAL DE CICLOS
 * =================================================================
 */

use crate::services::{CycleMode, ScrapeCoordinator};
use crate::state::CommandState;
use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::instrument;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunCyclePayload {
    /// Corre un solo proveedor cuando está presente.
    pub provider_id: Option<i64>,
}

pub struct ScraperControlHandler;

impl ScraperControlHandler {
    /// GET /api/scraper/status
    #[instrument(skip(application_state))]
    pub async fn handle_status(State(application_state): State<CommandState>) -> impl IntoResponse {
        let last_run = application_state.last_run();
        let mode = if application_state.scheduler_enabled.load(Ordering::SeqCst) {
            "scheduled"
        } else {
            "manual"
        };

        Json(json!({
            "success": true,
            "isRunning": application_state.is_cycle_running(),
            "lastRunTime": last_run.as_ref().map(|snapshot| snapshot.finished_at.to_rfc3339()),
            "lastRunResult": last_run.as_ref().map(|snapshot| snapshot.summary.clone()),
            "mode": mode,
        }))
    }

    /// POST /api/scraper/run — ciclo completo u orientado a un proveedor.
    #[instrument(skip(application_state, payload))]
    pub async fn handle_run(
        State(application_state): State<CommandState>,
        payload: Option<Json<RunCyclePayload>>,
    ) -> impl IntoResponse {
        let mode = match payload.and_then(|Json(body)| body.provider_id) {
            Some(provider_id) => CycleMode::SingleProvider(provider_id),
            None => CycleMode::AllActive,
        };

        let coordinator = ScrapeCoordinator::new(application_state);
        let report = coordinator.run_cycle(mode).await;

        Json(json!({ "success": true, "report": report }))
    }
}
