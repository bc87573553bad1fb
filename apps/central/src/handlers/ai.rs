// [apps/central/src/handlers/ai.rs]
/*!
 * =================================================================
 * APARATO: AI CONTROL HANDLER (V6.0)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: DETECCIÓN IA Y LLAMADA MANUAL DE VERIFICACIÓN
 * =================================================================
 */

use crate::handlers::failure_envelope;
use crate::state::CommandState;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use centinela_domain_models::ContactRole;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCallPayload {
    pub trip_id: i64,
    pub contact_role: ContactRole,
    pub message: Option<String>,
}

pub struct AiControlHandler;

impl AiControlHandler {
    /// GET /api/ai/status
    #[instrument(skip(application_state))]
    pub async fn handle_status(State(application_state): State<CommandState>) -> impl IntoResponse {
        Json(json!({
            "success": true,
            "detectionEnabled": application_state.ai_detection_enabled.load(Ordering::SeqCst),
            "intervalMinutes": application_state.config.ai_detection_interval_min,
            "lastDetection": application_state.last_detection().map(|when| when.to_rfc3339()),
        }))
    }

    /// POST /api/ai/toggle-detection
    #[instrument(skip(application_state))]
    pub async fn handle_toggle_detection(
        State(application_state): State<CommandState>,
    ) -> impl IntoResponse {
        let previous = application_state.ai_detection_enabled.fetch_xor(true, Ordering::SeqCst);
        let current = !previous;
        info!("🛑 [CONTROL]: AI detection toggled -> {}.", if current { "ENABLED" } else { "DISABLED" });

        Json(json!({ "success": true, "detectionEnabled": current }))
    }

    /// POST /api/ai/api/run-detection — corrida forzada con desenlace
    /// por viaje. La marca de detección se sella incondicionalmente.
    #[instrument(skip(application_state))]
    pub async fn handle_run_detection(
        State(application_state): State<CommandState>,
    ) -> impl IntoResponse {
        let run = application_state.stop_watch.run_detection().await;
        application_state.record_detection(Utc::now());

        match run {
            Ok((stop_events, outcomes)) => {
                let chains = application_state.escalation.process_stop_events(&stop_events).await;
                Json(json!({
                    "success": true,
                    "tripsAnalyzed": outcomes.len(),
                    "stopsConfirmed": stop_events.len(),
                    "outcomes": outcomes,
                    "chains": chains,
                }))
                .into_response()
            }
            Err(fault) => failure_envelope(StatusCode::INTERNAL_SERVER_ERROR, fault.to_string()),
        }
    }

    /// POST /api/ai/api/manual-call — una llamada fuera de la cadena,
    /// persistida con tipo 'verificacion'.
    #[instrument(skip(application_state, payload), fields(viaje = payload.trip_id))]
    pub async fn handle_manual_call(
        State(application_state): State<CommandState>,
        Json(payload): Json<ManualCallPayload>,
    ) -> impl IntoResponse {
        let trip = match application_state.trips.find_by_id(payload.trip_id).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                return failure_envelope(
                    StatusCode::NOT_FOUND,
                    format!("viaje {} no encontrado", payload.trip_id),
                )
            }
            Err(fault) => return failure_envelope(StatusCode::INTERNAL_SERVER_ERROR, fault.to_string()),
        };

        match application_state
            .escalation
            .manual_call(&trip, payload.contact_role, payload.message.as_deref())
            .await
        {
            Ok(placed) => Json(json!({ "success": true, "call": placed })).into_response(),
            Err(fault) => failure_envelope(StatusCode::BAD_GATEWAY, fault.to_string()),
        }
    }
}
