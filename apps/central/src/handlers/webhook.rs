// [apps/central/src/handlers/webhook.rs]
/*!
 * =================================================================
 * APARATO: VOICE WEBHOOK INTAKE (V7.0 - RECONCILER)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: CONSUMO DE CALLBACKS DEL AGENTE DE VOZ
 *
 * Contrato con el motor de escalamiento: el desenlace optimista
 * ('atendida' al crear la llamada) se reconcilia aquí cuando llega el
 * end-of-call-report, localizando el registro por el id externo.
 * Tipos consumidos: assistant-request | end-of-call-report |
 * status-update | transcript.
 * =================================================================
 */

use crate::services::geocode::reverse_geocode;
use crate::state::CommandState;
use axum::extract::{Json, State};
use axum::response::IntoResponse;
use centinela_domain_models::CallOutcome;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

pub struct VoiceWebhookHandler;

impl VoiceWebhookHandler {
    /// POST /api/vapi/webhook
    #[instrument(skip(application_state, payload))]
    pub async fn handle_incoming(
        State(application_state): State<CommandState>,
        Json(payload): Json<Value>,
    ) -> impl IntoResponse {
        let message = payload.get("message").cloned().unwrap_or(Value::Null);
        let message_type = message.get("type").and_then(Value::as_str).unwrap_or("desconocido");

        match message_type {
            "end-of-call-report" => {
                Self::reconcile_end_of_call(&application_state, &message).await;
            }
            "status-update" => {
                let status = message.get("status").and_then(Value::as_str).unwrap_or("?");
                info!("📲 [WEBHOOK]: Status update -> {}.", status);
            }
            "transcript" => {
                debug!("📲 [WEBHOOK]: Transcript fragment received.");
            }
            "assistant-request" => {
                // El asistente se declara al crear la llamada; el ack vacío
                // deja que Vapi use la configuración enviada.
                info!("📲 [WEBHOOK]: Assistant request acknowledged.");
            }
            other => {
                warn!("📲 [WEBHOOK]: Unknown message type '{}'. Ignored.", other);
            }
        }

        Json(json!({ "success": true, "handled": message_type }))
    }

    /// Reconciliación del registro optimista con el desenlace real.
    async fn reconcile_end_of_call(application_state: &CommandState, message: &Value) {
        let call = message.get("call").cloned().unwrap_or(Value::Null);
        let Some(external_call_id) = call.get("id").and_then(Value::as_str) else {
            warn!("📲 [WEBHOOK]: End-of-call report without call id. Dropped.");
            return;
        };

        let ended_reason = call
            .get("endedReason")
            .or_else(|| message.get("endedReason"))
            .and_then(Value::as_str)
            .unwrap_or("");
        let outcome = classify_ended_reason(ended_reason);

        let duration_seconds = message
            .get("durationSeconds")
            .or_else(|| call.get("durationSeconds"))
            .and_then(Value::as_f64)
            .map(|seconds| seconds.round() as i64);

        let mut summary = message
            .get("summary")
            .or_else(|| message.get("analysis").and_then(|analysis| analysis.get("summary")))
            .and_then(Value::as_str)
            .map(str::to_string);

        // Enriquecimiento opcional: nombrar la ubicación del paro en el
        // resumen reconciliado (degrada en silencio sin llave).
        if let Some(trip_id) = call
            .get("metadata")
            .and_then(|metadata| metadata.get("tripId"))
            .and_then(Value::as_i64)
        {
            if let Some(address) = Self::lookup_trip_address(application_state, trip_id).await {
                summary = Some(match summary {
                    Some(text) => format!("{text} | Ubicación aproximada: {address}"),
                    None => format!("Ubicación aproximada: {address}"),
                });
            }
        }

        match application_state
            .call_logs
            .reconcile_by_external_id(external_call_id, outcome, duration_seconds, summary.as_deref(), Utc::now())
            .await
        {
            Ok(true) => {
                info!("📲 [WEBHOOK]: Call {} reconciled -> {}.", external_call_id, outcome.as_str());
            }
            Ok(false) => {
                warn!("📲 [WEBHOOK]: Call {} has no optimistic record to reconcile.", external_call_id);
            }
            Err(fault) => {
                warn!("📲 [WEBHOOK]: Reconciliation failed for {}: {}.", external_call_id, fault);
            }
        }
    }

    async fn lookup_trip_address(application_state: &CommandState, trip_id: i64) -> Option<String> {
        let api_key = application_state.config.google_maps_api_key.as_deref()?;
        let trip = application_state.trips.find_by_id(trip_id).await.ok().flatten()?;
        let (lat, lng) = trip.ultima_lat.zip(trip.ultima_lng)?;

        let http_client = reqwest::Client::new();
        reverse_geocode(&http_client, Some(api_key), lat, lng).await
    }
}

/// Mapeo del endedReason de Vapi al vocabulario de desenlaces.
pub fn classify_ended_reason(ended_reason: &str) -> CallOutcome {
    let lowered = ended_reason.to_ascii_lowercase();

    if lowered.contains("voicemail") {
        return CallOutcome::Buzon;
    }
    if lowered.contains("no-answer") || lowered.contains("did-not-answer") || lowered.contains("busy") {
        return CallOutcome::NoAtendida;
    }
    if lowered.contains("error") || lowered.contains("failed") {
        return CallOutcome::Error;
    }

    CallOutcome::Atendida
}
