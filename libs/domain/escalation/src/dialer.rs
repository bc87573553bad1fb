// [libs/domain/escalation/src/dialer.rs]
/*!
 * =================================================================
 * APARATO: VOICE AGENT DIALER (V8.0 - DUAL MODE)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: COLOCACIÓN DE LLAMADAS SALIENTES DEL AGENTE
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. DUAL MODE: modo directo (clave privada + phone-number-id contra
 *    el API de Vapi) o respaldo por webhook (canal lateral legado a
 *    través del puente). El modo se sella al arranque.
 * 2. OPTIMISTIC OUTCOME: La aceptación de la creación se registra como
 *    atendida; el desenlace real llega después por webhook y
 *    reconcilia el registro por el id externo.
 * 3. ASSISTANT DUALITY: Con asistente guardado se referencia su id y
 *    se envían overrides; sin él se declara un asistente transitorio
 *    completo.
 * =================================================================
 */

use crate::errors::EscalationError;
use crate::prompt::end_call_message;
use centinela_domain_models::{CallOutcome, ContactRole};
use centinela_infra_gateway::BridgeClient;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Presupuesto de la creación de una llamada de voz.
const CALL_CREATION_BUDGET: Duration = Duration::from_secs(30);

/// Configuración del proveedor de voz (sellada al arranque).
#[derive(Debug, Clone)]
pub struct VapiSettings {
    pub private_key: Option<String>,
    pub phone_number_id: Option<String>,
    pub assistant_id: Option<String>,
    pub base_url: String,
    pub voice_id: String,
    pub voice_model: String,
}

impl Default for VapiSettings {
    fn default() -> Self {
        Self {
            private_key: None,
            phone_number_id: None,
            assistant_id: None,
            base_url: "https://api.vapi.ai".to_string(),
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            voice_model: "eleven_multilingual_v2".to_string(),
        }
    }
}

impl VapiSettings {
    /// Modo directo solo cuando existen clave privada y phone-number-id.
    pub fn direct_mode_available(&self) -> bool {
        self.private_key.as_deref().is_some_and(|key| !key.is_empty())
            && self.phone_number_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Solicitud de llamada ya contextualizada por la cadena.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub trip_id: i64,
    pub role: ContactRole,
    /// Destino ya normalizado E.164.
    pub phone_e164: String,
    pub motive: String,
    pub system_prompt: String,
    pub first_message: String,
    pub language: String,
    pub stopped_minutes: i64,
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// Etiqueta de rastreo (stop_alert | verification).
    pub reason: String,
}

/// Desenlace (optimista) de la colocación de una llamada.
#[derive(Debug, Clone)]
pub struct CallResult {
    pub answered: bool,
    pub outcome: CallOutcome,
    pub duration_seconds: Option<i64>,
    pub summary: Option<String>,
    pub external_call_id: Option<String>,
}

/// Puerto de colocación de llamadas (la cadena es genérica sobre él).
pub trait VoiceDialer: Send + Sync {
    fn place_call(
        &self,
        request: &CallRequest,
    ) -> impl Future<Output = Result<CallResult, EscalationError>> + Send;
}

/// Marcador Vapi de doble modo.
pub struct VapiDialer {
    http_client: reqwest::Client,
    settings: VapiSettings,
    bridge: Arc<BridgeClient>,
}

impl VapiDialer {
    pub fn new(settings: VapiSettings, bridge: Arc<BridgeClient>) -> Result<Self, EscalationError> {
        let http_client = reqwest::Client::builder()
            .user_agent("Centinela-Voice-Dialer/0.5")
            .build()
            .map_err(|fault| EscalationError::Transport(format!("HTTP_CLIENT_IGNITION: {fault}")))?;

        if settings.direct_mode_available() {
            info!("📞 [DIALER]: Direct Vapi mode armed (private key + phone-number-id present).");
        } else {
            warn!("📞 [DIALER]: Direct credentials missing. Webhook-fallback mode armed.");
        }

        Ok(Self { http_client, settings, bridge })
    }

    async fn place_direct(&self, request: &CallRequest) -> Result<CallResult, EscalationError> {
        let payload = build_direct_payload(&self.settings, request);
        let endpoint = format!("{}/call", self.settings.base_url.trim_end_matches('/'));
        let private_key = self.settings.private_key.as_deref().unwrap_or_default();

        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(private_key)
            .timeout(CALL_CREATION_BUDGET)
            .json(&payload)
            .send()
            .await
            .map_err(EscalationError::from_reqwest)?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(EscalationError::CallCreation(format!(
                "HTTP_{}: {}",
                status.as_u16(),
                body.get("message").and_then(Value::as_str).unwrap_or("sin detalle")
            )));
        }

        let external_call_id = body.get("id").and_then(Value::as_str).map(str::to_string);
        debug!("📞 [DIALER]: Vapi accepted call creation (external id {:?}).", external_call_id);

        // Desenlace optimista: la aceptación cuenta como atendida hasta
        // que el end-of-call-report reconcilie el registro.
        Ok(CallResult {
            answered: true,
            outcome: CallOutcome::Atendida,
            duration_seconds: None,
            summary: None,
            external_call_id,
        })
    }

    async fn place_via_webhook(&self, request: &CallRequest) -> Result<CallResult, EscalationError> {
        let payload = json!({
            "phone": request.phone_e164,
            "firstMessage": request.first_message,
            "systemPrompt": request.system_prompt,
            "language": request.language,
            "metadata": tracking_metadata(request),
        });

        let response = self
            .bridge
            .vapi_webhook(&payload)
            .await
            .map_err(|fault| EscalationError::CallCreation(fault.to_string()))?;

        let external_call_id = response
            .get("callId")
            .or_else(|| response.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(CallResult {
            answered: true,
            outcome: CallOutcome::Atendida,
            duration_seconds: None,
            summary: None,
            external_call_id,
        })
    }
}

impl VoiceDialer for VapiDialer {
    #[instrument(skip(self, request), fields(viaje = request.trip_id, rol = request.role.as_str()))]
    async fn place_call(&self, request: &CallRequest) -> Result<CallResult, EscalationError> {
        if self.settings.direct_mode_available() {
            self.place_direct(request).await
        } else {
            self.place_via_webhook(request).await
        }
    }
}

/// Metadatos de rastreo adjuntos a toda llamada.
fn tracking_metadata(request: &CallRequest) -> Value {
    json!({
        "tripId": request.trip_id,
        "contactRole": request.role.as_str(),
        "reason": request.reason,
        "stoppedMinutes": request.stopped_minutes,
        "origin": request.origin,
        "destination": request.destination,
    })
}

/**
 * Forja el payload del modo directo conforme al contrato de Vapi.
 * Pura y pública para su certificación sin red.
 */
pub fn build_direct_payload(settings: &VapiSettings, request: &CallRequest) -> Value {
    let assistant_body = json!({
        "firstMessage": request.first_message,
        "model": {
            "provider": "openai",
            "model": "gpt-4o-mini",
            "temperature": 0.5,
            "maxTokens": 250,
            "messages": [
                { "role": "system", "content": request.system_prompt }
            ],
        },
        "voice": {
            "provider": "11labs",
            "voiceId": settings.voice_id,
            "model": settings.voice_model,
            "stability": 0.5,
            "similarityBoost": 0.75,
        },
        "transcriber": {
            "provider": "deepgram",
            "model": "nova-3",
            "language": request.language,
            "endpointing": 150,
        },
        "maxDurationSeconds": 120,
        "silenceTimeoutSeconds": 30,
        "endCallMessage": end_call_message(&request.language),
    });

    let mut payload = json!({
        "phoneNumberId": settings.phone_number_id,
        "customer": { "number": request.phone_e164 },
        "metadata": tracking_metadata(request),
    });

    // Asistente guardado -> referencia + overrides; sin él -> transitorio.
    if let Some(saved_assistant) = settings.assistant_id.as_deref().filter(|id| !id.is_empty()) {
        payload["assistantId"] = json!(saved_assistant);
        payload["assistantOverrides"] = assistant_body;
    } else {
        payload["assistant"] = assistant_body;
    }

    payload
}
