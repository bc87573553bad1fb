// [libs/infra/gateway/src/auth.rs]
/*!
 * =================================================================
 * APARATO: BEARER TOKEN VAULT (V5.1 - SINGLE FLIGHT)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA DEL TOKEN DEL PUENTE
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SINGLE FLIGHT: El Mutex asíncrono se sostiene durante todo el
 *    login; N llamadores concurrentes con token vencido producen
 *    exactamente UN login y comparten el resultado.
 * 2. PROACTIVE REFRESH: Un token a menos de 5 minutos de expirar se
 *    renueva antes de viajar, eliminando la mayoría de los 401.
 * 3. TAGGED DECODE: El endpoint de login responde {token}, {Token} o
 *    la cadena desnuda; se decodifica UNA vez en la frontera hacia un
 *    registro tipado único.
 * =================================================================
 */

use crate::errors::{GatewayError, GatewayResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Margen de renovación proactiva antes de la expiración real.
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Vida asumida cuando el token no trae expiración decodificable.
const ASSUMED_LIFETIME_HOURS: i64 = 8;

/// Credenciales del puente de almacenamiento.
#[derive(Debug, Clone)]
pub struct BridgeCredentials {
    pub username: String,
    pub password: String,
}

/// Token vigente con su ancla de expiración.
#[derive(Debug, Clone)]
pub struct BearerToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl BearerToken {
    /// Un token es utilizable si le restan más de 5 minutos de vida.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > Duration::minutes(REFRESH_MARGIN_MINUTES)
    }
}

/// Variantes observadas del endpoint de login del puente.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginResponse {
    Lower { token: String },
    Upper { #[serde(rename = "Token")] token: String },
    Bare(String),
}

impl LoginResponse {
    fn into_token(self) -> String {
        match self {
            LoginResponse::Lower { token } | LoginResponse::Upper { token } | LoginResponse::Bare(token) => token,
        }
    }
}

/// Bóveda del token con refresco single-flight.
pub struct TokenVault {
    credentials: BridgeCredentials,
    login_endpoint: String,
    state: Mutex<Option<BearerToken>>,
}

impl TokenVault {
    pub fn new(base_url: &str, credentials: BridgeCredentials) -> Self {
        Self {
            credentials,
            login_endpoint: format!("{}/auth/login", base_url.trim_end_matches('/')),
            state: Mutex::new(None),
        }
    }

    /**
     * Entrega un token utilizable, renovándolo si falta o está por vencer.
     *
     * # Logic:
     * El cerrojo se sostiene durante el login completo: los llamadores
     * concurrentes esperan y reutilizan el token recién acuñado en lugar
     * de disparar logins paralelos contra el puente.
     *
     * # Errors:
     * `GatewayError::Unauthorized` si el puente rechaza las credenciales;
     * `Transport`/`Timeout` ante fallos físicos.
     */
    pub async fn ensure_token(&self, http_client: &reqwest::Client) -> GatewayResult<String> {
        let mut vault_guard = self.state.lock().await;

        if let Some(current) = vault_guard.as_ref() {
            if current.is_fresh(Utc::now()) {
                return Ok(current.token.clone());
            }
            debug!("🔑 [VAULT]: Token within refresh margin. Renewing before travel.");
        }

        let minted = self.perform_login(http_client).await?;
        let token_text = minted.token.clone();
        *vault_guard = Some(minted);
        Ok(token_text)
    }

    /// Purga el token tras un 401 para forzar el refresco en el reintento.
    pub async fn invalidate(&self) {
        let mut vault_guard = self.state.lock().await;
        if vault_guard.take().is_some() {
            warn!("🔑 [VAULT]: Bearer token invalidated after bridge rejection.");
        }
    }

    async fn perform_login(&self, http_client: &reqwest::Client) -> GatewayResult<BearerToken> {
        info!("🔑 [VAULT]: Negotiating fresh bearer token with the bridge...");

        let login_response = http_client
            .post(&self.login_endpoint)
            .timeout(std::time::Duration::from_secs(15))
            .json(&serde_json::json!({
                "username": self.credentials.username,
                "password": self.credentials.password,
            }))
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        let status = login_response.status();
        let body_text = login_response.text().await.map_err(GatewayError::from_reqwest)?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized(format!("LOGIN_REJECTED_HTTP_{}", status.as_u16())));
        }
        if !status.is_success() {
            return Err(GatewayError::Transport(format!("LOGIN_HTTP_{}: {}", status.as_u16(), body_text)));
        }

        let decoded: LoginResponse = serde_json::from_str(&body_text)
            // El puente legado puede responder el token como texto plano sin comillas.
            .unwrap_or(LoginResponse::Bare(body_text.trim().trim_matches('"').to_string()));

        let token = decoded.into_token();
        if token.is_empty() {
            return Err(GatewayError::Unauthorized("LOGIN_EMPTY_TOKEN".to_string()));
        }

        let expires_at = decode_jwt_expiry(&token)
            .unwrap_or_else(|| Utc::now() + Duration::hours(ASSUMED_LIFETIME_HOURS));

        debug!("🔑 [VAULT]: Token minted. Expiry anchor: {}", expires_at.to_rfc3339());
        Ok(BearerToken { token, expires_at })
    }
}

/// Extrae el claim `exp` del payload JWT cuando el token lo permite.
pub fn decode_jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload_segment = token.split('.').nth(1)?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_segment.as_bytes()).ok()?;
    let payload: Value = serde_json::from_slice(&payload_bytes).ok()?;
    let expiry_epoch = payload.get("exp")?.as_i64()?;
    Utc.timestamp_opt(expiry_epoch, 0).single()
}
