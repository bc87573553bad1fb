// [libs/infra/gateway/src/client.rs]
/*!
 * =================================================================
 * APARATO: STORAGE BRIDGE CLIENT (V9.3 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CRUD TIPADO SOBRE EL PUENTE JSON CON PORTADOR
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. PARAMETER BINDING: El verbo de consulta viaja como {sql, params};
 *    ningún llamador interpola valores en el texto SQL.
 * 2. RESILIENT AUTH: Ante un 401 el cliente purga el token, refresca
 *    una vez y reintenta una vez; después cataloga Unauthorized.
 * 3. BUDGETED VERBS: Consultas 30 s, mutaciones 15 s, completions 60 s,
 *    voz 30 s. Cada verbo porta su presupuesto.
 * 4. PARTIAL TOLERANCE: insert_many jamás falla como un todo; entrega
 *    un desenlace por registro preservando el orden total.
 * =================================================================
 */

use crate::auth::{BridgeCredentials, TokenVault};
use crate::errors::{GatewayError, GatewayResult};
use crate::translation::{flatten_row, wrap_fields};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Presupuesto temporal de las consultas SELECT.
const QUERY_BUDGET: Duration = Duration::from_secs(30);
/// Presupuesto temporal de las mutaciones (insert/update/remove).
const MUTATION_BUDGET: Duration = Duration::from_secs(15);
/// Presupuesto del proxy de completions LLM.
const OPENAI_BUDGET: Duration = Duration::from_secs(60);
/// Presupuesto del proxy legado del agente de voz.
const VAPI_BUDGET: Duration = Duration::from_secs(30);

/// Envoltorio de respuesta del puente.
#[derive(Debug, serde::Deserialize)]
struct BridgeEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Desenlace de una inserción individual.
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    /// Id del registro cuando el puente lo expone.
    pub id: Option<i64>,
    pub raw: Value,
}

/// Desenlace por registro de `insert_many` (orden total preservado).
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

/// Cliente del puente de almacenamiento remoto.
pub struct BridgeClient {
    http_client: reqwest::Client,
    base_endpoint: String,
    vault: TokenVault,
}

impl BridgeClient {
    /**
     * Forja el cliente táctico del puente.
     *
     * # Errors:
     * `GatewayError::Configuration` ante URL vacía o cliente HTTP
     * imposible de construir (TLS ausente en el host).
     */
    pub fn new(base_url: &str, credentials: BridgeCredentials) -> GatewayResult<Self> {
        if base_url.trim().is_empty() {
            return Err(GatewayError::Configuration("API_BASE_URL_UNDEFINED".into()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent("Centinela-Bridge-Client/0.5")
            .build()
            .map_err(|fault| GatewayError::Configuration(format!("HTTP_CLIENT_IGNITION: {fault}")))?;

        let trimmed_base = base_url.trim_end_matches('/').to_string();
        let vault = TokenVault::new(&trimmed_base, credentials);

        Ok(Self { http_client, base_endpoint: trimmed_base, vault })
    }

    /// Garantiza sesión viva contra el puente (usado al inicio del ciclo).
    pub async fn ensure_authenticated(&self) -> GatewayResult<()> {
        self.vault.ensure_token(&self.http_client).await.map(|_| ())
    }

    /**
     * Ejecuta un SELECT con parámetros enlazados y devuelve filas planas.
     */
    #[instrument(skip(self, sql, params), fields(sql_head = %sql.chars().take(48).collect::<String>()))]
    pub async fn query(&self, sql: &str, params: &[Value]) -> GatewayResult<Vec<Value>> {
        let payload = serde_json::json!({ "sql": sql, "params": params });
        let (status, body) = self
            .dispatch(Method::POST, "/query", Some(&payload), QUERY_BUDGET)
            .await?;

        let envelope = decode_envelope(status, body)?;
        let rows = match envelope.data {
            Some(Value::Array(rows)) => rows,
            Some(Value::Null) | None => Vec::new(),
            Some(single_row) => vec![single_row],
        };

        Ok(rows.into_iter().map(flatten_row).collect())
    }

    /// SELECT tipado: consulta + hidratación serde en un solo paso.
    pub async fn query_as<T: DeserializeOwned>(&self, sql: &str, params: &[Value]) -> GatewayResult<Vec<T>> {
        let rows = self.query(sql, params).await?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|fault| GatewayError::Mapping(fault.to_string()))
            })
            .collect()
    }

    /**
     * Inserta un registro plano; el envoltorio {value, type} se forja aquí.
     *
     * # Errors:
     * `Conflict` surge verbatim ante clave duplicada para que los
     * llamadores idempotentes decidan absorberla.
     */
    #[instrument(skip(self, flat_fields))]
    pub async fn insert(&self, table: &str, flat_fields: &Map<String, Value>) -> GatewayResult<InsertOutcome> {
        let payload = wrap_fields(flat_fields);
        let path = format!("/tables/{table}/records");
        let (status, body) = self
            .dispatch(Method::POST, &path, Some(&payload), MUTATION_BUDGET)
            .await?;

        if status == StatusCode::CONFLICT {
            return Err(GatewayError::Conflict(extract_error_text(&body)));
        }

        let envelope = decode_envelope(status, body)?;
        if let Some(error_text) = envelope.error.filter(|_| !envelope.success) {
            if error_text.to_ascii_lowercase().contains("duplicate") {
                return Err(GatewayError::Conflict(error_text));
            }
            return Err(GatewayError::Transport(error_text));
        }

        let data = envelope.data.unwrap_or(Value::Null);
        let surfaced_id = data.get("id").and_then(Value::as_i64);
        Ok(InsertOutcome { id: surfaced_id, raw: data })
    }

    /**
     * Inserta una secuencia de registros entregando un desenlace por
     * registro. Jamás falla como un todo: cualquier fallo (incluida la
     * autenticación) queda capturado en la posición correspondiente.
     */
    pub async fn insert_many(
        &self,
        table: &str,
        records: Vec<Map<String, Value>>,
    ) -> Vec<RecordOutcome> {
        let mut outcomes = Vec::with_capacity(records.len());

        for record in records {
            match self.insert(table, &record).await {
                Ok(outcome) => outcomes.push(RecordOutcome {
                    success: true,
                    data: Some(outcome.raw),
                    error: None,
                }),
                Err(fault) => outcomes.push(RecordOutcome {
                    success: false,
                    data: None,
                    error: Some(fault.to_string()),
                }),
            }
        }

        outcomes
    }

    /// Actualiza campos de un registro existente. 404 surge como NotFound.
    #[instrument(skip(self, flat_fields))]
    pub async fn update(&self, table: &str, id: i64, flat_fields: &Map<String, Value>) -> GatewayResult<Value> {
        let payload = wrap_fields(flat_fields);
        let path = format!("/tables/{table}/records/{id}");
        let (status, body) = self
            .dispatch(Method::PATCH, &path, Some(&payload), MUTATION_BUDGET)
            .await?;

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(format!("{table}/{id}")));
        }

        let envelope = decode_envelope(status, body)?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// Elimina un registro. 404 surge como NotFound.
    #[instrument(skip(self))]
    pub async fn remove(&self, table: &str, id: i64) -> GatewayResult<Value> {
        let path = format!("/tables/{table}/records/{id}");
        let (status, body) = self.dispatch(Method::DELETE, &path, None, MUTATION_BUDGET).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(format!("{table}/{id}")));
        }

        let envelope = decode_envelope(status, body)?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// Proxy de chat-completions a través del puente (presupuesto 60 s).
    pub async fn openai(&self, payload: &Value) -> GatewayResult<Value> {
        let (status, body) = self.dispatch(Method::POST, "/openai", Some(payload), OPENAI_BUDGET).await?;
        if !status.is_success() {
            return Err(GatewayError::Transport(format!("OPENAI_PROXY_HTTP_{}", status.as_u16())));
        }
        Ok(body)
    }

    /// Canal lateral legado hacia el puente de voz (presupuesto 30 s).
    pub async fn vapi_webhook(&self, payload: &Value) -> GatewayResult<Value> {
        let (status, body) = self.dispatch(Method::POST, "/vapi", Some(payload), VAPI_BUDGET).await?;
        if !status.is_success() {
            return Err(GatewayError::Transport(format!("VAPI_PROXY_HTTP_{}", status.as_u16())));
        }
        Ok(body)
    }

    /**
     * Despacho central: portador fresco, un refresco silencioso y un
     * reintento ante 401, después Unauthorized.
     */
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        budget: Duration,
    ) -> GatewayResult<(StatusCode, Value)> {
        let token = self.vault.ensure_token(&self.http_client).await?;
        let (status, payload) = self.send_once(method.clone(), path, body, budget, &token).await?;

        if status != StatusCode::UNAUTHORIZED {
            return Ok((status, payload));
        }

        // Refresco silencioso + reintento único.
        warn!("🗄️  [BRIDGE]: 401 received on {}. Refreshing token and retrying once.", path);
        self.vault.invalidate().await;
        let fresh_token = self.vault.ensure_token(&self.http_client).await?;
        let (retry_status, retry_payload) = self.send_once(method, path, body, budget, &fresh_token).await?;

        if retry_status == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthorized(format!("PERSISTENT_401_{path}")));
        }

        Ok((retry_status, retry_payload))
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        budget: Duration,
        token: &str,
    ) -> GatewayResult<(StatusCode, Value)> {
        let target_url = format!("{}{}", self.base_endpoint, path);
        let mut request = self
            .http_client
            .request(method, &target_url)
            .bearer_auth(token)
            .timeout(budget);

        if let Some(json_body) = body {
            request = request.json(json_body);
        }

        let response = request.send().await.map_err(GatewayError::from_reqwest)?;
        let status = response.status();
        let body_text = response.text().await.map_err(GatewayError::from_reqwest)?;

        let payload = serde_json::from_str::<Value>(&body_text).unwrap_or_else(|_| {
            debug!("🗄️  [BRIDGE]: Non-JSON body on {} ({} bytes).", path, body_text.len());
            Value::String(body_text)
        });

        Ok((status, payload))
    }
}

/// Decodifica el envoltorio estándar validando el estatus HTTP.
fn decode_envelope(status: StatusCode, body: Value) -> GatewayResult<BridgeEnvelope> {
    if !status.is_success() {
        return Err(GatewayError::Transport(format!(
            "BRIDGE_HTTP_{}: {}",
            status.as_u16(),
            extract_error_text(&body)
        )));
    }

    match serde_json::from_value::<BridgeEnvelope>(body.clone()) {
        Ok(envelope) => Ok(envelope),
        // Puentes legados responden el dato desnudo sin envoltorio.
        Err(_) => Ok(BridgeEnvelope { success: true, data: Some(body), error: None }),
    }
}

fn extract_error_text(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
