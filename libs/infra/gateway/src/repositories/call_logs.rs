// [libs/infra/gateway/src/repositories/call_logs.rs]
/*!
 * =================================================================
 * APARATO: AI CALL LOG REPOSITORY (V5.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: REGISTRO DE LLAMADAS Y RECONCILIACIÓN POR WEBHOOK
 * =================================================================
 */

use crate::client::BridgeClient;
use crate::errors::GatewayResult;
use centinela_domain_models::{CallKind, CallOutcome, ContactRole};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Detección de llamada reciente de un tipo dado (token de debounce).
const SELECT_RECENT_OF_KIND: &str = r#"
    SELECT id FROM llamadas_ia
    WHERE viaje_id = ?1 AND tipo = ?2 AND inicio >= ?3
    LIMIT 1
"#;

/// Localiza el registro optimista por el id externo del proveedor de voz.
const SELECT_BY_EXTERNAL_ID: &str = r#"
    SELECT id FROM llamadas_ia
    WHERE llamada_externa_id = ?1
    ORDER BY inicio DESC
    LIMIT 1
"#;

/// Registro de llamada listo para persistir.
#[derive(Debug, Clone)]
pub struct NewCallLog {
    pub viaje_id: i64,
    pub tipo: CallKind,
    pub telefono_llamado: String,
    pub rol_destinatario: ContactRole,
    pub inicio: DateTime<Utc>,
    pub duracion_segundos: Option<i64>,
    pub resultado: CallOutcome,
    pub resumen_conversacion: Option<String>,
    pub motivo: String,
    pub ubicacion_lat: Option<f64>,
    pub ubicacion_lng: Option<f64>,
    pub llamada_externa_id: Option<String>,
}

pub struct CallLogRepository {
    bridge: Arc<BridgeClient>,
}

impl CallLogRepository {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        Self { bridge }
    }

    #[instrument(skip(self, record), fields(viaje = record.viaje_id, rol = record.rol_destinatario.as_str()))]
    pub async fn insert_call(&self, record: &NewCallLog) -> GatewayResult<Option<i64>> {
        let mut fields = Map::new();
        fields.insert("viaje_id".into(), json!(record.viaje_id));
        fields.insert("tipo".into(), json!(record.tipo.as_str()));
        fields.insert("telefono_llamado".into(), json!(record.telefono_llamado));
        fields.insert("rol_destinatario".into(), json!(record.rol_destinatario.as_str()));
        fields.insert("inicio".into(), json!(record.inicio.to_rfc3339()));
        fields.insert(
            "duracion_segundos".into(),
            record.duracion_segundos.map(|seconds| json!(seconds)).unwrap_or(Value::Null),
        );
        fields.insert("resultado".into(), json!(record.resultado.as_str()));
        fields.insert(
            "resumen_conversacion".into(),
            record.resumen_conversacion.as_ref().map(|s| json!(s)).unwrap_or(Value::Null),
        );
        fields.insert("motivo".into(), json!(record.motivo));
        fields.insert(
            "ubicacion_lat".into(),
            record.ubicacion_lat.map(|lat| json!(lat)).unwrap_or(Value::Null),
        );
        fields.insert(
            "ubicacion_lng".into(),
            record.ubicacion_lng.map(|lng| json!(lng)).unwrap_or(Value::Null),
        );
        fields.insert(
            "llamada_externa_id".into(),
            record.llamada_externa_id.as_ref().map(|id| json!(id)).unwrap_or(Value::Null),
        );

        let outcome = self.bridge.insert("llamadas_ia", &fields).await?;
        Ok(outcome.id)
    }

    /// ¿Existe una llamada del tipo dado desde `since`? (debounce de paros)
    #[instrument(skip(self))]
    pub async fn has_recent_of_kind(
        &self,
        trip_id: i64,
        kind: CallKind,
        since: DateTime<Utc>,
    ) -> GatewayResult<bool> {
        let rows = self
            .bridge
            .query(
                SELECT_RECENT_OF_KIND,
                &[json!(trip_id), json!(kind.as_str()), json!(since.to_rfc3339())],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /**
     * Reconcilia el registro optimista con el desenlace real del webhook
     * (end-of-call-report). Devuelve false si el id externo no existe.
     */
    #[instrument(skip(self, summary))]
    pub async fn reconcile_by_external_id(
        &self,
        external_call_id: &str,
        outcome: CallOutcome,
        duration_seconds: Option<i64>,
        summary: Option<&str>,
        ended_at: DateTime<Utc>,
    ) -> GatewayResult<bool> {
        let rows = self.bridge.query(SELECT_BY_EXTERNAL_ID, &[json!(external_call_id)]).await?;
        let Some(record_id) = rows.first().and_then(|row| row.get("id")).and_then(Value::as_i64) else {
            warn!("📞 [CALL_LOG]: Webhook for unknown external call {}.", external_call_id);
            return Ok(false);
        };

        let mut fields = Map::new();
        fields.insert("resultado".into(), json!(outcome.as_str()));
        fields.insert("fin".into(), json!(ended_at.to_rfc3339()));
        fields.insert(
            "duracion_segundos".into(),
            duration_seconds.map(|seconds| json!(seconds)).unwrap_or(Value::Null),
        );
        if let Some(summary_text) = summary {
            fields.insert("resumen_conversacion".into(), json!(summary_text));
        }

        self.bridge.update("llamadas_ia", record_id, &fields).await?;
        info!("📞 [CALL_LOG]: Record {} reconciled with final outcome {}.", record_id, outcome.as_str());
        Ok(true)
    }
}
