// [libs/infra/gateway/src/repositories/unit_events.rs]
/*!
 * =================================================================
 * APARATO: UNIT EVENT REPOSITORY (V4.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: BITÁCORA APPEND-ONLY Y TOKENS DE DEBOUNCE
 * =================================================================
 */

use crate::client::BridgeClient;
use crate::errors::GatewayResult;
use centinela_domain_models::UnitEventType;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::instrument;

const SELECT_RECENT_OF_TYPE: &str = r#"
    SELECT id FROM eventos_unidad
    WHERE viaje_id = ?1 AND tipo_evento = ?2 AND ocurrido_en >= ?3
    LIMIT 1
"#;

const SELECT_LATEST_OF_TYPE: &str = r#"
    SELECT ocurrido_en FROM eventos_unidad
    WHERE viaje_id = ?1 AND tipo_evento = ?2
    ORDER BY ocurrido_en DESC
    LIMIT 1
"#;

pub struct UnitEventRepository {
    bridge: Arc<BridgeClient>,
}

impl UnitEventRepository {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        Self { bridge }
    }

    /// Anexa una entrada a la línea de tiempo de la unidad.
    #[instrument(skip(self, description), fields(tipo = event_type.as_str()))]
    pub async fn append(
        &self,
        trip_id: i64,
        event_type: UnitEventType,
        description: &str,
        occurred_at: DateTime<Utc>,
    ) -> GatewayResult<()> {
        let mut fields = Map::new();
        fields.insert("viaje_id".into(), json!(trip_id));
        fields.insert("tipo_evento".into(), json!(event_type.as_str()));
        fields.insert("descripcion".into(), json!(description));
        fields.insert("ocurrido_en".into(), json!(occurred_at.to_rfc3339()));

        self.bridge.insert("eventos_unidad", &fields).await.map(|_| ())
    }

    /// ¿Existe un evento del tipo dado desde `since`? (token de debounce)
    #[instrument(skip(self))]
    pub async fn has_recent_of_type(
        &self,
        trip_id: i64,
        event_type: UnitEventType,
        since: DateTime<Utc>,
    ) -> GatewayResult<bool> {
        let rows = self
            .bridge
            .query(
                SELECT_RECENT_OF_TYPE,
                &[json!(trip_id), json!(event_type.as_str()), json!(since.to_rfc3339())],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Última ocurrencia de un tipo de evento, si existe.
    #[instrument(skip(self))]
    pub async fn latest_occurrence(
        &self,
        trip_id: i64,
        event_type: UnitEventType,
    ) -> GatewayResult<Option<DateTime<Utc>>> {
        let rows = self
            .bridge
            .query(SELECT_LATEST_OF_TYPE, &[json!(trip_id), json!(event_type.as_str())])
            .await?;

        Ok(rows
            .first()
            .and_then(|row| row.get("ocurrido_en"))
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc)))
    }
}
