// [libs/infra/gateway/src/repositories/coordinates.rs]
/*!
 * =================================================================
 * APARATO: COORDINATE REPOSITORY (V6.2)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: FIJACIONES GPS APPEND-ONLY Y VENTANAS DE ANÁLISIS
 *
 * La tabla está indexada por (viaje_id, timestamp_ingesta): tanto la
 * ventana de dedup (5 minutos) como la ventana del detector de paros
 * (hasta 24 h) recorren ese índice.
 * =================================================================
 */

use crate::client::BridgeClient;
use crate::errors::GatewayResult;
use centinela_domain_models::Coordinate;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Fijaciones recientes de un viaje, más nueva primero.
const SELECT_RECENT_FOR_TRIP: &str = r#"
    SELECT * FROM coordenadas
    WHERE viaje_id = ?1 AND timestamp_ingesta >= ?2
    ORDER BY timestamp_ingesta DESC
    LIMIT ?3
"#;

/// Fijación GPS lista para persistir (el id lo acuña el puente).
#[derive(Debug, Clone)]
pub struct NewCoordinate {
    pub viaje_id: Option<i64>,
    pub proveedor_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub velocidad: Option<f64>,
    pub rumbo: Option<f64>,
    pub timestamp_gps: Option<String>,
    pub fuente: String,
}

pub struct CoordinateRepository {
    bridge: Arc<BridgeClient>,
}

impl CoordinateRepository {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        Self { bridge }
    }

    /**
     * Persiste una fijación nueva con su marca de ingesta.
     *
     * # Errors:
     * `Conflict` viaja hacia arriba: el coordinador la absorbe porque
     * su verificación de duplicados ya marcó la operación idempotente.
     */
    #[instrument(skip(self, fix))]
    pub async fn insert_fix(
        &self,
        fix: &NewCoordinate,
        ingested_at: DateTime<Utc>,
    ) -> GatewayResult<Option<i64>> {
        let mut fields = Map::new();
        fields.insert(
            "viaje_id".into(),
            fix.viaje_id.map(|id| json!(id)).unwrap_or(Value::Null),
        );
        fields.insert("proveedor_id".into(), json!(fix.proveedor_id));
        fields.insert("lat".into(), json!(fix.lat));
        fields.insert("lng".into(), json!(fix.lng));
        fields.insert(
            "velocidad".into(),
            fix.velocidad.map(|speed| json!(speed)).unwrap_or(Value::Null),
        );
        fields.insert(
            "rumbo".into(),
            fix.rumbo.map(|heading| json!(heading)).unwrap_or(Value::Null),
        );
        fields.insert(
            "timestamp_gps".into(),
            fix.timestamp_gps.as_ref().map(|ts| json!(ts)).unwrap_or(Value::Null),
        );
        fields.insert("timestamp_ingesta".into(), json!(ingested_at.to_rfc3339()));
        fields.insert("fuente".into(), json!(fix.fuente));

        let outcome = self.bridge.insert("coordenadas", &fields).await?;
        Ok(outcome.id)
    }

    /// Fijaciones dentro de la ventana de análisis, más nueva primero.
    #[instrument(skip(self))]
    pub async fn recent_for_trip(
        &self,
        trip_id: i64,
        since: DateTime<Utc>,
        limit: i64,
    ) -> GatewayResult<Vec<Coordinate>> {
        self.bridge
            .query_as(
                SELECT_RECENT_FOR_TRIP,
                &[json!(trip_id), json!(since.to_rfc3339()), json!(limit)],
            )
            .await
    }
}
