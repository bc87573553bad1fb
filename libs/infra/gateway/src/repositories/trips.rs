// [libs/infra/gateway/src/repositories/trips.rs]
/*!
 * =================================================================
 * APARATO: TRIP REPOSITORY (V5.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: VIAJES ACTIVOS Y SU ÚLTIMA POSICIÓN
 * =================================================================
 */

use crate::client::BridgeClient;
use crate::errors::GatewayResult;
use centinela_domain_models::Trip;
use chrono::{DateTime, Utc};
use serde_json::{json, Map};
use std::sync::Arc;
use tracing::instrument;

/// Viajes en ruta (única población que el coordinador alimenta).
const SELECT_EN_RUTA: &str = r#"
    SELECT * FROM viajes
    WHERE estado = ?1
    ORDER BY id ASC
"#;

/// Viajes en ruta con llamadas IA habilitadas (población del detector).
const SELECT_AI_ENABLED: &str = r#"
    SELECT * FROM viajes
    WHERE estado = ?1 AND llamadas_ia_activas = ?2
    ORDER BY id ASC
"#;

const SELECT_BY_ID: &str = r#"
    SELECT * FROM viajes
    WHERE id = ?1
    LIMIT 1
"#;

pub struct TripRepository {
    bridge: Arc<BridgeClient>,
}

impl TripRepository {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        Self { bridge }
    }

    #[instrument(skip(self))]
    pub async fn list_en_ruta(&self) -> GatewayResult<Vec<Trip>> {
        self.bridge.query_as(SELECT_EN_RUTA, &[json!("en_ruta")]).await
    }

    #[instrument(skip(self))]
    pub async fn list_ai_enabled(&self) -> GatewayResult<Vec<Trip>> {
        self.bridge.query_as(SELECT_AI_ENABLED, &[json!("en_ruta"), json!(true)]).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, trip_id: i64) -> GatewayResult<Option<Trip>> {
        let matches: Vec<Trip> = self.bridge.query_as(SELECT_BY_ID, &[json!(trip_id)]).await?;
        Ok(matches.into_iter().next())
    }

    /**
     * Actualiza la última posición conocida del viaje.
     *
     * Únicas columnas de Trip que el núcleo tiene permitido escribir;
     * las transiciones de estado pertenecen a la superficie externa.
     */
    #[instrument(skip(self))]
    pub async fn update_last_position(
        &self,
        trip_id: i64,
        lat: f64,
        lng: f64,
        observed_at: DateTime<Utc>,
    ) -> GatewayResult<()> {
        let mut fields = Map::new();
        fields.insert("ultima_lat".into(), json!(lat));
        fields.insert("ultima_lng".into(), json!(lng));
        fields.insert("ultima_actualizacion_gps".into(), json!(observed_at.to_rfc3339()));

        self.bridge.update("viajes", trip_id, &fields).await.map(|_| ())
    }
}
