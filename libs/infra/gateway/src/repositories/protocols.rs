// [libs/infra/gateway/src/repositories/protocols.rs]
/*!
 * =================================================================
 * APARATO: AI PROTOCOL REPOSITORY (V3.1)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: RESOLUCIÓN "ESPECÍFICO DEL VIAJE ∨ DEFAULT"
 * =================================================================
 */

use crate::client::BridgeClient;
use crate::errors::GatewayResult;
use centinela_domain_models::AiProtocol;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

const SELECT_FOR_TRIP: &str = r#"
    SELECT * FROM protocolos_ia
    WHERE viaje_id = ?1
    LIMIT 1
"#;

const SELECT_FLEET_DEFAULT: &str = r#"
    SELECT * FROM protocolos_ia
    WHERE viaje_id IS NULL
    LIMIT 1
"#;

pub struct ProtocolRepository {
    bridge: Arc<BridgeClient>,
}

impl ProtocolRepository {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        Self { bridge }
    }

    /**
     * Resuelve el protocolo efectivo de un viaje: el específico cuando
     * existe, el default de flota como respaldo, y una configuración
     * embebida sana cuando la tabla está vacía.
     */
    #[instrument(skip(self))]
    pub async fn resolve_for_trip(&self, trip_id: i64) -> GatewayResult<AiProtocol> {
        let mut specific: Vec<AiProtocol> =
            self.bridge.query_as(SELECT_FOR_TRIP, &[json!(trip_id)]).await?;
        if let Some(found) = specific.drain(..).next() {
            return Ok(found);
        }

        let mut fleet: Vec<AiProtocol> = self.bridge.query_as(SELECT_FLEET_DEFAULT, &[]).await?;
        if let Some(found) = fleet.drain(..).next() {
            return Ok(found);
        }

        debug!("📜 [PROTOCOL]: No protocol rows found. Using embedded fleet default.");
        Ok(AiProtocol::fleet_default())
    }
}
