// [libs/infra/gateway/src/repositories/scrape_logs.rs]
/*!
 * =================================================================
 * APARATO: SCRAPE LOG REPOSITORY (V3.2)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA running -> success | error
 * =================================================================
 */

use crate::client::BridgeClient;
use crate::errors::GatewayResult;
use serde_json::{json, Map};
use std::sync::Arc;
use tracing::instrument;

pub struct ScrapeLogRepository {
    bridge: Arc<BridgeClient>,
}

impl ScrapeLogRepository {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        Self { bridge }
    }

    /// Abre la fila en estado `running` y devuelve su id cuando el
    /// puente lo expone (sin id no habrá finalización, solo rastro).
    #[instrument(skip(self))]
    pub async fn open_running(
        &self,
        provider_id: i64,
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> GatewayResult<Option<i64>> {
        let mut fields = Map::new();
        fields.insert("proveedor_id".into(), json!(provider_id));
        fields.insert("estado".into(), json!("running"));
        fields.insert("total_encontradas".into(), json!(0));
        fields.insert("total_nuevas".into(), json!(0));
        fields.insert("iniciado_en".into(), json!(started_at.to_rfc3339()));

        let outcome = self.bridge.insert("registros_scrape", &fields).await?;
        Ok(outcome.id)
    }

    /// Sella el intento como exitoso con totales y fuentes usadas.
    #[instrument(skip(self, sources))]
    pub async fn finalize_success(
        &self,
        log_id: i64,
        total_found: i64,
        total_new: i64,
        sources: &str,
        finished_at: chrono::DateTime<chrono::Utc>,
    ) -> GatewayResult<()> {
        let mut fields = Map::new();
        fields.insert("estado".into(), json!("success"));
        fields.insert("total_encontradas".into(), json!(total_found));
        fields.insert("total_nuevas".into(), json!(total_new));
        fields.insert("fuentes".into(), json!(sources));
        fields.insert("finalizado_en".into(), json!(finished_at.to_rfc3339()));

        self.bridge.update("registros_scrape", log_id, &fields).await.map(|_| ())
    }

    /// Sella el intento como fallido con el texto del error.
    #[instrument(skip(self, error_text))]
    pub async fn finalize_error(
        &self,
        log_id: i64,
        error_text: &str,
        finished_at: chrono::DateTime<chrono::Utc>,
    ) -> GatewayResult<()> {
        let mut fields = Map::new();
        fields.insert("estado".into(), json!("error"));
        fields.insert("error".into(), json!(error_text));
        fields.insert("finalizado_en".into(), json!(finished_at.to_rfc3339()));

        self.bridge.update("registros_scrape", log_id, &fields).await.map(|_| ())
    }
}
