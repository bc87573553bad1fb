// [libs/infra/gateway/src/repositories/providers.rs]
/*!
 * =================================================================
 * APARATO: PROVIDER REPOSITORY (V4.1)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PORTALES GPS Y SU MARCA DE AGUA DE SCRAPE
 * =================================================================
 */

use crate::client::BridgeClient;
use crate::errors::GatewayResult;
use centinela_domain_models::Provider;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Proveedores activos ordenados por cadencia ascendente.
const SELECT_ACTIVE_BY_CADENCE: &str = r#"
    SELECT * FROM proveedores
    WHERE activo = ?1
    ORDER BY intervalo_scrape_minutos ASC
"#;

/// Localiza un proveedor puntual por identificador.
const SELECT_BY_ID: &str = r#"
    SELECT * FROM proveedores
    WHERE id = ?1
    LIMIT 1
"#;

pub struct ProviderRepository {
    bridge: Arc<BridgeClient>,
}

impl ProviderRepository {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        Self { bridge }
    }

    /// Inventario de proveedores activos, cadencia más corta primero.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> GatewayResult<Vec<Provider>> {
        self.bridge.query_as(SELECT_ACTIVE_BY_CADENCE, &[json!(true)]).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, provider_id: i64) -> GatewayResult<Option<Provider>> {
        let matches: Vec<Provider> = self.bridge.query_as(SELECT_BY_ID, &[json!(provider_id)]).await?;
        Ok(matches.into_iter().next())
    }

    /**
     * Sella el desenlace del ciclo sobre la marca de agua del proveedor.
     *
     * Únicas columnas de Provider que el núcleo tiene permitido escribir.
     */
    #[instrument(skip(self, error_text))]
    pub async fn record_scrape_result(
        &self,
        provider_id: i64,
        scraped_at: DateTime<Utc>,
        error_text: Option<&str>,
    ) -> GatewayResult<()> {
        let mut fields = Map::new();
        fields.insert("ultimo_scrape".into(), json!(scraped_at.to_rfc3339()));
        fields.insert(
            "ultimo_error".into(),
            error_text.map(|text| json!(text)).unwrap_or(Value::Null),
        );

        self.bridge.update("proveedores", provider_id, &fields).await.map(|_| ())
    }
}
