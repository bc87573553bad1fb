// [libs/infra/gateway/src/repositories/contacts.rs]
/*!
 * =================================================================
 * APARATO: CONTACT REPOSITORY (V3.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: JERARQUÍA DE CONTACTOS POR VIAJE
 * =================================================================
 */

use crate::client::BridgeClient;
use crate::errors::GatewayResult;
use centinela_domain_models::{Contact, ContactRole};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

const SELECT_ACTIVE_FOR_TRIP: &str = r#"
    SELECT * FROM contactos
    WHERE viaje_id = ?1 AND activo = ?2
"#;

pub struct ContactRepository {
    bridge: Arc<BridgeClient>,
}

impl ContactRepository {
    pub fn new(bridge: Arc<BridgeClient>) -> Self {
        Self { bridge }
    }

    /**
     * Contactos activos del viaje reordenados según la cadena fija de
     * escalamiento; roles fuera de la cadena (propietario, otro) quedan
     * excluidos del resultado.
     */
    #[instrument(skip(self))]
    pub async fn escalation_chain_for_trip(&self, trip_id: i64) -> GatewayResult<Vec<Contact>> {
        let unordered: Vec<Contact> = self
            .bridge
            .query_as(SELECT_ACTIVE_FOR_TRIP, &[json!(trip_id), json!(true)])
            .await?;

        let mut chain = Vec::with_capacity(ContactRole::ESCALATION_ORDER.len());
        for role in ContactRole::ESCALATION_ORDER {
            // A lo sumo un contacto activo por (viaje, rol): el primero gana.
            if let Some(found) = unordered.iter().find(|contact| contact.rol == role) {
                chain.push(found.clone());
            }
        }

        Ok(chain)
    }

    /// Contacto puntual por rol, usado por la llamada manual.
    #[instrument(skip(self))]
    pub async fn find_by_role(&self, trip_id: i64, role: ContactRole) -> GatewayResult<Option<Contact>> {
        let unordered: Vec<Contact> = self
            .bridge
            .query_as(SELECT_ACTIVE_FOR_TRIP, &[json!(trip_id), json!(true)])
            .await?;
        Ok(unordered.into_iter().find(|contact| contact.rol == role))
    }
}
