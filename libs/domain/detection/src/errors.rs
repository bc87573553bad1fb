// [libs/domain/detection/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DETECTION ERROR CATALOG (V2.0)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: FALLOS DE LA CORRIDA DE DETECCIÓN
 * =================================================================
 */

use centinela_infra_gateway::GatewayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectionError {
    /// Fallo de persistencia que impide enumerar la flota monitoreada.
    /// Las lecturas de debounce NO llegan aquí: son fail-open.
    #[error("[L2_DETECTION_FAULT]: STORAGE -> {0}")]
    Storage(#[from] GatewayError),
}
