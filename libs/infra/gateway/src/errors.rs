// [libs/infra/gateway/src/errors.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY ERROR CATALOG (V4.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DEL PUENTE
 *
 * Los antiguos flujos de control por excepción (401 silenciado,
 * inserción duplicada tragada) se modelan como variantes explícitas:
 * cada llamador decide por variante, nunca por texto del mensaje.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Credenciales rechazadas tras el reintento con refresco de token.
    #[error("[L3_BRIDGE_AUTH_FAULT]: CREDENTIALS_REJECTED -> {0}")]
    Unauthorized(String),

    /// Violación de unicidad reportada por el puente (clave duplicada).
    /// Los llamadores idempotentes (dedup de coordenadas) la absorben.
    #[error("[L3_BRIDGE_CONFLICT]: DUPLICATE_KEY -> {0}")]
    Conflict(String),

    /// El registro objetivo no existe (update/remove sobre id ausente).
    #[error("[L3_BRIDGE_NOT_FOUND]: TARGET_RECORD_VOID -> {0}")]
    NotFound(String),

    /// La operación excedió su presupuesto temporal.
    #[error("[L3_BRIDGE_TIMEOUT]: OPERATION_BUDGET_EXCEEDED -> {0}")]
    Timeout(String),

    /// Fallo físico de red o respuesta no-2xx sin semántica especial.
    #[error("[L3_BRIDGE_NET_FAULT]: BRIDGE_UPLINK_SEVERED -> {0}")]
    Transport(String),

    /// Fallo de transformación entre filas del puente y el dominio.
    #[error("[L3_BRIDGE_MAPPING_FAULT]: ROW_MAPPING_VIOLATION -> {0}")]
    Mapping(String),

    /// Variables de entorno vacías o malformadas.
    #[error("[L3_BRIDGE_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Clasifica un fallo de reqwest preservando la semántica temporal.
    pub fn from_reqwest(fault: reqwest::Error) -> Self {
        if fault.is_timeout() {
            GatewayError::Timeout(fault.to_string())
        } else {
            GatewayError::Transport(fault.to_string())
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
