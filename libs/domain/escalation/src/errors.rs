// [libs/domain/escalation/src/errors.rs]
/*!
 * =================================================================
 * APARATO: ESCALATION ERROR CATALOG (V3.0)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: FALLOS DE LA CADENA DE LLAMADAS
 * =================================================================
 */

use centinela_infra_gateway::GatewayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EscalationError {
    /// Fallo de persistencia que impide armar la cadena.
    #[error("[L2_ESCALATION_FAULT]: STORAGE -> {0}")]
    Storage(#[from] GatewayError),

    /// El proveedor de voz rechazó la creación de la llamada.
    /// La cadena registra el desenlace 'error' y continúa con el
    /// siguiente rol.
    #[error("[L2_ESCALATION_FAULT]: CALL_CREATION_REJECTED -> {0}")]
    CallCreation(String),

    /// Fallo físico de red hacia el proveedor de voz.
    #[error("[L2_ESCALATION_FAULT]: VOICE_UPLINK_SEVERED -> {0}")]
    Transport(String),

    /// El viaje no tiene contacto activo para el rol solicitado.
    #[error("[L2_ESCALATION_FAULT]: CONTACT_VOID_FOR_ROLE -> {0}")]
    NoContact(String),
}

impl EscalationError {
    pub fn from_reqwest(fault: reqwest::Error) -> Self {
        if fault.is_timeout() {
            EscalationError::Transport(format!("TIMEOUT: {fault}"))
        } else {
            EscalationError::Transport(fault.to_string())
        }
    }
}
