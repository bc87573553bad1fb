// [libs/domain/models/src/protocol.rs]
/*!
 * =================================================================
 * APARATO: AI PROTOCOL CONTRACT (V3.1)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONFIGURACIÓN AFINABLE DEL AGENTE DE VOZ
 *
 * Resuelto por llamada como "específico del viaje ∨ default": el
 * registro con viaje_id nulo actúa como protocolo global de la flota.
 * =================================================================
 */

use crate::wire;
use serde::{Deserialize, Serialize};

/// Configuración de comportamiento de llamadas, por viaje o global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiProtocol {
    pub id: i64,
    /// Nulo => protocolo default de la flota.
    #[serde(default)]
    pub viaje_id: Option<i64>,
    #[serde(default)]
    pub umbral_paro_minutos: Option<i64>,
    #[serde(deserialize_with = "wire::flexible_bool", default = "default_enabled")]
    pub llamadas_activas: bool,
    /// Instrucciones libres anexadas al prompt del sistema.
    #[serde(default)]
    pub protocolo: Option<String>,
    /// Código de idioma de la conversación ("es" | "en").
    #[serde(default = "default_language")]
    pub idioma: String,
}

fn default_enabled() -> bool {
    true
}

fn default_language() -> String {
    "es".to_string()
}

impl AiProtocol {
    /// Protocolo de flota usado cuando no existe registro alguno.
    pub fn fleet_default() -> Self {
        Self {
            id: 0,
            viaje_id: None,
            umbral_paro_minutos: None,
            llamadas_activas: true,
            protocolo: None,
            idioma: default_language(),
        }
    }
}
