// [libs/domain/models/src/call_log.rs]
/*!
 * =================================================================
 * APARATO: AI CALL LOG CONTRACT (V5.2)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: REGISTRO DE LLAMADAS SALIENTES DEL AGENTE DE VOZ
 *
 * El resultado persistido al crear la llamada es optimista
 * ('atendida' si la creación fue aceptada); el desenlace real llega
 * de forma asíncrona por webhook y reconcilia el registro vía
 * `llamada_externa_id`.
 * =================================================================
 */

use crate::contact::ContactRole;
use crate::wire;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Naturaleza de la llamada saliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Paro,
    Accidente,
    Verificacion,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Paro => "paro",
            CallKind::Accidente => "accidente",
            CallKind::Verificacion => "verificacion",
        }
    }
}

/// Desenlace de la llamada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Atendida,
    NoAtendida,
    Buzon,
    Error,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Atendida => "atendida",
            CallOutcome::NoAtendida => "no_atendida",
            CallOutcome::Buzon => "buzon",
            CallOutcome::Error => "error",
        }
    }
}

/// Registro persistido de una llamada saliente.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiCallLog {
    pub id: i64,
    pub viaje_id: i64,
    pub tipo: CallKind,
    pub telefono_llamado: String,
    pub rol_destinatario: ContactRole,
    pub inicio: DateTime<Utc>,
    #[serde(default)]
    pub fin: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duracion_segundos: Option<i64>,
    pub resultado: CallOutcome,
    #[serde(default)]
    pub resumen_conversacion: Option<String>,
    /// Motivo contextual construido por la cadena de escalamiento.
    pub motivo: String,
    #[serde(deserialize_with = "wire::flexible_opt_f64", default)]
    pub ubicacion_lat: Option<f64>,
    #[serde(deserialize_with = "wire::flexible_opt_f64", default)]
    pub ubicacion_lng: Option<f64>,
    /// Identificador emitido por el proveedor de voz (clave del webhook).
    #[serde(default)]
    pub llamada_externa_id: Option<String>,
}
