// [libs/domain/models/src/contact.rs]
/*!
 * =================================================================
 * APARATO: ESCALATION CONTACT CONTRACT (V4.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: JERARQUÍA DE ROLES Y PUNTOS DE CONTACTO
 *
 * # Invariantes:
 * A lo sumo un contacto activo por par (viaje, rol). El orden de
 * escalamiento es fijo e inmutable: operador, coordinadores 1-3,
 * cliente. Propietario y otros roles jamás entran a la cadena.
 * =================================================================
 */

use crate::wire;
use serde::{Deserialize, Serialize};

/// Rol del contacto dentro de la jerarquía de escalamiento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
    Operador,
    Coordinador1,
    Coordinador2,
    Coordinador3,
    Cliente,
    Propietario,
    Otro,
}

impl ContactRole {
    /// Orden fijo de la cadena de escalamiento saliente.
    pub const ESCALATION_ORDER: [ContactRole; 5] = [
        ContactRole::Operador,
        ContactRole::Coordinador1,
        ContactRole::Coordinador2,
        ContactRole::Coordinador3,
        ContactRole::Cliente,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactRole::Operador => "operador",
            ContactRole::Coordinador1 => "coordinador1",
            ContactRole::Coordinador2 => "coordinador2",
            ContactRole::Coordinador3 => "coordinador3",
            ContactRole::Cliente => "cliente",
            ContactRole::Propietario => "propietario",
            ContactRole::Otro => "otro",
        }
    }

    /// Determina si el rol es un coordinador intermedio de la cadena.
    pub fn is_coordinator(&self) -> bool {
        matches!(
            self,
            ContactRole::Coordinador1 | ContactRole::Coordinador2 | ContactRole::Coordinador3
        )
    }
}

/// Punto de escalamiento adherido a un viaje.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub viaje_id: i64,
    pub rol: ContactRole,
    #[serde(default)]
    pub nombre: Option<String>,
    /// Teléfono normalizado E.164 al persistir; tolerante al leer.
    pub telefono: String,
    #[serde(deserialize_with = "wire::flexible_bool", default = "default_active")]
    pub activo: bool,
}

fn default_active() -> bool {
    true
}
