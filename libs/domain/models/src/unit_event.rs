// [libs/domain/models/src/unit_event.rs]
/*!
 * =================================================================
 * APARATO: UNIT TIMELINE CONTRACT (V4.3)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: BITÁCORA APPEND-ONLY POR UNIDAD
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vocabulario cerrado de la línea de tiempo de una unidad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitEventType {
    Creacion,
    InicioRuta,
    UbicacionActualizada,
    DetencionDetectada,
    ReinicioMovimiento,
    LlamadaOperador,
    LlamadaCliente,
    LlamadaPropietario,
    LlamadaIaOperador,
    LlamadaIaCoordinador,
    ScrapeExitoso,
    ScrapeError,
    AlertaParoIa,
    LlegadaDestino,
}

impl UnitEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitEventType::Creacion => "creacion",
            UnitEventType::InicioRuta => "inicio_ruta",
            UnitEventType::UbicacionActualizada => "ubicacion_actualizada",
            UnitEventType::DetencionDetectada => "detencion_detectada",
            UnitEventType::ReinicioMovimiento => "reinicio_movimiento",
            UnitEventType::LlamadaOperador => "llamada_operador",
            UnitEventType::LlamadaCliente => "llamada_cliente",
            UnitEventType::LlamadaPropietario => "llamada_propietario",
            UnitEventType::LlamadaIaOperador => "llamada_ia_operador",
            UnitEventType::LlamadaIaCoordinador => "llamada_ia_coordinador",
            UnitEventType::ScrapeExitoso => "scrape_exitoso",
            UnitEventType::ScrapeError => "scrape_error",
            UnitEventType::AlertaParoIa => "alerta_paro_ia",
            UnitEventType::LlegadaDestino => "llegada_destino",
        }
    }
}

/// Entrada de la línea de tiempo de una unidad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitEvent {
    pub id: i64,
    pub viaje_id: i64,
    pub tipo_evento: UnitEventType,
    pub descripcion: String,
    pub ocurrido_en: DateTime<Utc>,
}
