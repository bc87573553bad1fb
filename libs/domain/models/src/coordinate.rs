// [libs/domain/models/src/coordinate.rs]
/*!
 * =================================================================
 * APARATO: GPS FIX DOMAIN CONTRACT (V5.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN DE LA OBSERVACIÓN GPS APPEND-ONLY
 *
 * # Invariantes:
 * Deduplicada por viaje dentro de una ventana de ~5 minutos con
 * precisión de 6 decimales. Ciclo de vida append-only: jamás se
 * actualiza ni se borra una fijación persistida.
 * =================================================================
 */

use crate::wire;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fijación GPS observada, tal como se persiste en el puente.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coordinate {
    pub id: i64,
    /// Viaje receptor. Nulo cuando la fijación quedó huérfana.
    #[serde(default)]
    pub viaje_id: Option<i64>,
    pub proveedor_id: i64,
    #[serde(deserialize_with = "wire::flexible_opt_f64")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "wire::flexible_opt_f64")]
    pub lng: Option<f64>,
    /// Velocidad reportada por el portal, km/h.
    #[serde(deserialize_with = "wire::flexible_opt_f64", default)]
    pub velocidad: Option<f64>,
    /// Rumbo en grados [0, 360).
    #[serde(deserialize_with = "wire::flexible_opt_f64", default)]
    pub rumbo: Option<f64>,
    /// Marca temporal del dispositivo, tal cual la entrega el portal.
    #[serde(default)]
    pub timestamp_gps: Option<String>,
    pub timestamp_ingesta: DateTime<Utc>,
    /// Origen de la extracción (http_micodus, http_gpswox, http_generic, ...).
    pub fuente: String,
}
