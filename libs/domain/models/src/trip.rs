// [libs/domain/models/src/trip.rs]
/*!
 * =================================================================
 * APARATO: UNIT-TRIP DOMAIN CONTRACT (V6.1)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN DEL VIAJE-UNIDAD MONITOREADO
 *
 * # Invariantes:
 * Las transiciones de estado son dirigidas externamente; el núcleo solo
 * LEE el estado y escribe última-posición / última-actualización. Una
 * posición presente debe ser válida (|lat|<=90, |lng|<=180, nunca la
 * isla nula).
 * =================================================================
 */

use crate::wire;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estados operativos del viaje. Viajan con sus cadenas históricas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripState {
    EnRuta,
    EnEspera,
    Cargando,
    Completado,
    Cancelado,
    Detenido,
    ProximoDestino,
}

impl TripState {
    /// Representación de cable (idéntica a la columna persistida).
    pub fn as_str(&self) -> &'static str {
        match self {
            TripState::EnRuta => "en_ruta",
            TripState::EnEspera => "en_espera",
            TripState::Cargando => "cargando",
            TripState::Completado => "completado",
            TripState::Cancelado => "cancelado",
            TripState::Detenido => "detenido",
            TripState::ProximoDestino => "proximo_destino",
        }
    }
}

/// Asignación de unidad bajo monitoreo continuo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    #[serde(default)]
    pub unidad_id: Option<String>,
    /// Placas del tractor, o contenedor cuando aplica.
    #[serde(default)]
    pub placas: Option<String>,
    #[serde(default)]
    pub contenedor: Option<String>,
    /// Nombre del operador humano asignado.
    #[serde(default)]
    pub operador: Option<String>,
    pub estado: TripState,
    /// Enlace opcional al proveedor que alimenta este viaje.
    #[serde(default)]
    pub proveedor_id: Option<i64>,
    #[serde(default)]
    pub frecuencia_monitoreo_minutos: Option<i64>,
    /// Umbral de paro configurado; 30 minutos cuando es nulo.
    #[serde(default)]
    pub umbral_paro_minutos: Option<i64>,
    #[serde(deserialize_with = "wire::flexible_bool", default)]
    pub llamadas_ia_activas: bool,
    #[serde(deserialize_with = "wire::flexible_opt_f64", default)]
    pub ultima_lat: Option<f64>,
    #[serde(deserialize_with = "wire::flexible_opt_f64", default)]
    pub ultima_lng: Option<f64>,
    #[serde(default)]
    pub ultima_actualizacion_gps: Option<DateTime<Utc>>,
    /// Origen y destino declarados del viaje (metadatos de llamada).
    #[serde(default)]
    pub origen: Option<String>,
    #[serde(default)]
    pub destino: Option<String>,
}

impl Trip {
    /// Umbral de paro efectivo en minutos.
    pub fn stop_threshold_minutes(&self) -> i64 {
        self.umbral_paro_minutos.filter(|minutes| *minutes > 0).unwrap_or(30)
    }

    /// Etiqueta humana de la unidad: placas, contenedor o el id interno.
    pub fn unit_label(&self) -> String {
        self.placas
            .clone()
            .or_else(|| self.contenedor.clone())
            .unwrap_or_else(|| format!("unidad-{}", self.id))
    }
}
