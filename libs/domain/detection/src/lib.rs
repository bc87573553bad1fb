// [libs/domain/detection/src/lib.rs]
/*!
 * =================================================================
 * APARATO: STOP DETECTION LIBRARY ROOT (V4.0)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L2)
 * RESPONSABILIDAD: DETECCIÓN DE PAROS CON DEBOUNCE DE ALERTAS
 *
 * Motor puro (classifier) + corredor impuro (watch) separados para
 * que las leyes del veredicto se certifiquen sin red ni puente.
 * =================================================================
 */

use centinela_domain_models::Trip;
use serde::Serialize;

/// Motor puro de veredictos sobre ventanas de fijaciones.
pub mod classifier;
/// Catálogo de fallos de la corrida.
pub mod errors;
/// Corredor de detección sobre la flota habilitada.
pub mod watch;

pub use classifier::{classify, lookback_window_minutes, StopVerdict};
pub use errors::DetectionError;
pub use watch::{DetectionOutcome, StopWatch, DEBOUNCE_WINDOW_MINUTES};

/// Paro confirmado, listo para el motor de escalamiento.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopEvent {
    pub trip_id: i64,
    /// Instantánea del viaje al momento de la confirmación.
    pub trip: Trip,
    pub stopped_minutes: i64,
    pub threshold_minutes: i64,
    pub last_lat: f64,
    pub last_lng: f64,
    /// Marca temporal de la fijación más reciente (GPS o ingesta).
    pub last_coord_time: Option<String>,
    pub coord_count: usize,
}
