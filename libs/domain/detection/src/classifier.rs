// [libs/domain/detection/src/classifier.rs]
/*!
 * =================================================================
 * APARATO: STOP CLASSIFIER (V6.1 - PURE ENGINE)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: VEREDICTO DE PARO SOBRE UNA VENTANA DE FIJACIONES
 *
 * VISION HIPER-HOLÍSTICA:
 * Motor puro: recibe las fijaciones de la ventana (más nueva primero)
 * y el umbral del viaje; produce un veredicto cerrado. Las compuertas
 * se evalúan en orden estricto:
 * 1. Menos de 2 fijaciones             -> Inconcluso.
 * 2. Dispersión máxima > 100 m         -> En movimiento.
 * 3. Velocidad observada > 5 km/h      -> En movimiento (aun en cluster
 *    cerrado: el movimiento medido descalifica al cluster GPS).
 * 4. Permanencia < umbral              -> Bajo umbral.
 * 5. Todo lo demás                     -> Paro confirmado.
 * =================================================================
 */

use centinela_core_detector::max_pairwise_spread_meters;
use centinela_domain_models::Coordinate;

/// Radio máximo de un cluster inmóvil.
pub const MAX_STOP_SPREAD_METERS: f64 = 100.0;

/// Velocidad máxima compatible con inmovilidad (ruido GPS).
pub const MAX_STILL_SPEED_KMH: f64 = 5.0;

/// Piso de la ventana retrospectiva de análisis (24 horas).
pub const LOOKBACK_FLOOR_MINUTES: i64 = 1440;

/// Fijaciones consideradas por análisis.
pub const ANALYSIS_FIX_LIMIT: i64 = 50;

/// Ventana retrospectiva: `max(umbral × 3, 1440)` minutos.
pub fn lookback_window_minutes(threshold_minutes: i64) -> i64 {
    (threshold_minutes * 3).max(LOOKBACK_FLOOR_MINUTES)
}

/// Veredicto cerrado del análisis de una ventana.
#[derive(Debug, Clone, PartialEq)]
pub enum StopVerdict {
    /// Señal insuficiente para afirmar nada.
    Inconclusive { coord_count: usize },
    /// El cluster excede el radio de inmovilidad.
    Moving { spread_meters: f64 },
    /// Alguna fijación registró velocidad por encima del ruido GPS.
    SpeedObserved { max_speed_kmh: f64 },
    /// Inmóvil, pero aún no alcanza el umbral configurado.
    BelowThreshold { dwell_minutes: i64 },
    /// Paro confirmado.
    Stopped { stopped_minutes: i64, spread_meters: f64 },
}

impl StopVerdict {
    /// Etiqueta compacta para bitácoras y la superficie de control.
    pub fn label(&self) -> &'static str {
        match self {
            StopVerdict::Inconclusive { .. } => "inconcluso",
            StopVerdict::Moving { .. } => "en_movimiento",
            StopVerdict::SpeedObserved { .. } => "velocidad_observada",
            StopVerdict::BelowThreshold { .. } => "bajo_umbral",
            StopVerdict::Stopped { .. } => "paro_confirmado",
        }
    }

    /// ¿El veredicto implica movimiento observado?
    pub fn is_movement(&self) -> bool {
        matches!(self, StopVerdict::Moving { .. } | StopVerdict::SpeedObserved { .. })
    }
}

/**
 * Clasifica la ventana de fijaciones de un viaje.
 *
 * `window_fixes` llega ordenada más-nueva-primero, tal como la entrega
 * el repositorio. Fijaciones sin posición válida se descartan antes de
 * cualquier compuerta.
 */
pub fn classify(window_fixes: &[Coordinate], threshold_minutes: i64) -> StopVerdict {
    let usable: Vec<&Coordinate> = window_fixes
        .iter()
        .filter(|fix| match (fix.lat, fix.lng) {
            (Some(lat), Some(lng)) => centinela_core_detector::is_valid_position(lat, lng),
            _ => false,
        })
        .collect();

    if usable.len() < 2 {
        return StopVerdict::Inconclusive { coord_count: usable.len() };
    }

    let positions: Vec<(f64, f64)> = usable
        .iter()
        .map(|fix| (fix.lat.unwrap_or_default(), fix.lng.unwrap_or_default()))
        .collect();

    let spread_meters = max_pairwise_spread_meters(&positions);
    if spread_meters > MAX_STOP_SPREAD_METERS {
        return StopVerdict::Moving { spread_meters };
    }

    let max_observed_speed = usable
        .iter()
        .filter_map(|fix| fix.velocidad)
        .fold(0.0_f64, f64::max);
    if max_observed_speed > MAX_STILL_SPEED_KMH {
        return StopVerdict::SpeedObserved { max_speed_kmh: max_observed_speed };
    }

    let newest = usable.first().expect("len >= 2 checked above");
    let oldest = usable.last().expect("len >= 2 checked above");
    let dwell_minutes = (newest.timestamp_ingesta - oldest.timestamp_ingesta).num_minutes();

    if dwell_minutes < threshold_minutes {
        return StopVerdict::BelowThreshold { dwell_minutes };
    }

    StopVerdict::Stopped { stopped_minutes: dwell_minutes, spread_meters }
}
