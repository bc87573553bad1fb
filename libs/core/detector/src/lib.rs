// [libs/core/detector/src/lib.rs]
/*!
 * =================================================================
 * APARATO: COORDINATE DETECTION ENGINE (V9.0 - GOLD MASTER)
 * CLASIFICACIÓN: CORE LIBRARY (ESTRATO L1)
 * RESPONSABILIDAD: EXTRACCIÓN MULTI-FORMATO DE FIJACIONES GPS
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. PURE STRATA: Aparato puro y sin estado. Acepta texto arbitrario o
 *    estructuras anidadas ya parseadas y produce una secuencia ordenada
 *    y deduplicada de fijaciones {lat, lng, velocidad?, rumbo?, ts?}.
 * 2. STRATEGY LADDER: Cuatro estrategias aplicadas en orden y unidas:
 *    claves nominales, pares decimales, grados-minutos-segundos y
 *    arreglos binarios durante la travesía de objetos.
 * 3. TOTAL TOLERANCE: Jamás colapsa ante entrada malformada; el peor
 *    caso es la secuencia vacía.
 *
 * # Mathematical Proof (Dedup Stability):
 * La clave de deduplicación (lat, lng) redondeada a 6 decimales otorga
 * una resolución de ~11 cm en el ecuador. Dos fijaciones que colisionan
 * en esa clave son físicamente indistinguibles para la flota, por lo
 * que conservar la primera ocurrencia preserva el orden del portal sin
 * pérdida de información operativa.
 * =================================================================
 */

use serde_json::Value;
use std::collections::HashSet;

pub mod geodesy;
pub mod keys;
pub mod text;
pub mod walker;

pub use geodesy::{haversine_distance_meters, max_pairwise_spread_meters};

/// Fijación GPS detectada, previa a cualquier persistencia.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedCoord {
    pub lat: f64,
    pub lng: f64,
    /// Velocidad en km/h, cuando el material de origen la expone.
    pub speed: Option<f64>,
    /// Rumbo en grados, cuando el material de origen lo expone.
    pub heading: Option<f64>,
    /// Marca temporal cruda del dispositivo, sin reinterpretar.
    pub timestamp: Option<String>,
    /// Estrategia de origen (keyed_text, numeric_pair, dms, object_walk, array_pair).
    pub source: String,
}

/// Regla de validez de una posición.
///
/// Rango físico más el rechazo de la isla nula: el par (0, 0) y su
/// vecindad |lat|,|lng| < 0.01 es el centinela de "sin señal" de varios
/// portales y jamás constituye una fijación real de la flota.
pub fn is_valid_position(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && lat.abs() <= 90.0
        && lng.abs() <= 180.0
        && !(lat.abs() < 0.01 && lng.abs() < 0.01)
}

/// Clave de deduplicación con precisión de 6 decimales.
pub fn dedup_key(lat: f64, lng: f64) -> String {
    format!("{:.6}|{:.6}", lat, lng)
}

/// Deduplica preservando el orden; la primera ocurrencia gana.
pub fn dedup_coords(raw_sequence: Vec<DetectedCoord>) -> Vec<DetectedCoord> {
    let mut seen_keys: HashSet<String> = HashSet::with_capacity(raw_sequence.len());
    let mut unique_sequence = Vec::with_capacity(raw_sequence.len());

    for candidate in raw_sequence {
        if seen_keys.insert(dedup_key(candidate.lat, candidate.lng)) {
            unique_sequence.push(candidate);
        }
    }

    unique_sequence
}

/// Extrae fijaciones de texto libre aplicando la escalera de estrategias.
///
/// Orden: claves nominales -> pares decimales -> DMS. Los resultados se
/// unen y deduplican. Nunca falla: texto sin señal produce vacío.
pub fn detect_in_text(raw_text: &str) -> Vec<DetectedCoord> {
    let mut harvested = Vec::with_capacity(8);
    harvested.extend(text::extract_keyed_pairs(raw_text));
    harvested.extend(text::extract_numeric_pairs(raw_text));
    harvested.extend(text::extract_dms_pairs(raw_text));
    dedup_coords(harvested)
}

/// Extrae fijaciones de una estructura ya parseada (travesía iterativa).
pub fn detect_in_value(parsed_root: &Value) -> Vec<DetectedCoord> {
    dedup_coords(walker::walk_value(parsed_root))
}

/// Punto de entrada combinado: intenta JSON primero y une con el barrido
/// textual, de modo que material mixto (JSON con cadenas incrustadas)
/// no pierda fijaciones de ninguno de los dos mundos.
pub fn detect(raw_payload: &str) -> Vec<DetectedCoord> {
    let mut harvested = Vec::with_capacity(8);

    if let Ok(parsed_root) = serde_json::from_str::<Value>(raw_payload) {
        harvested.extend(walker::walk_value(&parsed_root));
    }

    harvested.extend(text::extract_keyed_pairs(raw_payload));
    harvested.extend(text::extract_numeric_pairs(raw_payload));
    harvested.extend(text::extract_dms_pairs(raw_payload));

    dedup_coords(harvested)
}
