// [libs/core/detector/src/text.rs]
/*!
 * =================================================================
 * APARATO: FREE-TEXT EXTRACTION STRATEGIES (V7.2)
 * CLASIFICACIÓN: CORE LIBRARY (ESTRATO L1)
 * RESPONSABILIDAD: ESTRATEGIAS 1-3 SOBRE MATERIAL TEXTUAL
 *
 * # Regla de apareamiento (Estrategia 1):
 * Una latitud se aparea con la longitud no usada más cercana por índice
 * posicional dentro de una ventana de 500 caracteres. La ventana corta
 * el apareamiento accidental entre dispositivos distintos dentro del
 * mismo HTML.
 * =================================================================
 */

use crate::keys::{
    DMS_RE, HEADING_VALUE_RE, LAT_VALUE_RE, LNG_VALUE_RE, NUMERIC_PAIR_RE, SPEED_VALUE_RE,
    TIMESTAMP_VALUE_RE,
};
use crate::{is_valid_position, DetectedCoord};

/// Distancia posicional máxima para aparear clave-lat con clave-lng.
const PAIRING_WINDOW_CHARS: usize = 500;

/// Estrategia 1: claves nominales apareadas por cercanía posicional.
pub fn extract_keyed_pairs(raw_text: &str) -> Vec<DetectedCoord> {
    if raw_text.len() < 8 {
        return Vec::new();
    }

    let lat_hits: Vec<(usize, f64)> = LAT_VALUE_RE
        .captures_iter(raw_text)
        .filter_map(|captures| {
            let anchor = captures.get(0)?.start();
            let value: f64 = captures.get(2)?.as_str().parse().ok()?;
            Some((anchor, value))
        })
        .collect();

    let lng_hits: Vec<(usize, f64)> = LNG_VALUE_RE
        .captures_iter(raw_text)
        .filter_map(|captures| {
            let anchor = captures.get(0)?.start();
            let value: f64 = captures.get(2)?.as_str().parse().ok()?;
            Some((anchor, value))
        })
        .collect();

    if lat_hits.is_empty() || lng_hits.is_empty() {
        return Vec::new();
    }

    let mut consumed_lng = vec![false; lng_hits.len()];
    let mut harvested = Vec::with_capacity(lat_hits.len());

    for (lat_anchor, lat_value) in &lat_hits {
        let mut best_candidate: Option<(usize, usize)> = None; // (índice, distancia)

        for (lng_index, (lng_anchor, _)) in lng_hits.iter().enumerate() {
            if consumed_lng[lng_index] {
                continue;
            }
            let positional_distance = lat_anchor.abs_diff(*lng_anchor);
            if positional_distance > PAIRING_WINDOW_CHARS {
                continue;
            }
            match best_candidate {
                Some((_, best_distance)) if positional_distance >= best_distance => {}
                _ => best_candidate = Some((lng_index, positional_distance)),
            }
        }

        if let Some((lng_index, _)) = best_candidate {
            consumed_lng[lng_index] = true;
            let lng_value = lng_hits[lng_index].1;

            if is_valid_position(*lat_value, lng_value) {
                let (speed, heading, timestamp) = enrich_from_text(raw_text, *lat_anchor);
                harvested.push(DetectedCoord {
                    lat: *lat_value,
                    lng: lng_value,
                    speed,
                    heading,
                    timestamp,
                    source: "keyed_text".to_string(),
                });
            }
        }
    }

    harvested
}

/// Estrategia 2: pares decimales separados por coma, pipe o espacio.
///
/// Si el par no es válido como (lat, lng) pero sí lo es invertido, se
/// emite el par invertido (portales que publican "lng, lat").
pub fn extract_numeric_pairs(raw_text: &str) -> Vec<DetectedCoord> {
    let mut harvested = Vec::with_capacity(4);

    for captures in NUMERIC_PAIR_RE.captures_iter(raw_text) {
        let anchor = match captures.get(0) {
            Some(full_match) => full_match.start(),
            None => continue,
        };
        let first: f64 = match captures[1].parse() {
            Ok(value) => value,
            Err(_) => continue,
        };
        let second: f64 = match captures[2].parse() {
            Ok(value) => value,
            Err(_) => continue,
        };

        let resolved = if is_valid_position(first, second) {
            Some((first, second))
        } else if is_valid_position(second, first) {
            Some((second, first))
        } else {
            None
        };

        if let Some((lat, lng)) = resolved {
            let (speed, heading, timestamp) = enrich_from_text(raw_text, anchor);
            harvested.push(DetectedCoord { lat, lng, speed, heading, timestamp, source: "numeric_pair".to_string() });
        }
    }

    harvested
}

/// Estrategia 3: grados-minutos-segundos con sufijo direccional.
///
/// Los componentes N/S se aparean con los E/W en orden de aparición.
pub fn extract_dms_pairs(raw_text: &str) -> Vec<DetectedCoord> {
    let mut latitudes: Vec<(usize, f64)> = Vec::new();
    let mut longitudes: Vec<(usize, f64)> = Vec::new();

    for captures in DMS_RE.captures_iter(raw_text) {
        let anchor = match captures.get(0) {
            Some(full_match) => full_match.start(),
            None => continue,
        };
        let degrees: f64 = match captures[1].parse() {
            Ok(value) => value,
            Err(_) => continue,
        };
        let minutes: f64 = match captures[2].parse() {
            Ok(value) => value,
            Err(_) => continue,
        };
        let seconds: f64 = match captures[3].parse() {
            Ok(value) => value,
            Err(_) => continue,
        };

        let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;

        match captures[4].to_ascii_uppercase().as_str() {
            "N" => latitudes.push((anchor, magnitude)),
            "S" => latitudes.push((anchor, -magnitude)),
            "E" => longitudes.push((anchor, magnitude)),
            "W" => longitudes.push((anchor, -magnitude)),
            _ => {}
        }
    }

    latitudes
        .iter()
        .zip(longitudes.iter())
        .filter(|((_, lat), (_, lng))| is_valid_position(*lat, *lng))
        .map(|((anchor, lat), (_, lng))| {
            let (speed, heading, timestamp) = enrich_from_text(raw_text, *anchor);
            DetectedCoord { lat: *lat, lng: *lng, speed, heading, timestamp, source: "dms".to_string() }
        })
        .collect()
}

/// Enriquecimiento posicional: para cada familia (velocidad, rumbo,
/// marca temporal) se toma el match más cercano al ancla del par.
fn enrich_from_text(raw_text: &str, anchor: usize) -> (Option<f64>, Option<f64>, Option<String>) {
    let nearest_number = |battery: &regex::Regex| -> Option<f64> {
        battery
            .captures_iter(raw_text)
            .filter_map(|captures| {
                let position = captures.get(0)?.start();
                let value: f64 = captures.get(2)?.as_str().parse().ok()?;
                Some((position.abs_diff(anchor), value))
            })
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, value)| value)
    };

    let nearest_timestamp = TIMESTAMP_VALUE_RE
        .captures_iter(raw_text)
        .filter_map(|captures| {
            let position = captures.get(0)?.start();
            let value = captures.get(2)?.as_str().trim().to_string();
            Some((position.abs_diff(anchor), value))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, value)| value);

    (nearest_number(&SPEED_VALUE_RE), nearest_number(&HEADING_VALUE_RE), nearest_timestamp)
}
