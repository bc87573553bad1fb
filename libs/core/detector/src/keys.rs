// [libs/core/detector/src/keys.rs]
/*!
 * =================================================================
 * APARATO: NOMINAL KEY BATTERY (V4.1)
 * CLASIFICACIÓN: CORE LIBRARY (ESTRATO L1)
 * RESPONSABILIDAD: VOCABULARIO DE CLAVES Y PATRONES COMPILADOS
 *
 * Las baterías de expresiones se compilan una sola vez por proceso
 * (Lazy) y cubren la deriva nominal observada en los portales:
 * lat/latitude/latitud/LastLatitude/flat/y y sus duales de longitud.
 * =================================================================
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Claves de latitud reconocidas (comparación en minúsculas).
pub const LAT_KEYS: &[&str] = &["lat", "latitude", "latitud", "lastlatitude", "flat", "y"];

/// Claves de longitud reconocidas (comparación en minúsculas).
pub const LNG_KEYS: &[&str] = &[
    "lng", "lon", "long", "longitude", "longitud", "flon", "flng", "lastlongitude", "x",
];

/// Claves de velocidad para el enriquecimiento.
pub const SPEED_KEYS: &[&str] = &["speed", "velocidad", "vel"];

/// Claves de rumbo para el enriquecimiento.
pub const HEADING_KEYS: &[&str] = &["heading", "course", "bearing", "rumbo"];

/// Claves de marca temporal para el enriquecimiento.
pub const TIMESTAMP_KEYS: &[&str] = &[
    "timestamp", "time", "fecha", "datetime", "devicetime", "gpstime", "fecha_gps", "positiontime",
];

pub fn is_lat_key(raw_key: &str) -> bool {
    LAT_KEYS.contains(&raw_key.to_ascii_lowercase().as_str())
}

pub fn is_lng_key(raw_key: &str) -> bool {
    LNG_KEYS.contains(&raw_key.to_ascii_lowercase().as_str())
}

pub fn is_speed_key(raw_key: &str) -> bool {
    SPEED_KEYS.contains(&raw_key.to_ascii_lowercase().as_str())
}

pub fn is_heading_key(raw_key: &str) -> bool {
    HEADING_KEYS.contains(&raw_key.to_ascii_lowercase().as_str())
}

pub fn is_timestamp_key(raw_key: &str) -> bool {
    TIMESTAMP_KEYS.contains(&raw_key.to_ascii_lowercase().as_str())
}

// --- BATERÍA TEXTUAL (alternativas ordenadas de mayor a menor longitud
//     para que el autómata prefiera la clave completa) ---

/// Par clave-valor de latitud en texto libre o JSON serializado.
pub static LAT_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)["']?\b(lastlatitude|latitude|latitud|flat|lat|y)\b["']?\s*[:=]\s*["']?(-?[0-9]{1,3}(?:\.[0-9]+)?)"#,
    )
    .expect("lat battery must compile")
});

/// Par clave-valor de longitud en texto libre o JSON serializado.
pub static LNG_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)["']?\b(lastlongitude|longitude|longitud|flng|flon|long|lng|lon|x)\b["']?\s*[:=]\s*["']?(-?[0-9]{1,3}(?:\.[0-9]+)?)"#,
    )
    .expect("lng battery must compile")
});

/// Par de números con dos o más decimales separados por coma, pipe o espacio.
pub static NUMERIC_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(-?[0-9]{1,3}\.[0-9]{2,})(?:\s*[,|]\s*|\s+)(-?[0-9]{1,3}\.[0-9]{2,})")
        .expect("pair battery must compile")
});

/// Componente grados-minutos-segundos con sufijo direccional.
pub static DMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)([0-9]{1,3})\s*[°º]\s*([0-9]{1,2})\s*['′]\s*([0-9]{1,2}(?:\.[0-9]+)?)\s*["″]?\s*([NSEW])"#,
    )
    .expect("dms battery must compile")
});

/// Valor de velocidad para el enriquecimiento posicional.
pub static SPEED_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)["']?\b(speed|velocidad|vel)\b["']?\s*[:=]\s*["']?(-?[0-9]+(?:\.[0-9]+)?)"#)
        .expect("speed battery must compile")
});

/// Valor de rumbo para el enriquecimiento posicional.
pub static HEADING_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)["']?\b(heading|course|bearing|rumbo)\b["']?\s*[:=]\s*["']?(-?[0-9]+(?:\.[0-9]+)?)"#)
        .expect("heading battery must compile")
});

/// Valor de marca temporal para el enriquecimiento posicional.
pub static TIMESTAMP_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)["']?\b(fecha_gps|positiontime|devicetime|gpstime|datetime|timestamp|fecha|time)\b["']?\s*[:=]\s*["']?([0-9][^"',}\]\r\n]{3,39})"#,
    )
    .expect("timestamp battery must compile")
});
