// [libs/infra/fetchers/src/platform.rs]
/*!
 * =================================================================
 * APARATO: PLATFORM DETECTION TABLE (V3.1)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CLASIFICACIÓN TOTAL DE URLs DE PORTAL
 *
 * Función total sobre cadenas: toda entrada, aun ilegible como URL,
 * resuelve a una de las cuatro etiquetas conocidas. Traccar es una
 * etiqueta reservada que hoy enruta al adaptador genérico.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use url::Url;

/// Plataformas de portal conocidas por el despachador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Micodus,
    Gpswox,
    Traccar,
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Micodus => "micodus",
            Platform::Gpswox => "gpswox",
            Platform::Traccar => "traccar",
            Platform::Generic => "generic",
        }
    }
}

/// Tabla ordenada de firmas de host. La primera coincidencia gana.
const HOST_SIGNATURES: &[(&str, Platform)] = &[
    ("micodus", Platform::Micodus),
    ("gpswox", Platform::Gpswox),
    ("traccar", Platform::Traccar),
];

/// Clasifica una URL compartida por subcadena del host, sin distinguir
/// mayúsculas. Entradas ilegibles caen al host-menos-probable: la
/// cadena completa, preservando la totalidad de la función.
pub fn detect_platform(share_url: &str) -> Platform {
    let lowered_host = Url::parse(share_url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_ascii_lowercase()))
        .unwrap_or_else(|| share_url.to_ascii_lowercase());

    for (signature, platform) in HOST_SIGNATURES {
        if lowered_host.contains(signature) {
            return *platform;
        }
    }

    Platform::Generic
}
