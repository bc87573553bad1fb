// [libs/infra/fetchers/src/gpswox.rs]
/*!
 * =================================================================
 * APARATO: GPSWOX HTML ADAPTER (V4.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: EXTRACCIÓN DESDE PÁGINAS COMPARTIDAS GPSWOX
 *
 * Escalera de dos peldaños: primero los enlaces
 * maps.google.com/maps?q=LAT,LNG (la forma canónica del portal) y,
 * si no aparece ninguno, el detector completo sobre el HTML.
 * =================================================================
 */

use crate::errors::{FetchError, FetchResult};
use crate::headers::browser_headers;
use crate::platform::Platform;
use crate::FetchedBatch;
use centinela_core_detector::{dedup_coords, detect_in_text, is_valid_position, DetectedCoord};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument};

/// Enlace de mapa con el par LAT,LNG embebido en la consulta.
static MAPS_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"maps\.google\.com/maps\?q=(-?[0-9]{1,3}(?:\.[0-9]+)?),(-?[0-9]{1,3}(?:\.[0-9]+)?)")
        .expect("maps link battery must compile")
});

#[instrument(skip(http_client), fields(portal = "gpswox"))]
pub async fn fetch(http_client: &Client, share_url: &str, budget: Duration) -> FetchResult<FetchedBatch> {
    let response = http_client
        .get(share_url)
        .headers(browser_headers())
        .timeout(budget)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::PortalStatus(status.as_u16()));
    }

    let page_html = response.text().await.map_err(FetchError::from_reqwest)?;
    let (coords, source) = harvest_from_html(&page_html);

    info!("🌐 [GPSWOX]: {} coord(s) via {}.", coords.len(), source);

    Ok(FetchedBatch {
        coords,
        platform: Platform::Gpswox,
        source: source.to_string(),
        raw: Some(page_html),
    })
}

/// Cosecha pura sobre el HTML (testeable sin red). Devuelve las
/// fijaciones y la etiqueta del peldaño que las produjo.
pub fn harvest_from_html(page_html: &str) -> (Vec<DetectedCoord>, &'static str) {
    let map_link_coords = scan_maps_links(page_html, "http_gpswox");
    if !map_link_coords.is_empty() {
        return (map_link_coords, "http_gpswox");
    }

    let mut fallback = detect_in_text(page_html);
    for coord in &mut fallback {
        coord.source = "http_gpswox_html".to_string();
    }
    (fallback, "http_gpswox_html")
}

/// Escanea enlaces de mapa y los convierte en fijaciones etiquetadas.
pub fn scan_maps_links(page_html: &str, source_tag: &str) -> Vec<DetectedCoord> {
    let harvested = MAPS_LINK_RE
        .captures_iter(page_html)
        .filter_map(|captures| {
            let lat: f64 = captures[1].parse().ok()?;
            let lng: f64 = captures[2].parse().ok()?;
            is_valid_position(lat, lng).then(|| DetectedCoord {
                lat,
                lng,
                speed: None,
                heading: None,
                timestamp: None,
                source: source_tag.to_string(),
            })
        })
        .collect();

    dedup_coords(harvested)
}
