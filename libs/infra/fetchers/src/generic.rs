// [libs/infra/fetchers/src/generic.rs]
/*!
 * =================================================================
 * APARATO: GENERIC PORTAL ADAPTER (V5.1)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: EXTRACCIÓN DE ÚLTIMO RECURSO SOBRE PORTALES DESCONOCIDOS
 *
 * Escalera de tres peldaños sobre el HTML descargado:
 * 1. Enlaces de mapa con el par embebido        -> http_generic_maps
 * 2. Cuerpos <script> acotados (20..100k chars) -> http_generic_script
 * 3. HTML completo truncado a 200k chars        -> http_generic
 * Los tres peldaños se unen y deduplican.
 * =================================================================
 */

use crate::errors::{FetchError, FetchResult};
use crate::gpswox::scan_maps_links;
use crate::headers::browser_headers;
use crate::platform::Platform;
use crate::FetchedBatch;
use centinela_core_detector::{dedup_coords, detect, detect_in_text, DetectedCoord};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument};

/// Cuerpo de script inline (no-goloso, insensible a saltos de línea).
static INLINE_SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("script battery must compile")
});

/// Cota inferior de interés de un cuerpo de script.
const SCRIPT_MIN_CHARS: usize = 20;
/// Cota superior de análisis de un cuerpo de script.
const SCRIPT_MAX_CHARS: usize = 100_000;
/// Cota del barrido sobre el HTML completo.
const HTML_SCAN_MAX_CHARS: usize = 200_000;

#[instrument(skip(http_client), fields(portal = "generic"))]
pub async fn fetch(
    http_client: &Client,
    share_url: &str,
    budget: Duration,
    platform: Platform,
) -> FetchResult<FetchedBatch> {
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
    let coords = harvest_from_html(&page_html);

    info!("🌐 [GENERIC]: {} coord(s) harvested from unknown portal.", coords.len());

    Ok(FetchedBatch {
        coords,
        platform,
        source: "http_generic".to_string(),
        raw: Some(page_html),
    })
}

/// Cosecha pura de los tres peldaños (testeable sin red).
pub fn harvest_from_html(page_html: &str) -> Vec<DetectedCoord> {
    let mut harvested: Vec<DetectedCoord> = Vec::with_capacity(8);

    // Peldaño 1: enlaces de mapa.
    harvested.extend(scan_maps_links(page_html, "http_generic_maps"));

    // Peldaño 2: cuerpos de script acotados.
    for captures in INLINE_SCRIPT_RE.captures_iter(page_html) {
        let Some(script_body) = captures.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if script_body.len() < SCRIPT_MIN_CHARS || script_body.len() > SCRIPT_MAX_CHARS {
            continue;
        }
        let mut script_coords = detect(script_body);
        for coord in &mut script_coords {
            coord.source = "http_generic_script".to_string();
        }
        harvested.extend(script_coords);
    }

    // Peldaño 3: HTML completo truncado.
    let bounded_html = truncate_on_char_boundary(page_html, HTML_SCAN_MAX_CHARS);
    let mut html_coords = detect_in_text(bounded_html);
    for coord in &mut html_coords {
        coord.source = "http_generic".to_string();
    }
    harvested.extend(html_coords);

    dedup_coords(harvested)
}

/// Truncado seguro que respeta fronteras de carácter UTF-8.
fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut boundary = max_bytes;
    while boundary > 0 && !text.is_char_boundary(boundary) {
        boundary -= 1;
    }
    &text[..boundary]
}
