// [libs/infra/fetchers/src/micodus.rs]
/*!
 * =================================================================
 * APARATO: MICODUS AJAX ADAPTER (V7.0 - BINARY COMPATIBLE)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PROTOCOLO ASMX DEL PORTAL MICODUS
 *
 * Secuencia compatible bit-a-bit con el portal existente:
 * 1. Extraer access_token de la URL compartida (falla si falta).
 * 2. GET con perfil de navegador, cosechando los Set-Cookie.
 * 3. POST al endpoint ASMX con tres variantes de cuerpo en escalera:
 *    {access_token, s:"1"} -> {access_token} -> {}. Gana la primera
 *    respuesta 2xx con cuerpo no vacío.
 * 4. Desenvolver el sobre {d: ...} (donde d puede ser a su vez una
 *    cadena JSON-codificada). Se acepta objeto o arreglo de equipos.
 * 5. Mapear cada equipo con el walker del detector, propagando
 *    positionTime, course->rumbo, isStop, batería, señal y satélites.
 * =================================================================
 */

use crate::errors::{FetchError, FetchResult};
use crate::headers::browser_headers;
use crate::platform::Platform;
use crate::FetchedBatch;
use centinela_core_detector::{dedup_coords, detect_in_value, DetectedCoord};
use reqwest::header::{HeaderValue, COOKIE, REFERER, SET_COOKIE};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Ruta fija del endpoint de rastreo compartido del portal.
const ASMX_TRACKING_PATH: &str = "/ajax/DevicesAjax.asmx/GetTrackingForShareStatic";

/// Etiqueta de origen de toda fijación extraída por este adaptador.
const SOURCE_TAG: &str = "http_micodus";

#[instrument(skip(http_client), fields(portal = "micodus"))]
pub async fn fetch(http_client: &Client, share_url: &str, budget: Duration) -> FetchResult<FetchedBatch> {
    let parsed_url = url::Url::parse(share_url).map_err(|fault| FetchError::InvalidUrl(fault.to_string()))?;

    // 1. ADQUISICIÓN DEL TOKEN DE ACCESO
    let access_token = parsed_url
        .query_pairs()
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.to_string())
        .filter(|token| !token.is_empty())
        .ok_or(FetchError::MissingAccessToken)?;

    // 2. GET INICIAL CON PERFIL DE NAVEGADOR (COSECHA DE COOKIES)
    let landing_response = http_client
        .get(share_url)
        .headers(browser_headers())
        .timeout(budget)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let session_cookies = harvest_cookies(landing_response.headers());
    debug!("🛰️  [MICODUS]: Landing GET {} with {} session cookie(s).", landing_response.status(), session_cookies.split("; ").filter(|c| !c.is_empty()).count());

    let portal_origin = format!(
        "{}://{}",
        parsed_url.scheme(),
        parsed_url.host_str().ok_or_else(|| FetchError::InvalidUrl("HOST_VOID".into()))?
    );
    let ajax_endpoint = format!("{portal_origin}{ASMX_TRACKING_PATH}");

    // 3. ESCALERA DE VARIANTES DE CUERPO
    let body_ladder = [
        json!({ "access_token": access_token, "s": "1" }),
        json!({ "access_token": access_token }),
        json!({}),
    ];

    let mut winning_body: Option<String> = None;

    for (variant_index, body_variant) in body_ladder.iter().enumerate() {
        let mut request = http_client
            .post(&ajax_endpoint)
            .headers(browser_headers())
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, share_url)
            .timeout(budget)
            .json(body_variant);

        if !session_cookies.is_empty() {
            if let Ok(cookie_value) = HeaderValue::from_str(&session_cookies) {
                request = request.header(COOKIE, cookie_value);
            }
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                let body_text = response.text().await.map_err(FetchError::from_reqwest)?;
                if !body_text.trim().is_empty() {
                    debug!("🛰️  [MICODUS]: Body variant {} accepted by the portal.", variant_index);
                    winning_body = Some(body_text);
                    break;
                }
            }
            Ok(response) => {
                debug!("🛰️  [MICODUS]: Body variant {} rejected (HTTP {}).", variant_index, response.status());
            }
            Err(fault) => {
                warn!("🛰️  [MICODUS]: Body variant {} transport fault: {}.", variant_index, fault);
            }
        }
    }

    let raw_body = winning_body.ok_or(FetchError::EmptyResponse)?;

    // 4-5. SOBRE ASMX + MAPEO DE EQUIPOS
    let devices = unwrap_asmx_envelope(&raw_body);
    let coords: Vec<DetectedCoord> = devices.iter().filter_map(map_device).collect();

    info!("🛰️  [MICODUS]: {} device(s) -> {} coord(s) extracted.", devices.len(), coords.len());

    Ok(FetchedBatch {
        coords: dedup_coords(coords),
        platform: Platform::Micodus,
        source: SOURCE_TAG.to_string(),
        raw: Some(raw_body),
    })
}

/// Cosecha los pares nombre=valor de todos los Set-Cookie recibidos.
pub fn harvest_cookies(headers: &reqwest::header::HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|raw| raw.to_str().ok())
        .filter_map(|cookie_line| cookie_line.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/**
 * Desenvuelve el sobre ASMX `{d: ...}`, donde `d` puede ser el nodo
 * directo o una cadena JSON-codificada. Devuelve la lista de equipos:
 * un objeto suelto cuenta como lista de uno. Material ilegible degrada
 * a lista vacía, jamás a error.
 */
pub fn unwrap_asmx_envelope(raw_body: &str) -> Vec<Value> {
    let Ok(parsed) = serde_json::from_str::<Value>(raw_body) else {
        return Vec::new();
    };

    let inner = match parsed.get("d") {
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(decoded) => decoded,
            Err(_) => return Vec::new(),
        },
        Some(direct_node) => direct_node.clone(),
        None => parsed,
    };

    match inner {
        Value::Array(items) => items,
        Value::Object(_) => vec![inner],
        _ => Vec::new(),
    }
}

/**
 * Mapea un equipo del portal a una fijación usando el walker del
 * detector, propagando la telemetría auxiliar del protocolo Micodus.
 */
pub fn map_device(device: &Value) -> Option<DetectedCoord> {
    let mut coord = detect_in_value(device).into_iter().next()?;
    coord.source = SOURCE_TAG.to_string();

    // isStop aplasta la velocidad ausente: el portal lo reporta cuando
    // el equipo está físicamente detenido.
    let is_stopped = bool_field(device, &["isStop", "is_stop", "stopped"]);
    if coord.speed.is_none() && is_stopped == Some(true) {
        coord.speed = Some(0.0);
    }

    let battery = num_field(device, &["battery", "bateria", "batteryLevel"]);
    let signal = num_field(device, &["signal", "gsm", "signalLevel"]);
    let satellites = num_field(device, &["satellites", "sat", "gpsCount"]);

    if battery.is_some() || signal.is_some() || satellites.is_some() {
        debug!(
            "🛰️  [MICODUS]: Device telemetry -> battery {:?}, signal {:?}, satellites {:?}.",
            battery, signal, satellites
        );
    }

    Some(coord)
}

fn num_field(device: &Value, aliases: &[&str]) -> Option<f64> {
    for alias in aliases {
        if let Some(found) = lookup_ci(device, alias) {
            match found {
                Value::Number(number) => return number.as_f64(),
                Value::String(text) => {
                    if let Ok(parsed) = text.trim().parse::<f64>() {
                        return Some(parsed);
                    }
                }
                _ => {}
            }
        }
    }
    None
}

fn bool_field(device: &Value, aliases: &[&str]) -> Option<bool> {
    for alias in aliases {
        if let Some(found) = lookup_ci(device, alias) {
            match found {
                Value::Bool(flag) => return Some(*flag),
                Value::Number(number) => return number.as_f64().map(|n| n != 0.0),
                Value::String(text) => {
                    let lowered = text.trim().to_ascii_lowercase();
                    return Some(lowered == "true" || lowered == "1");
                }
                _ => {}
            }
        }
    }
    None
}

/// Búsqueda de clave sin distinguir mayúsculas en el primer nivel.
fn lookup_ci<'a>(device: &'a Value, target_key: &str) -> Option<&'a Value> {
    let entries = device.as_object()?;
    entries
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(target_key))
        .map(|(_, value)| value)
}
