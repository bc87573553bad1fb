// [apps/central/src/handlers/mod.rs]
/*!
 * =================================================================
 * APARATO: CONTROL SURFACE HUB (V6.0)
 * CLASIFICACIÓN: APPLICATION ADAPTERS (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE PUNTOS DE ENTRADA (HANDLERS)
 *
 * # Topología de Módulos:
 * - scraper:   Estatus y disparo manual de ciclos de scrape.
 * - scheduler: Interruptor y estatus de la cadencia.
 * - ai:        Detección IA: estatus, toggle, corrida forzada y
 *              llamada manual de verificación.
 * - webhook:   Ingesta de callbacks del agente de voz.
 *
 * Todo fallo visible se reduce al sobre JSON {success:false, error}.
 * =================================================================
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub mod ai;
pub mod scraper;
pub mod scheduler;
pub mod webhook;

/// Sobre uniforme de fallo de la superficie de control.
pub fn failure_envelope(status: StatusCode, error_message: impl AsRef<str>) -> Response {
    (status, Json(json!({ "success": false, "error": error_message.as_ref() }))).into_response()
}
