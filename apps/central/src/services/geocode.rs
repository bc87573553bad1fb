// [apps/central/src/services/geocode.rs]
/*!
 * =================================================================
 * APARATO: REVERSE GEOCODING HELPER (V2.1)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L4)
 * RESPONSABILIDAD: NOMBRAR UBICACIONES EN EL RASTRO DE LLAMADAS
 *
 * Auxiliar del camino de webhooks entrantes. Sin llave configurada, o
 * ante cualquier fallo, degrada a None y el rastro conserva las
 * coordenadas crudas.
 * =================================================================
 */

use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const GEOCODE_BUDGET: Duration = Duration::from_secs(10);

/// Resuelve una dirección legible para la posición, si la llave y el
/// servicio lo permiten.
pub async fn reverse_geocode(
    http_client: &reqwest::Client,
    api_key: Option<&str>,
    lat: f64,
    lng: f64,
) -> Option<String> {
    let key = api_key?;

    let response = http_client
        .get(GEOCODE_ENDPOINT)
        .query(&[("latlng", format!("{lat},{lng}")), ("key", key.to_string())])
        .timeout(GEOCODE_BUDGET)
        .send()
        .await
        .ok()?;

    if !response.status().is_success() {
        debug!("🗺️  [GEOCODE]: Service answered HTTP {}.", response.status());
        return None;
    }

    let body: Value = response.json().await.ok()?;
    let address = body
        .get("results")?
        .as_array()?
        .first()?
        .get("formatted_address")?
        .as_str()?
        .to_string();

    Some(address)
}
