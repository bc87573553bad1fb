// [tests/mirror/libs/infra/fetchers/platform_dispatch.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE DESPACHO DE ADAPTADORES (V4.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DEL PROTOCOLO MICODUS Y DETECCIÓN TOTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. TOTALIDAD: detect_platform es función total sobre cadenas, con
 *    imagen en las cuatro etiquetas conocidas (barrido proptest).
 * 2. PROTOCOLO MICODUS: GET con cosecha de cookies, escalera de tres
 *    variantes de cuerpo, sobre ASMX {d} y mapeo de equipo, contra un
 *    portal de utilería en puerto efímero.
 * =================================================================
 */

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use centinela_infra_fetchers::{detect_platform, micodus, FetchError, Platform};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- UTILERÍA: PORTAL MICODUS LOCAL ---

#[derive(Default)]
struct FixturePortal {
    /// Variantes de cuerpo recibidas por el endpoint ASMX, en orden.
    ajax_bodies: Mutex<Vec<Value>>,
    ajax_cookie_headers: Mutex<Vec<String>>,
    landing_hits: AtomicUsize,
    /// Índice (base 1) de la variante de cuerpo que el portal acepta.
    accept_variant: AtomicUsize,
}

async fn handle_landing(State(portal): State<Arc<FixturePortal>>, headers: HeaderMap) -> impl IntoResponse {
    portal.landing_hits.fetch_add(1, Ordering::SeqCst);

    let user_agent = headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(user_agent.contains("Chrome/120"), "browser profile expected, got {user_agent}");

    (
        [(axum::http::header::SET_COOKIE, "SID=xyz; Path=/; HttpOnly")],
        "<html><body>share landing</body></html>",
    )
}

async fn handle_ajax(
    State(portal): State<Arc<FixturePortal>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    assert_eq!(
        headers.get("x-requested-with").and_then(|value| value.to_str().ok()),
        Some("XMLHttpRequest")
    );

    let cookie_line = headers
        .get("cookie")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    portal.ajax_cookie_headers.lock().unwrap().push(cookie_line);

    let mut bodies = portal.ajax_bodies.lock().unwrap();
    bodies.push(body);
    let attempt_number = bodies.len();
    drop(bodies);

    if attempt_number < portal.accept_variant.load(Ordering::SeqCst) {
        return StatusCode::BAD_REQUEST.into_response();
    }

    // El caso real del portal: 'd' es una cadena JSON-codificada.
    let device_payload =
        r#"{"lat":"20.60814","lng":"-103.49088","speed":"0.00","course":"90","positionTime":"2025-01-01 10:00:00"}"#;
    Json(json!({ "d": device_payload })).into_response()
}

async fn start_fixture_portal(accept_variant: usize) -> (Arc<FixturePortal>, SocketAddr) {
    let portal = Arc::new(FixturePortal::default());
    portal.accept_variant.store(accept_variant, Ordering::SeqCst);

    let router = Router::new()
        .route("/share", get(handle_landing))
        .route("/ajax/DevicesAjax.asmx/GetTrackingForShareStatic", post(handle_ajax))
        .with_state(portal.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("ephemeral port");
    let address = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    (portal, address)
}

// --- SUITE DE AUDITORÍA ---

/**
 * ESCENARIO S1 (mitad de portal): cookie cosechada, primera variante
 * aceptada y equipo mapeado con telemetría completa.
 */
#[tokio::test]
async fn certify_micodus_happy_path() {
    println!("\n🛰️  [INICIO]: Auditoría del protocolo Micodus V4.1...");

    let (portal, address) = start_fixture_portal(1).await;
    let http_client = reqwest::Client::new();
    let share_url = format!("http://{address}/share?access_token=ABCD1234");

    let batch = micodus::fetch(&http_client, &share_url, Duration::from_secs(15))
        .await
        .expect("micodus fetch must succeed");

    assert_eq!(batch.platform, Platform::Micodus);
    assert_eq!(batch.source, "http_micodus");
    assert_eq!(batch.coords.len(), 1);

    let coord = &batch.coords[0];
    assert_eq!(coord.lat, 20.60814);
    assert_eq!(coord.lng, -103.49088);
    assert_eq!(coord.speed, Some(0.0));
    assert_eq!(coord.heading, Some(90.0));
    assert_eq!(coord.timestamp.as_deref(), Some("2025-01-01 10:00:00"));
    assert_eq!(coord.source, "http_micodus");

    // La primera variante de cuerpo debió ganar: {access_token, s:"1"}.
    let bodies = portal.ajax_bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0], json!({ "access_token": "ABCD1234", "s": "1" }));

    // La cookie del GET viajó al POST.
    let cookies = portal.ajax_cookie_headers.lock().unwrap();
    assert!(cookies[0].contains("SID=xyz"), "cookie carry broken: {:?}", cookies[0]);
    assert_eq!(portal.landing_hits.load(Ordering::SeqCst), 1);
}

/**
 * La escalera de cuerpos degrada hasta la tercera variante {}.
 */
#[tokio::test]
async fn certify_body_ladder_degrades_in_order() {
    let (portal, address) = start_fixture_portal(3).await;
    let http_client = reqwest::Client::new();
    let share_url = format!("http://{address}/share?access_token=ABCD1234");

    let batch = micodus::fetch(&http_client, &share_url, Duration::from_secs(15))
        .await
        .expect("third variant must win");
    assert_eq!(batch.coords.len(), 1);

    let bodies = portal.ajax_bodies.lock().unwrap();
    assert_eq!(bodies.len(), 3, "exactly three ladder steps expected");
    assert_eq!(bodies[0], json!({ "access_token": "ABCD1234", "s": "1" }));
    assert_eq!(bodies[1], json!({ "access_token": "ABCD1234" }));
    assert_eq!(bodies[2], json!({}));
}

/// Sin access_token la secuencia falla antes de tocar la red.
#[tokio::test]
async fn certify_missing_access_token_fails_fast() {
    let http_client = reqwest::Client::new();
    let result = micodus::fetch(
        &http_client,
        "https://track.micodus.net/share?other=1",
        Duration::from_secs(5),
    )
    .await;

    assert!(matches!(result, Err(FetchError::MissingAccessToken)));
}

proptest! {
    /// LEY 10: detect_platform es total y jamás colapsa.
    #[test]
    fn certify_platform_detection_totality(arbitrary_input in ".{0,200}") {
        let platform = detect_platform(&arbitrary_input);
        prop_assert!(matches!(
            platform,
            Platform::Micodus | Platform::Gpswox | Platform::Traccar | Platform::Generic
        ));
    }

    /// Hosts con firma conocida jamás caen a Generic.
    #[test]
    fn certify_known_signatures_resolve(subdomain in "[a-z]{1,10}") {
        let url = format!("https://{subdomain}.micodus.net/share");
        prop_assert_eq!(detect_platform(&url), Platform::Micodus);
    }
}
