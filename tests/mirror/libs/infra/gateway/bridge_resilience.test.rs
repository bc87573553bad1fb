// [tests/mirror/libs/infra/gateway/bridge_resilience.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE RESILIENCIA DEL PUENTE (V4.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE SINGLE-FLIGHT, 401 Y ORDEN PARCIAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SINGLE FLIGHT: N llamadores concurrentes con token ausente
 *    producen EXACTAMENTE un login contra el puente.
 * 2. 401 RESILIENCE: Un rechazo dispara purga + refresco + un único
 *    reintento; el segundo rechazo cataloga Unauthorized.
 * 3. PARTIAL TOLERANCE: insert_many preserva el orden total y absorbe
 *    el duplicado en su posición sin colapsar el lote.
 *
 * La utilería es un puente local levantado en puerto efímero, al
 * estilo de los fixtures de humo del Proving Grounds.
 * =================================================================
 */

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use centinela_infra_gateway::{BridgeClient, BridgeCredentials, GatewayError};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// --- UTILERÍA: PUENTE LOCAL EN PUERTO EFÍMERO ---

#[derive(Default)]
struct FixtureBridge {
    login_count: AtomicUsize,
    reject_first_token: AtomicBool,
    reject_everything: AtomicBool,
    inserted_records: Mutex<Vec<(String, Value)>>,
}

async fn handle_login(State(fixture): State<Arc<FixtureBridge>>) -> impl IntoResponse {
    let minted = fixture.login_count.fetch_add(1, Ordering::SeqCst) + 1;

    // Las tres variantes históricas del endpoint de login.
    match minted % 3 {
        1 => Json(json!({ "token": format!("tok-{minted}") })).into_response(),
        2 => Json(json!({ "Token": format!("tok-{minted}") })).into_response(),
        _ => format!("tok-{minted}").into_response(),
    }
}

fn bearer_of(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

async fn handle_query(
    State(fixture): State<Arc<FixtureBridge>>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> impl IntoResponse {
    let token = bearer_of(&headers);

    if fixture.reject_everything.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if fixture.reject_first_token.load(Ordering::SeqCst) && token == "tok-1" {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    // Fila con envoltorio Fields {Value, Type} para auditar el aplanado.
    Json(json!({
        "success": true,
        "data": [{
            "Fields": {
                "id": { "Value": 42, "Type": "integer" },
                "nombre": { "Value": "Micodus Norte", "Type": "string" }
            }
        }]
    }))
    .into_response()
}

async fn handle_insert(
    State(fixture): State<Arc<FixtureBridge>>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let marker = body
        .pointer("/fields/nombre/value")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if marker == "duplicado" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "success": false, "error": "Duplicate entry 'duplicado'" })),
        )
            .into_response();
    }

    let mut ledger = fixture.inserted_records.lock().expect("fixture ledger lock");
    ledger.push((table, body));
    let minted_id = ledger.len() as i64;

    Json(json!({ "success": true, "data": { "id": minted_id } })).into_response()
}

async fn start_fixture_bridge() -> (Arc<FixtureBridge>, SocketAddr) {
    let fixture = Arc::new(FixtureBridge::default());

    let router = Router::new()
        .route("/auth/login", post(handle_login))
        .route("/query", post(handle_query))
        .route("/tables/:table/records", post(handle_insert))
        .with_state(fixture.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("ephemeral port");
    let address = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    (fixture, address)
}

fn client_for(address: SocketAddr) -> Arc<BridgeClient> {
    Arc::new(
        BridgeClient::new(
            &format!("http://{address}"),
            BridgeCredentials { username: "centinela".into(), password: "secreta".into() },
        )
        .expect("client ignition"),
    )
}

// --- SUITE DE AUDITORÍA ---

/**
 * LEY 9: N llamadores concurrentes con token vencido -> UN login.
 */
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn certify_token_refresh_single_flight() {
    println!("\n🗄️  [INICIO]: Auditoría Single-Flight del refresco de token...");

    let (fixture, address) = start_fixture_bridge().await;
    let bridge_client = client_for(address);

    let mut concurrent_callers = Vec::new();
    for _ in 0..8 {
        let caller = bridge_client.clone();
        concurrent_callers.push(tokio::spawn(async move {
            caller.query("SELECT * FROM proveedores WHERE activo = ?1", &[json!(true)]).await
        }));
    }

    for handle in concurrent_callers {
        let rows = handle.await.expect("task join").expect("query must succeed");
        assert_eq!(rows.len(), 1);
        // El envoltorio Fields llegó aplanado a fila simple.
        assert_eq!(rows[0]["id"], json!(42));
        assert_eq!(rows[0]["nombre"], json!("Micodus Norte"));
    }

    assert_eq!(
        fixture.login_count.load(Ordering::SeqCst),
        1,
        "SINGLE_FLIGHT_VIOLATION: concurrent callers triggered multiple logins"
    );
}

/**
 * Un 401 dispara purga + refresco + un reintento que debe triunfar.
 */
#[tokio::test]
async fn certify_silent_refresh_after_rejection() {
    let (fixture, address) = start_fixture_bridge().await;
    let bridge_client = client_for(address);

    // Primer viaje: acuña tok-1 y consulta con éxito.
    bridge_client.query("SELECT 1", &[]).await.expect("initial query");
    assert_eq!(fixture.login_count.load(Ordering::SeqCst), 1);

    // El puente comienza a rechazar tok-1.
    fixture.reject_first_token.store(true, Ordering::SeqCst);

    let rows = bridge_client.query("SELECT 1", &[]).await.expect("retry must succeed");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        fixture.login_count.load(Ordering::SeqCst),
        2,
        "expected exactly one silent refresh after the 401"
    );
}

/**
 * Rechazo persistente tras el reintento -> Unauthorized catalogado.
 */
#[tokio::test]
async fn certify_persistent_rejection_surfaces_unauthorized() {
    let (fixture, address) = start_fixture_bridge().await;
    let bridge_client = client_for(address);

    fixture.reject_everything.store(true, Ordering::SeqCst);

    match bridge_client.query("SELECT 1", &[]).await {
        Err(GatewayError::Unauthorized(_)) => {}
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

/**
 * insert_many: orden total preservado y duplicado absorbido en sitio.
 */
#[tokio::test]
async fn certify_insert_many_partial_tolerance() {
    let (fixture, address) = start_fixture_bridge().await;
    let bridge_client = client_for(address);

    let records: Vec<Map<String, Value>> = ["alfa", "duplicado", "gamma"]
        .iter()
        .map(|name| {
            let mut fields = Map::new();
            fields.insert("nombre".into(), json!(name));
            fields
        })
        .collect();

    let outcomes = bridge_client.insert_many("proveedores", records).await;

    assert_eq!(outcomes.len(), 3, "order and cardinality must hold");
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success, "the duplicate must fail in place");
    assert!(outcomes[1].error.as_deref().unwrap_or_default().contains("Duplicate"));
    assert!(outcomes[2].success, "records after the duplicate must still land");

    let ledger = fixture.inserted_records.lock().expect("ledger lock");
    assert_eq!(ledger.len(), 2, "only the non-duplicates reach the table");
}
