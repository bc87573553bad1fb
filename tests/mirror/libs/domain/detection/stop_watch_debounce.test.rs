// [tests/mirror/libs/domain/detection/stop_watch_debounce.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE DEBOUNCE DEL VIGÍA (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE EMISIÓN ÚNICA Y SUPRESIÓN DE 60 MIN
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. EMISIÓN (S2): ventana estacionaria de 45 min sin alerta previa
 *    -> exactamente un StopEvent y un evento 'alerta_paro_ia'.
 * 2. SUPRESIÓN (S3): una llamada IA tipo 'paro' reciente suprime la
 *    emisión sin escribir nada nuevo.
 * 3. EMISIÓN ÚNICA (LEY 5): dos corridas consecutivas sobre la misma
 *    ventana emiten un solo StopEvent dentro de los 60 minutos (el
 *    propio evento de alerta es el token del segundo ciclo).
 * =================================================================
 */

use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use centinela_domain_detection::StopWatch;
use centinela_infra_gateway::repositories::{
    CallLogRepository, CoordinateRepository, TripRepository, UnitEventRepository,
};
use centinela_infra_gateway::{BridgeClient, BridgeCredentials};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// --- UTILERÍA: PUENTE LOCAL CON VENTANA ESTACIONARIA ---

#[derive(Default)]
struct FixtureBridge {
    /// S3: simula una llamada IA tipo 'paro' dentro de la ventana.
    recent_paro_call: AtomicBool,
    inserted_records: Mutex<Vec<(String, Value)>>,
}

impl FixtureBridge {
    /// Eventos 'alerta_paro_ia' ya sellados (alimentan el debounce de
    /// la segunda corrida de la LEY 5).
    fn alert_event_rows(&self) -> Vec<Value> {
        self.inserted_records
            .lock()
            .unwrap()
            .iter()
            .filter(|(table, body)| {
                table == "eventos_unidad"
                    && body.pointer("/fields/tipo_evento/value") == Some(&json!("alerta_paro_ia"))
            })
            .enumerate()
            .map(|(index, _)| json!({ "id": index as i64 + 1 }))
            .collect()
    }
}

async fn handle_login() -> impl IntoResponse {
    Json(json!({ "token": "tok-watch" }))
}

async fn handle_query(
    State(fixture): State<Arc<FixtureBridge>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let sql = body.get("sql").and_then(Value::as_str).unwrap_or_default();

    let rows = if sql.contains("FROM viajes") {
        vec![json!({
            "id": 42,
            "placas": "ABC-123-X",
            "estado": "en_ruta",
            "umbral_paro_minutos": 30,
            "llamadas_ia_activas": true
        })]
    } else if sql.contains("FROM coordenadas") {
        // Ventana S2: 10 fijaciones en 45 minutos, cluster de ~10 m,
        // velocidad cero, más nueva primero.
        (0..10)
            .map(|step| {
                json!({
                    "id": step,
                    "viaje_id": 42,
                    "proveedor_id": 7,
                    "lat": 20.608140 + (step as f64) * 1e-5,
                    "lng": -103.490880,
                    "velocidad": 0.0,
                    "timestamp_ingesta": (Utc::now() - Duration::minutes(step * 5)).to_rfc3339(),
                    "fuente": "http_micodus"
                })
            })
            .collect()
    } else if sql.contains("FROM llamadas_ia") {
        if fixture.recent_paro_call.load(Ordering::SeqCst) {
            vec![json!({ "id": 9 })]
        } else {
            Vec::new()
        }
    } else if sql.contains("SELECT id FROM eventos_unidad") {
        fixture.alert_event_rows()
    } else {
        Vec::new()
    };

    Json(json!({ "success": true, "data": rows }))
}

async fn handle_insert(
    State(fixture): State<Arc<FixtureBridge>>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut ledger = fixture.inserted_records.lock().unwrap();
    ledger.push((table, body));
    let minted_id = ledger.len() as i64;
    Json(json!({ "success": true, "data": { "id": minted_id } }))
}

async fn arm_stop_watch() -> (Arc<FixtureBridge>, StopWatch) {
    let fixture = Arc::new(FixtureBridge::default());

    let router = Router::new()
        .route("/auth/login", post(handle_login))
        .route("/query", post(handle_query))
        .route("/tables/:table/records", post(handle_insert))
        .with_state(fixture.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("ephemeral port");
    let address: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let bridge = Arc::new(
        BridgeClient::new(
            &format!("http://{address}"),
            BridgeCredentials { username: "centinela".into(), password: "secreta".into() },
        )
        .expect("client ignition"),
    );

    let watch = StopWatch::new(
        Arc::new(TripRepository::new(bridge.clone())),
        Arc::new(CoordinateRepository::new(bridge.clone())),
        Arc::new(CallLogRepository::new(bridge.clone())),
        Arc::new(UnitEventRepository::new(bridge)),
    );

    (fixture, watch)
}

fn count_alert_events(fixture: &FixtureBridge) -> usize {
    fixture
        .inserted_records
        .lock()
        .unwrap()
        .iter()
        .filter(|(table, body)| {
            table == "eventos_unidad"
                && body.pointer("/fields/tipo_evento/value") == Some(&json!("alerta_paro_ia"))
        })
        .count()
}

// --- SUITE DE AUDITORÍA ---

/**
 * ESCENARIO S2: paro confirmado, un StopEvent y un evento de alerta.
 */
#[tokio::test]
async fn certify_confirmed_stop_emits_once() {
    println!("\n🛑 [INICIO]: Auditoría S2 (emisión de paro confirmado)...");

    let (fixture, watch) = arm_stop_watch().await;
    let (stop_events, outcomes) = watch.run_detection().await.expect("detection run");

    assert_eq!(stop_events.len(), 1);
    assert_eq!(stop_events[0].trip_id, 42);
    assert_eq!(stop_events[0].stopped_minutes, 45);
    assert_eq!(stop_events[0].threshold_minutes, 30);

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].stop_emitted);
    assert!(!outcomes[0].debounced);

    assert_eq!(count_alert_events(&fixture), 1, "exactly one alerta_paro_ia sealed");
}

/**
 * ESCENARIO S3: una llamada 'paro' reciente suprime la emisión.
 */
#[tokio::test]
async fn certify_recent_paro_call_debounces() {
    let (fixture, watch) = arm_stop_watch().await;
    fixture.recent_paro_call.store(true, Ordering::SeqCst);

    let (stop_events, outcomes) = watch.run_detection().await.expect("detection run");

    assert!(stop_events.is_empty(), "no StopEvent under debounce");
    assert!(outcomes[0].debounced);
    assert!(!outcomes[0].stop_emitted);
    assert_eq!(count_alert_events(&fixture), 0, "record-only: nothing sealed");
}

/**
 * LEY 5: dos corridas consecutivas -> exactamente un StopEvent; el
 * evento de la primera corrida es el token de la segunda.
 */
#[tokio::test]
async fn certify_consecutive_runs_emit_exactly_once() {
    let (fixture, watch) = arm_stop_watch().await;

    let (first_events, _) = watch.run_detection().await.expect("first run");
    assert_eq!(first_events.len(), 1);

    let (second_events, second_outcomes) = watch.run_detection().await.expect("second run");
    assert!(second_events.is_empty(), "second run must be suppressed");
    assert!(second_outcomes[0].debounced);

    assert_eq!(count_alert_events(&fixture), 1, "one alert across both runs");
}
