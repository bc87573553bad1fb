// [tests/mirror/libs/domain/escalation/chain_handoff.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE CADENA Y HAND-OFF (V5.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DEL ORDEN DE ESCALAMIENTO Y DEL
 *                  CONTEXTO CONVERSACIONAL ENTRE LLAMADAS
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. ORDEN (LEY 6): La secuencia de llamadas respeta
 *    [operador, coordinador1..3, cliente] sin saltos cuando el
 *    contacto existe.
 * 2. HAND-OFF (LEY 7): El resumen del operador viaja VERBATIM al
 *    motivo del coordinador; su silencio se declara con 'no contestó'.
 * 3. E.164 (S6): Los teléfonos nacionales reciben +52 antes de marcar.
 *
 * El puente es utilería local (puerto efímero) y el marcador es un
 * guion determinista por rol.
 * =================================================================
 */

use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use centinela_domain_detection::StopEvent;
use centinela_domain_escalation::{
    normalize_phone_e164, CallRequest, CallResult, EscalationEngine, EscalationError, VoiceDialer,
};
use centinela_domain_models::{CallOutcome, ContactRole, Trip};
use centinela_infra_gateway::repositories::{
    CallLogRepository, ContactRepository, ProtocolRepository, UnitEventRepository,
};
use centinela_infra_gateway::{BridgeClient, BridgeCredentials};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

// --- UTILERÍA: PUENTE LOCAL ---

#[derive(Default)]
struct FixtureBridge {
    contact_rows: Mutex<Vec<Value>>,
    inserted_records: Mutex<Vec<(String, Value)>>,
}

async fn handle_login() -> impl IntoResponse {
    Json(json!({ "token": "tok-escalation" }))
}

async fn handle_query(
    State(fixture): State<Arc<FixtureBridge>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let sql = body.get("sql").and_then(Value::as_str).unwrap_or_default();

    let rows = if sql.contains("FROM contactos") {
        fixture.contact_rows.lock().unwrap().clone()
    } else {
        // protocolos_ia vacío -> default embebido de flota (idioma es).
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

async fn start_fixture_bridge(contact_rows: Vec<Value>) -> (Arc<FixtureBridge>, SocketAddr) {
    let fixture = Arc::new(FixtureBridge {
        contact_rows: Mutex::new(contact_rows),
        inserted_records: Mutex::new(Vec::new()),
    });

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

// --- UTILERÍA: MARCADOR DE GUION DETERMINISTA ---

struct ScriptedDialer {
    placed_requests: Arc<Mutex<Vec<CallRequest>>>,
    script: HashMap<ContactRole, (bool, Option<String>)>,
}

impl VoiceDialer for ScriptedDialer {
    fn place_call(
        &self,
        request: &CallRequest,
    ) -> impl Future<Output = Result<CallResult, EscalationError>> + Send {
        self.placed_requests.lock().unwrap().push(request.clone());

        let (answered, summary) = self
            .script
            .get(&request.role)
            .cloned()
            .unwrap_or((false, None));

        async move {
            Ok(CallResult {
                answered,
                outcome: if answered { CallOutcome::Atendida } else { CallOutcome::NoAtendida },
                duration_seconds: None,
                summary,
                external_call_id: Some(format!("mock-{}", answered)),
            })
        }
    }
}

// --- CONSTRUCCIÓN DEL ESCENARIO ---

fn contact_row(id: i64, role: &str, phone: &str) -> Value {
    json!({ "id": id, "viaje_id": 42, "rol": role, "nombre": format!("Contacto {role}"), "telefono": phone, "activo": true })
}

fn stop_event_for_trip_42() -> StopEvent {
    let trip: Trip = serde_json::from_value(json!({
        "id": 42,
        "placas": "ABC-123-X",
        "operador": "Juan Pérez",
        "estado": "en_ruta",
        "umbral_paro_minutos": 30,
        "llamadas_ia_activas": true,
        "origen": "Guadalajara",
        "destino": "CDMX"
    }))
    .expect("trip fixture");

    StopEvent {
        trip_id: 42,
        trip,
        stopped_minutes: 45,
        threshold_minutes: 30,
        last_lat: 20.60814,
        last_lng: -103.49088,
        last_coord_time: Some("2025-01-01 10:00:00".into()),
        coord_count: 10,
    }
}

async fn engine_over(
    address: SocketAddr,
    script: HashMap<ContactRole, (bool, Option<String>)>,
) -> (EscalationEngine<ScriptedDialer>, Arc<Mutex<Vec<CallRequest>>>) {
    let bridge = Arc::new(
        BridgeClient::new(
            &format!("http://{address}"),
            BridgeCredentials { username: "centinela".into(), password: "secreta".into() },
        )
        .expect("client ignition"),
    );

    let placed_requests = Arc::new(Mutex::new(Vec::new()));
    let dialer = ScriptedDialer { placed_requests: placed_requests.clone(), script };

    let engine = EscalationEngine::new(
        Arc::new(ContactRepository::new(bridge.clone())),
        Arc::new(ProtocolRepository::new(bridge.clone())),
        Arc::new(CallLogRepository::new(bridge.clone())),
        Arc::new(UnitEventRepository::new(bridge)),
        dialer,
    );

    (engine, placed_requests)
}

// --- SUITE DE AUDITORÍA ---

/**
 * ESCENARIO S4: el operador contesta; su resumen viaja verbatim al
 * coordinador, que contesta y termina la cadena (cliente intacto).
 */
#[tokio::test]
async fn certify_handoff_with_operator_answer() {
    println!("\n📞 [INICIO]: Auditoría S4 (hand-off con operador atendido)...");

    let (fixture, address) = start_fixture_bridge(vec![
        contact_row(1, "operador", "5500000001"),
        contact_row(2, "coordinador1", "5500000002"),
        contact_row(3, "cliente", "5500000003"),
    ])
    .await;

    let mut script = HashMap::new();
    script.insert(ContactRole::Operador, (true, Some("Ponchadura de llanta, 40 min".to_string())));
    script.insert(ContactRole::Coordinador1, (true, None));

    let (engine, placed_requests) = engine_over(address, script).await;
    let report = engine.escalate_stop(&stop_event_for_trip_42()).await.expect("chain must run");

    // Orden y alcance de la cadena.
    let requests = placed_requests.lock().unwrap();
    let dialed_roles: Vec<ContactRole> = requests.iter().map(|request| request.role).collect();
    assert_eq!(dialed_roles, vec![ContactRole::Operador, ContactRole::Coordinador1]);
    assert_eq!(report.halted_by, Some(ContactRole::Coordinador1));

    // S6 integrado: normalización antes de marcar.
    assert_eq!(requests[0].phone_e164, "+525500000001");

    // LEY 7: el resumen del operador viaja VERBATIM.
    assert!(requests[1].motive.contains("Ponchadura de llanta, 40 min"));
    assert!(requests[1].motive.contains("Ya se llamó al operador y dijo:"));

    // Rastro persistido: 2 llamadas tipo paro, en orden.
    let ledger = fixture.inserted_records.lock().unwrap();
    let call_rows: Vec<&Value> = ledger
        .iter()
        .filter(|(table, _)| table == "llamadas_ia")
        .map(|(_, body)| body)
        .collect();
    assert_eq!(call_rows.len(), 2);
    assert_eq!(call_rows[0].pointer("/fields/rol_destinatario/value"), Some(&json!("operador")));
    assert_eq!(call_rows[1].pointer("/fields/rol_destinatario/value"), Some(&json!("coordinador1")));
    assert_eq!(call_rows[0].pointer("/fields/tipo/value"), Some(&json!("paro")));
    assert!(call_rows[1]
        .pointer("/fields/motivo/value")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("Ponchadura de llanta, 40 min"));

    // Bitácora: detencion_detectada + llamada_ia_operador + llamada_ia_coordinador.
    let event_types: Vec<&str> = ledger
        .iter()
        .filter(|(table, _)| table == "eventos_unidad")
        .filter_map(|(_, body)| body.pointer("/fields/tipo_evento/value").and_then(Value::as_str))
        .collect();
    assert_eq!(event_types, vec!["detencion_detectada", "llamada_ia_operador", "llamada_ia_coordinador"]);
}

/**
 * ESCENARIO S5: el operador NO contesta; el coordinador recibe el
 * aviso, contesta, y el cliente queda sin marcar.
 */
#[tokio::test]
async fn certify_handoff_when_operator_does_not_answer() {
    let (fixture, address) = start_fixture_bridge(vec![
        contact_row(1, "operador", "5500000001"),
        contact_row(2, "coordinador1", "5500000002"),
        contact_row(3, "cliente", "5500000003"),
    ])
    .await;

    let mut script = HashMap::new();
    script.insert(ContactRole::Operador, (false, None));
    script.insert(ContactRole::Coordinador1, (true, None));

    let (engine, placed_requests) = engine_over(address, script).await;
    let report = engine.escalate_stop(&stop_event_for_trip_42()).await.expect("chain must run");

    let requests = placed_requests.lock().unwrap();
    assert_eq!(requests.len(), 2, "cliente must remain undialed");
    assert!(requests[1].motive.contains("no contestó"));
    assert!(requests[1].motive.contains("infórmale al coordinador"));
    assert_eq!(report.halted_by, Some(ContactRole::Coordinador1));

    let ledger = fixture.inserted_records.lock().unwrap();
    let call_count = ledger.iter().filter(|(table, _)| table == "llamadas_ia").count();
    assert_eq!(call_count, 2, "both calls recorded");
}

/**
 * LEY 6: con los cinco roles presentes y nadie contestando, la
 * secuencia completa respeta el orden fijo sin saltos.
 */
#[tokio::test]
async fn certify_full_chain_order_without_answers() {
    let (_fixture, address) = start_fixture_bridge(vec![
        // Desordenados a propósito: el repositorio impone el orden.
        contact_row(5, "cliente", "5500000005"),
        contact_row(3, "coordinador2", "5500000003"),
        contact_row(1, "operador", "5500000001"),
        contact_row(4, "coordinador3", "5500000004"),
        contact_row(2, "coordinador1", "5500000002"),
        // Fuera de la cadena: jamás debe marcarse.
        contact_row(6, "propietario", "5500000006"),
    ])
    .await;

    let (engine, placed_requests) = engine_over(address, HashMap::new()).await;
    let report = engine.escalate_stop(&stop_event_for_trip_42()).await.expect("chain must run");

    let requests = placed_requests.lock().unwrap();
    let dialed_roles: Vec<ContactRole> = requests.iter().map(|request| request.role).collect();
    assert_eq!(dialed_roles, ContactRole::ESCALATION_ORDER.to_vec());
    assert_eq!(report.halted_by, None);
}

/// ESCENARIO S6: tabla literal de normalización E.164.
#[test]
fn certify_phone_normalization_table() {
    assert_eq!(normalize_phone_e164("5500000001"), "+525500000001");
    assert_eq!(normalize_phone_e164("525500000001"), "+525500000001");
    assert_eq!(normalize_phone_e164("+15551234567"), "+15551234567");
    assert_eq!(normalize_phone_e164("(55) 0000-0002"), "+525500000002");
}
