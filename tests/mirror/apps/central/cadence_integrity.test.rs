// [tests/mirror/apps/central/cadence_integrity.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE CADENCIA Y GUARDIAS (V3.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DEL CRON, LA GUARDIA DE RE-ENTRADA Y
 *                  EL INTERVALO DE DETECCIÓN
 * =================================================================
 */

use centinela_central::config::CentralConfig;
use centinela_central::services::scheduler::normalize_cron_expression;
use centinela_central::state::CommandState;
use centinela_domain_escalation::VapiSettings;
use chrono::{Duration as ChronoDuration, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;

fn offline_config() -> CentralConfig {
    // El estado se construye sin tocar la red: la URL apunta a un
    // puerto muerto a propósito.
    CentralConfig {
        port: 0,
        scheduler_enabled: true,
        cron_schedule: "*/1 * * * *".to_string(),
        ai_detection_enabled: true,
        ai_detection_interval_min: 5,
        api_base_url: "http://127.0.0.1:9".to_string(),
        api_username: "centinela".to_string(),
        api_password: "secreta".to_string(),
        vapi: VapiSettings::default(),
        google_maps_api_key: None,
        coord_fallback_enabled: true,
        fetch_timeout: Duration::from_secs(5),
    }
}

/**
 * La expresión estándar de 5 campos del entorno gana la columna de
 * segundos y produce disparos con separación de un minuto.
 */
#[test]
fn certify_default_cadence_fires_every_minute() {
    let normalized = normalize_cron_expression("*/1 * * * *");
    let schedule = Schedule::from_str(&normalized).expect("normalized expression must parse");

    let mut upcoming = schedule.upcoming(Utc);
    let first_fire = upcoming.next().expect("first fire");
    let second_fire = upcoming.next().expect("second fire");

    assert_eq!((second_fire - first_fire).num_seconds(), 60);
}

#[test]
fn certify_custom_expressions_survive_normalization() {
    for raw_expression in ["*/5 * * * *", "0 */2 * * *", "30 8 * * 1-5"] {
        let normalized = normalize_cron_expression(raw_expression);
        assert!(
            Schedule::from_str(&normalized).is_ok(),
            "expression {raw_expression:?} -> {normalized:?} must parse"
        );
    }
}

/**
 * LEY 8 (mitad de estado): la guardia de re-entrada es exclusiva y
 * reutilizable tras liberarse.
 */
#[tokio::test]
async fn certify_cycle_guard_exclusivity() {
    let state = CommandState::new(offline_config()).expect("state ignition");

    assert!(!state.is_cycle_running());
    assert!(state.try_begin_cycle(), "first claim wins");
    assert!(state.is_cycle_running());
    assert!(!state.try_begin_cycle(), "second claim loses immediately");

    state.end_cycle();
    assert!(!state.is_cycle_running());
    assert!(state.try_begin_cycle(), "guard is reusable after release");
    state.end_cycle();
}

/**
 * El intervalo de detección: vencido al arranque, sellado tras la
 * corrida y vencido de nuevo al pasar el intervalo configurado.
 */
#[tokio::test]
async fn certify_detection_interval_ledger() {
    let state = CommandState::new(offline_config()).expect("state ignition");
    let now = Utc::now();

    // Sin corrida previa: siempre vencido.
    assert!(state.detection_due(now));

    // Recién sellado: dentro del intervalo de 5 minutos.
    state.record_detection(now);
    assert!(!state.detection_due(now + ChronoDuration::minutes(3)));

    // Intervalo completo transcurrido.
    assert!(state.detection_due(now + ChronoDuration::minutes(5)));
    assert_eq!(state.last_detection(), Some(now));
}
