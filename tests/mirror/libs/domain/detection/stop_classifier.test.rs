// [tests/mirror/libs/domain/detection/stop_classifier.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DEL CLASIFICADOR DE PAROS (V3.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE COMPUERTAS DWELL/RADIO/VELOCIDAD
 *
 * Certifica el escenario nominal de paro confirmado (45 minutos en un
 * cluster de ~20 m a velocidad cero) y las fronteras de cada compuerta
 * del veredicto.
 * =================================================================
 */

use centinela_domain_detection::classifier::{
    classify, lookback_window_minutes, StopVerdict, MAX_STOP_SPREAD_METERS,
};
use centinela_domain_models::Coordinate;
use chrono::{Duration, TimeZone, Utc};

/// Fija el reloj de la ventana en un instante determinista.
fn fix_minutes_before_anchor(minutes_before: i64, lat: f64, lng: f64, speed: Option<f64>) -> Coordinate {
    let anchor = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    Coordinate {
        id: minutes_before,
        viaje_id: Some(42),
        proveedor_id: 7,
        lat: Some(lat),
        lng: Some(lng),
        velocidad: speed,
        rumbo: None,
        timestamp_gps: None,
        timestamp_ingesta: anchor - Duration::minutes(minutes_before),
        fuente: "http_micodus".into(),
    }
}

/// ESCENARIO S2: 10 fijaciones en 45 minutos, radio ~20 m, velocidad 0.
fn scenario_stationary_45_minutes() -> Vec<Coordinate> {
    (0..10)
        .map(|step| {
            // ~1.1 m por paso de 1e-5 grados de latitud: cluster de ~10 m.
            fix_minutes_before_anchor(step * 5, 20.608140 + (step as f64) * 1e-5, -103.490880, Some(0.0))
        })
        .collect()
}

#[test]
fn certify_confirmed_stop_scenario() {
    println!("\n🛑 [INICIO]: Auditoría del escenario de paro confirmado...");

    match classify(&scenario_stationary_45_minutes(), 30) {
        StopVerdict::Stopped { stopped_minutes, spread_meters } => {
            assert_eq!(stopped_minutes, 45, "dwell between newest and oldest fix");
            assert!(spread_meters < MAX_STOP_SPREAD_METERS);
        }
        other => panic!("CLASSIFIER_DRIFT: expected Stopped, got {other:?}"),
    }
}

#[test]
fn certify_dwell_exactly_at_threshold_confirms() {
    // Permanencia == umbral: la compuerta es estrictamente "menor que".
    let window: Vec<Coordinate> = (0..7)
        .map(|step| fix_minutes_before_anchor(step * 5, 20.608140, -103.490880, Some(0.0)))
        .collect();
    // Dwell = 30 minutos exactos con umbral 30.
    assert!(matches!(classify(&window, 30), StopVerdict::Stopped { stopped_minutes: 30, .. }));
}

#[test]
fn certify_spread_gate_boundary() {
    let mut window = scenario_stationary_45_minutes();
    // ~111 m al norte de la base: fuera del radio de 100 m.
    window.push(fix_minutes_before_anchor(46, 20.609140, -103.490880, Some(0.0)));

    match classify(&window, 30) {
        StopVerdict::Moving { spread_meters } => {
            assert!(spread_meters > MAX_STOP_SPREAD_METERS, "spread = {spread_meters}");
        }
        other => panic!("expected Moving, got {other:?}"),
    }
}

#[test]
fn certify_speed_gate_overrides_tight_cluster() {
    let mut window = scenario_stationary_45_minutes();
    window[2].velocidad = Some(40.0);
    assert!(matches!(classify(&window, 30), StopVerdict::SpeedObserved { .. }));
}

#[test]
fn certify_threshold_gate_blocks_short_dwell() {
    assert!(matches!(
        classify(&scenario_stationary_45_minutes(), 60),
        StopVerdict::BelowThreshold { dwell_minutes: 45 }
    ));
}

#[test]
fn certify_verdict_labels_for_the_control_surface() {
    assert_eq!(StopVerdict::Inconclusive { coord_count: 1 }.label(), "inconcluso");
    assert_eq!(StopVerdict::Moving { spread_meters: 250.0 }.label(), "en_movimiento");
    assert_eq!(StopVerdict::SpeedObserved { max_speed_kmh: 40.0 }.label(), "velocidad_observada");
    assert_eq!(StopVerdict::BelowThreshold { dwell_minutes: 10 }.label(), "bajo_umbral");
    assert_eq!(StopVerdict::Stopped { stopped_minutes: 45, spread_meters: 8.0 }.label(), "paro_confirmado");

    assert!(StopVerdict::Moving { spread_meters: 1.0 }.is_movement());
    assert!(StopVerdict::SpeedObserved { max_speed_kmh: 9.0 }.is_movement());
    assert!(!StopVerdict::Stopped { stopped_minutes: 45, spread_meters: 8.0 }.is_movement());
}

#[test]
fn certify_lookback_window_floor_and_scaling() {
    // Umbral típico: domina el piso de 24 horas.
    assert_eq!(lookback_window_minutes(30), 1440);
    assert_eq!(lookback_window_minutes(480), 1440);
    // Umbral extremo: domina el triple del umbral.
    assert_eq!(lookback_window_minutes(600), 1800);
}
