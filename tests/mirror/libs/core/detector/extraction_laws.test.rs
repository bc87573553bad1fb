// [tests/mirror/libs/core/detector/extraction_laws.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE LEYES DE EXTRACCIÓN (V3.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE IDEMPOTENCIA, ISLA NULA Y GEODESIA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. IDEMPOTENCE: detect aplicado dos veces (la segunda sobre la
 *    re-serialización de su salida) produce el mismo conjunto de pares.
 * 2. NULL ISLAND: Ninguna entrada que mencione lat 0 / lng 0 emite par.
 * 3. HAVERSINE LAWS: Simetría a 1 m y desigualdad triangular a 1 m,
 *    certificadas por barrido proptest sobre el espacio de posiciones.
 * =================================================================
 */

use centinela_core_detector::{
    dedup_coords, detect, detect_in_text, haversine_distance_meters, is_valid_position, DetectedCoord,
};
use proptest::prelude::*;

/// Re-serializa la salida del detector como material JSON de claves
/// nominales, para el segundo pase de la ley de idempotencia.
fn reserialize(coords: &[DetectedCoord]) -> String {
    let fragments: Vec<String> = coords
        .iter()
        .map(|coord| format!(r#"{{"lat":{:.6},"lng":{:.6}}}"#, coord.lat, coord.lng))
        .collect();
    format!("[{}]", fragments.join(","))
}

fn key_set(coords: &[DetectedCoord]) -> Vec<String> {
    let mut keys: Vec<String> = coords
        .iter()
        .map(|coord| format!("{:.6}|{:.6}", coord.lat, coord.lng))
        .collect();
    keys.sort();
    keys
}

#[test]
fn certify_detection_idempotence() {
    println!("\n🧪 [PROVING_GROUNDS]: Certifying detect ∘ detect = detect ...");

    let material = r#"
        {"devices":[
            {"lat":"20.60814","lng":"-103.49088","speed":"0.00"},
            {"LastLatitude":19.432608,"LastLongitude":-99.133209}
        ],
        "nota":"respaldo 25.686613, -100.316116"}
    "#;

    let first_pass = detect(material);
    assert_eq!(first_pass.len(), 3, "three distinct fixes expected");

    let second_pass = detect(&reserialize(&first_pass));
    assert_eq!(
        key_set(&first_pass),
        key_set(&second_pass),
        "IDEMPOTENCE_VIOLATION: the pair set drifted on the second pass"
    );
}

#[test]
fn certify_null_island_rejection() {
    let poisoned_inputs = [
        r#"{"lat":0.0,"lng":0.0}"#,
        r#"{"device":{"lat":"0.000","lng":"0.000","speed":"55"}}"#,
        "posicion reportada: 0.00, 0.00",
        r#"[0.0, 0.0]"#,
    ];

    for input in poisoned_inputs {
        assert!(
            detect(input).is_empty(),
            "NULL_ISLAND_LEAK: input {input:?} emitted a pair"
        );
    }
}

#[test]
fn certify_dedup_is_stable_on_six_decimals() {
    // Tres representaciones de la misma posición física.
    let material = r#"
        lat: 20.608140, lng: -103.490880
        respaldo 20.6081404, -103.4908796
        {"y":20.608140,"x":-103.490880}
    "#;

    let detected = detect_in_text(material);
    assert_eq!(detected.len(), 1, "DEDUP_DRIFT: expected one surviving fix, got {detected:?}");

    // La primera ocurrencia gana.
    assert_eq!(detected[0].source, "keyed_text");
}

#[test]
fn certify_malformed_material_never_panics() {
    let hostile_inputs = [
        "",
        "{",
        "]]]]",
        "\u{0}\u{1}\u{2}",
        &"9".repeat(5000),
        r#"{"lat":"veinte","lng":"menos ciento tres"}"#,
    ];

    for input in hostile_inputs {
        // La ley es de totalidad: cero pares, cero pánicos.
        let _ = detect(input);
    }
}

proptest! {
    /// Simetría: dist(a,b) == dist(b,a) dentro de 1 metro.
    #[test]
    fn certify_haversine_symmetry(
        lat_a in -89.0f64..89.0,
        lng_a in -179.0f64..179.0,
        lat_b in -89.0f64..89.0,
        lng_b in -179.0f64..179.0,
    ) {
        let forward = haversine_distance_meters(lat_a, lng_a, lat_b, lng_b);
        let backward = haversine_distance_meters(lat_b, lng_b, lat_a, lng_a);
        prop_assert!((forward - backward).abs() < 1.0);
    }

    /// Desigualdad triangular: dist(a,c) <= dist(a,b) + dist(b,c) + 1 m.
    #[test]
    fn certify_haversine_triangle(
        lat_a in -89.0f64..89.0, lng_a in -179.0f64..179.0,
        lat_b in -89.0f64..89.0, lng_b in -179.0f64..179.0,
        lat_c in -89.0f64..89.0, lng_c in -179.0f64..179.0,
    ) {
        let direct = haversine_distance_meters(lat_a, lng_a, lat_c, lng_c);
        let through = haversine_distance_meters(lat_a, lng_a, lat_b, lng_b)
            + haversine_distance_meters(lat_b, lng_b, lat_c, lng_c);
        prop_assert!(direct <= through + 1.0);
    }

    /// La validez jamás acepta posiciones fuera del rango físico.
    #[test]
    fn certify_validity_range(lat in -500.0f64..500.0, lng in -500.0f64..500.0) {
        if is_valid_position(lat, lng) {
            prop_assert!(lat.abs() <= 90.0 && lng.abs() <= 180.0);
            prop_assert!(!(lat.abs() < 0.01 && lng.abs() < 0.01));
        }
    }

    /// Dedup preserva orden y nunca crece.
    #[test]
    fn certify_dedup_shrinks_and_preserves_order(raw_pairs in prop::collection::vec((-89.0f64..89.0, 10.0f64..179.0), 0..24)) {
        let sequence: Vec<DetectedCoord> = raw_pairs
            .iter()
            .enumerate()
            .map(|(index, (lat, lng))| DetectedCoord {
                lat: *lat,
                lng: *lng,
                speed: None,
                heading: None,
                timestamp: None,
                source: format!("s{index}"),
            })
            .collect();

        let unique = dedup_coords(sequence.clone());
        prop_assert!(unique.len() <= sequence.len());

        // Orden relativo intacto: los índices de origen son crecientes.
        let origin_indices: Vec<usize> = unique
            .iter()
            .map(|coord| coord.source.trim_start_matches('s').parse::<usize>().unwrap())
            .collect();
        prop_assert!(origin_indices.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
