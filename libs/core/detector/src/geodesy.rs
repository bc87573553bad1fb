// [libs/core/detector/src/geodesy.rs]
/*!
 * =================================================================
 * APARATO: HAVERSINE GEODESY (V3.0)
 * CLASIFICACIÓN: CORE LIBRARY (ESTRATO L1)
 * RESPONSABILIDAD: DISTANCIAS ESFÉRICAS PARA EL ANÁLISIS DE PARO
 * =================================================================
 */

/// Radio medio terrestre en metros.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Distancia Haversine entre dos posiciones, en metros.
pub fn haversine_distance_meters(lat_a: f64, lng_a: f64, lat_b: f64, lng_b: f64) -> f64 {
    let lat_a_rad = lat_a.to_radians();
    let lat_b_rad = lat_b.to_radians();
    let delta_lat = (lat_b - lat_a).to_radians();
    let delta_lng = (lng_b - lng_a).to_radians();

    let chord = (delta_lat / 2.0).sin().powi(2)
        + lat_a_rad.cos() * lat_b_rad.cos() * (delta_lng / 2.0).sin().powi(2);

    // clamp protege contra deriva de punto flotante en pares antipodales
    let arc = 2.0 * chord.sqrt().clamp(0.0, 1.0).asin();
    EARTH_RADIUS_METERS * arc
}

/// Dispersión máxima entre pares de un conjunto de posiciones, en metros.
///
/// O(n²) sobre a lo sumo 50 fijaciones por análisis: el costo es
/// despreciable frente a cualquier viaje de red.
pub fn max_pairwise_spread_meters(positions: &[(f64, f64)]) -> f64 {
    let mut max_spread = 0.0_f64;

    for (index, first) in positions.iter().enumerate() {
        for second in positions.iter().skip(index + 1) {
            let spread = haversine_distance_meters(first.0, first.1, second.0, second.1);
            if spread > max_spread {
                max_spread = spread;
            }
        }
    }

    max_spread
}
