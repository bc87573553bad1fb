// [libs/core/detector/src/walker.rs]
/*!
 * =================================================================
 * APARATO: NESTED STRUCTURE WALKER (V6.0)
 * CLASIFICACIÓN: CORE LIBRARY (ESTRATO L1)
 * RESPONSABILIDAD: ESTRATEGIAS 1 Y 4 SOBRE ESTRUCTURAS PARSEADAS
 *
 * Travesía iterativa (sin recursión) con tope de profundidad 10 y
 * conjunto de visitados por identidad de nodo. El tope corta payloads
 * patológicamente anidados de portales desconocidos; el conjunto de
 * visitados acota la travesía al tamaño físico del documento.
 * =================================================================
 */

use crate::keys;
use crate::{is_valid_position, DetectedCoord};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Tope de profundidad de la travesía.
const MAX_WALK_DEPTH: usize = 10;

/// Recorre la estructura en pre-orden y cosecha fijaciones de objetos
/// con claves nominales y de arreglos binarios [a, b].
pub fn walk_value(parsed_root: &Value) -> Vec<DetectedCoord> {
    let mut harvested = Vec::with_capacity(8);
    let mut visited_nodes: HashSet<usize> = HashSet::new();
    let mut traversal_stack: Vec<(&Value, usize)> = vec![(parsed_root, 0)];

    while let Some((current_node, depth)) = traversal_stack.pop() {
        if depth > MAX_WALK_DEPTH {
            continue;
        }

        let node_identity = current_node as *const Value as usize;
        if !visited_nodes.insert(node_identity) {
            continue;
        }

        match current_node {
            Value::Object(entries) => {
                if let Some(coord) = extract_from_object(entries) {
                    harvested.push(coord);
                }
                // Inserción invertida para que el pop preserve el orden del documento.
                for child in entries.values().rev() {
                    traversal_stack.push((child, depth + 1));
                }
            }
            Value::Array(items) => {
                if let Some(coord) = extract_from_binary_array(items) {
                    harvested.push(coord);
                }
                for child in items.iter().rev() {
                    traversal_stack.push((child, depth + 1));
                }
            }
            _ => {}
        }
    }

    harvested
}

/// Estrategia 1 sobre un objeto: claves nominales del propio nivel.
pub fn extract_from_object(entries: &Map<String, Value>) -> Option<DetectedCoord> {
    let mut lat_value: Option<f64> = None;
    let mut lng_value: Option<f64> = None;
    let mut speed_value: Option<f64> = None;
    let mut heading_value: Option<f64> = None;
    let mut timestamp_value: Option<String> = None;

    for (raw_key, raw_value) in entries {
        if lat_value.is_none() && keys::is_lat_key(raw_key) {
            lat_value = numeric_value(raw_value);
        } else if lng_value.is_none() && keys::is_lng_key(raw_key) {
            lng_value = numeric_value(raw_value);
        } else if speed_value.is_none() && keys::is_speed_key(raw_key) {
            speed_value = numeric_value(raw_value);
        } else if heading_value.is_none() && keys::is_heading_key(raw_key) {
            heading_value = numeric_value(raw_value);
        } else if timestamp_value.is_none() && keys::is_timestamp_key(raw_key) {
            timestamp_value = textual_value(raw_value);
        }
    }

    let (lat, lng) = (lat_value?, lng_value?);
    if !is_valid_position(lat, lng) {
        return None;
    }

    Some(DetectedCoord {
        lat,
        lng,
        speed: speed_value,
        heading: heading_value,
        timestamp: timestamp_value,
        source: "object_walk".to_string(),
    })
}

/// Estrategia 4: arreglo de exactamente dos numéricos [a, b].
/// Se intenta (lat=a, lng=b) y después el par invertido.
fn extract_from_binary_array(items: &[Value]) -> Option<DetectedCoord> {
    if items.len() != 2 {
        return None;
    }

    let first = numeric_value(&items[0])?;
    let second = numeric_value(&items[1])?;

    let (lat, lng) = if is_valid_position(first, second) {
        (first, second)
    } else if is_valid_position(second, first) {
        (second, first)
    } else {
        return None;
    };

    Some(DetectedCoord {
        lat,
        lng,
        speed: None,
        heading: None,
        timestamp: None,
        source: "array_pair".to_string(),
    })
}

/// Valor numérico tolerante: número JSON o cadena numérica.
fn numeric_value(raw_value: &Value) -> Option<f64> {
    match raw_value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Valor textual para marcas temporales: cadena o número epoch.
fn textual_value(raw_value: &Value) -> Option<String> {
    match raw_value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
