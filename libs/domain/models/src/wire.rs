// [libs/domain/models/src/wire.rs]
/*!
 * =================================================================
 * APARATO: TOLERANT WIRE DECODERS (V2.1)
 * CLASIFICACIÓN: DOMAIN SUPPORT (ESTRATO L2)
 * RESPONSABILIDAD: DESERIALIZACIÓN FLEXIBLE DE TIPOS DE PORTAL
 *
 * Los portales de terceros y el puente de almacenamiento no garantizan
 * tipos JSON canónicos: los booleanos llegan como 0/1 o "true", y los
 * números como cadenas ("20.60814"). Estos decodificadores absorben esa
 * deriva en la frontera para que el dominio opere con tipos firmes.
 * =================================================================
 */

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodifica un booleano tolerando 0/1, "0"/"1", "true"/"false" y null.
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw_value = Value::deserialize(deserializer)?;
    Ok(value_as_bool(&raw_value))
}

/// Decodifica un f64 opcional tolerando números, cadenas numéricas y null.
pub fn flexible_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw_value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&raw_value))
}

/// Interpretación booleana de un nodo JSON arbitrario.
pub fn value_as_bool(raw_value: &Value) -> bool {
    match raw_value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(text) => {
            let lowered = text.trim().to_ascii_lowercase();
            lowered == "true" || lowered == "1" || lowered == "t" || lowered == "si" || lowered == "sí"
        }
        _ => false,
    }
}

/// Interpretación numérica de un nodo JSON arbitrario.
pub fn value_as_f64(raw_value: &Value) -> Option<f64> {
    match raw_value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}
