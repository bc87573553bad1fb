// [libs/infra/gateway/src/translation.rs]
/*!
 * =================================================================
 * APARATO: ROW TRANSLATION LAYER (V3.2)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: TRADUCCIÓN DE FORMAS DE FILA DEL PUENTE
 *
 * El puente envuelve algunos registros en `Fields: {clave: {Value,
 * Type}}`; hacia afuera exige `{fields: {clave: {value, type}}}` con
 * el tipo auto-detectado. Esta capa es el único punto del sistema que
 * conoce ambas formas.
 * =================================================================
 */

use serde_json::{Map, Value};

/// Aplana una fila entrante si viene con el envoltorio `Fields`.
///
/// Filas ya planas pasan intactas; envoltorios parciales o malformados
/// degradan al valor original sin colapsar.
pub fn flatten_row(raw_row: Value) -> Value {
    let Some(wrapper) = raw_row.get("Fields").and_then(Value::as_object) else {
        return raw_row;
    };

    let mut flat_entries = Map::with_capacity(wrapper.len());
    for (column_name, wrapped_cell) in wrapper {
        let cell_value = wrapped_cell.get("Value").cloned().unwrap_or(wrapped_cell.clone());
        flat_entries.insert(column_name.clone(), cell_value);
    }

    Value::Object(flat_entries)
}

/// Envuelve un mapa plano saliente en la forma `{fields: {k: {value, type}}}`.
pub fn wrap_fields(flat_fields: &Map<String, Value>) -> Value {
    let mut wrapped_entries = Map::with_capacity(flat_fields.len());

    for (column_name, cell_value) in flat_fields {
        wrapped_entries.insert(
            column_name.clone(),
            serde_json::json!({
                "value": cell_value,
                "type": detect_bridge_type(cell_value),
            }),
        );
    }

    serde_json::json!({ "fields": wrapped_entries })
}

/// Auto-detección del tipo lógico del puente para un valor JSON.
pub fn detect_bridge_type(cell_value: &Value) -> &'static str {
    match cell_value {
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_i64() || number.is_u64() => "integer",
        Value::Number(_) => "decimal",
        _ => "string",
    }
}
