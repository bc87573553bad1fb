// [libs/domain/escalation/src/phone.rs]
/*!
 * =================================================================
 * APARATO: E.164 PHONE NORMALIZER (V3.1)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: NORMALIZACIÓN DE TELÉFONOS DE CONTACTO
 *
 * Política México-default: un número de 10 dígitos sin prefijo es
 * nacional y recibe +52; todo lo demás conserva sus dígitos con el
 * prefijo '+'. Los números ya prefijados pasan intactos.
 * =================================================================
 */

/// Lada nacional por defecto de la flota.
const MEXICO_COUNTRY_CODE: &str = "52";

/// Dígitos de un número nacional mexicano sin lada.
const NATIONAL_NUMBER_DIGITS: usize = 10;

/// Normaliza un teléfono arbitrario al formato E.164.
pub fn normalize_phone_e164(raw_phone: &str) -> String {
    let trimmed = raw_phone.trim();
    let already_prefixed = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if already_prefixed {
        return format!("+{digits}");
    }

    if digits.len() == NATIONAL_NUMBER_DIGITS {
        return format!("+{MEXICO_COUNTRY_CODE}{digits}");
    }

    format!("+{digits}")
}
