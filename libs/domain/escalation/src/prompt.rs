// [libs/domain/escalation/src/prompt.rs]
/*!
 * =================================================================
 * APARATO: VOICE AGENT PROMPT FORGE (V4.2)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: PROMPT DEL SISTEMA Y MENSAJES DE APERTURA/CIERRE
 *
 * Plantilla con rama por idioma (es/en) construida desde un registro
 * tipado de parámetros; jamás se concatena material del usuario hacia
 * el estrato SQL. Las instrucciones del protocolo se anexan verbatim
 * al final del prompt.
 * =================================================================
 */

use centinela_domain_models::ContactRole;

/// Identidad corporativa declarada por el agente de voz.
pub const COMPANY_IDENTITY: &str = "Centinela Logística";

/// Parámetros tipados del prompt del sistema.
#[derive(Debug, Clone)]
pub struct PromptParams<'a> {
    pub language: &'a str,
    pub trip_id: i64,
    /// Placas o contenedor de la unidad.
    pub unit_label: &'a str,
    pub stopped_minutes: i64,
    pub threshold_minutes: i64,
    pub lat: f64,
    pub lng: f64,
    /// Instrucciones libres del protocolo IA, anexadas verbatim.
    pub custom_instructions: Option<&'a str>,
}

/// Prompt del sistema con rama por idioma.
pub fn build_system_prompt(params: &PromptParams<'_>) -> String {
    let mut prompt = if params.language.starts_with("en") {
        format!(
            "You are a voice assistant for {company}, a fleet monitoring center.\n\
             Trip {trip_id}, unit {unit}. The unit has been stopped for {minutes} minutes \
             (configured threshold: {threshold} minutes) near {lat:.4}, {lng:.4}.\n\
             \n\
             Behavior:\n\
             - Introduce yourself and the company.\n\
             - Inform the contact about the detected stop.\n\
             - Ask what the current situation is.\n\
             - Ask for an estimated time to resume the route.\n\
             - Say goodbye politely and end the call.\n\
             \n\
             Rules:\n\
             - Be brief and professional.\n\
             - Do not read the exact coordinates aloud.\n\
             - If the contact reports an emergency, state that support is being engaged immediately.\n\
             - Speak clearly and confirm any commitment given.",
            company = COMPANY_IDENTITY,
            trip_id = params.trip_id,
            unit = params.unit_label,
            minutes = params.stopped_minutes,
            threshold = params.threshold_minutes,
            lat = params.lat,
            lng = params.lng,
        )
    } else {
        format!(
            "Eres un asistente de voz de {company}, centro de monitoreo de flota.\n\
             Viaje {trip_id}, unidad {unit}. La unidad lleva {minutes} minutos detenida \
             (umbral configurado: {threshold} minutos) cerca de {lat:.4}, {lng:.4}.\n\
             \n\
             Comportamiento:\n\
             - Preséntate e identifica a la empresa.\n\
             - Informa al contacto sobre la detención detectada.\n\
             - Pregunta cuál es la situación actual.\n\
             - Pregunta el tiempo estimado para retomar la ruta.\n\
             - Despídete con cortesía y termina la llamada.\n\
             \n\
             Reglas:\n\
             - Sé breve y profesional.\n\
             - No leas las coordenadas exactas en voz alta.\n\
             - Si el contacto reporta una emergencia, indica que se está activando apoyo de inmediato.\n\
             - Usa español mexicano, claro y directo.",
            company = COMPANY_IDENTITY,
            trip_id = params.trip_id,
            unit = params.unit_label,
            minutes = params.stopped_minutes,
            threshold = params.threshold_minutes,
            lat = params.lat,
            lng = params.lng,
        )
    };

    if let Some(instructions) = params.custom_instructions.filter(|text| !text.trim().is_empty()) {
        prompt.push_str("\n\nInstrucciones adicionales del protocolo:\n");
        prompt.push_str(instructions);
    }

    prompt
}

/// Saludo de apertura con rol y minutos de detención.
pub fn first_message(language: &str, role: ContactRole, unit_label: &str, stopped_minutes: i64) -> String {
    if language.starts_with("en") {
        format!(
            "Hello, I'm calling from {COMPANY_IDENTITY} for the {role} of unit {unit_label}. \
             We detected that the unit has been stopped for {stopped_minutes} minutes.",
            role = role.as_str(),
        )
    } else {
        format!(
            "Hola, le llamo de {COMPANY_IDENTITY}; busco al {role} de la unidad {unit_label}. \
             Detectamos que la unidad lleva {stopped_minutes} minutos detenida.",
            role = role.as_str(),
        )
    }
}

/// Prompt del sistema para llamadas manuales de verificación.
pub fn verification_prompt(
    language: &str,
    trip_id: i64,
    unit_label: &str,
    custom_message: Option<&str>,
) -> String {
    let mut prompt = if language.starts_with("en") {
        format!(
            "You are a voice assistant for {COMPANY_IDENTITY}, a fleet monitoring center.\n\
             This is a manual status-verification call for trip {trip_id}, unit {unit_label}.\n\
             Introduce yourself, ask how the route is going and whether any support is needed, \
             then say goodbye politely. Be brief and professional."
        )
    } else {
        format!(
            "Eres un asistente de voz de {COMPANY_IDENTITY}, centro de monitoreo de flota.\n\
             Esta es una llamada manual de verificación de estatus del viaje {trip_id}, unidad {unit_label}.\n\
             Preséntate, pregunta cómo va la ruta y si se requiere algún apoyo, \
             y despídete con cortesía. Sé breve y profesional. Usa español mexicano."
        )
    };

    if let Some(message) = custom_message.filter(|text| !text.trim().is_empty()) {
        prompt.push_str("\n\nMensaje del centro de monitoreo:\n");
        prompt.push_str(message);
    }

    prompt
}

/// Saludo de apertura de una llamada de verificación.
pub fn verification_first_message(language: &str, role: ContactRole, unit_label: &str) -> String {
    if language.starts_with("en") {
        format!(
            "Hello, I'm calling from {COMPANY_IDENTITY} for the {role} of unit {unit_label}, \
             to verify the status of the route.",
            role = role.as_str(),
        )
    } else {
        format!(
            "Hola, le llamo de {COMPANY_IDENTITY}; busco al {role} de la unidad {unit_label} \
             para verificar el estatus de la ruta.",
            role = role.as_str(),
        )
    }
}

/// Mensaje de cierre según idioma.
pub fn end_call_message(language: &str) -> String {
    if language.starts_with("en") {
        "Thank you for the information. We will keep monitoring the unit. Goodbye.".to_string()
    } else {
        "Gracias por la información. Seguiremos monitoreando la unidad. Hasta luego.".to_string()
    }
}
