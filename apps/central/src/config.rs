// [apps/central/src/config.rs]
/*!
 * =================================================================
 * APARATO: CENTRAL CONFIGURATION (V5.0 - ENV TYPED)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: CAPTURA TIPADA DEL ENTORNO DE EJECUCIÓN
 *
 * Toda opción reconocida se lee UNA vez al arranque hacia un registro
 * tipado; ningún otro estrato consulta variables de entorno. Los
 * interruptores de runtime (scheduler, detección IA) se siembran desde
 * aquí y después viven como atómicos en el estado compartido.
 * =================================================================
 */

use anyhow::Context;
use centinela_domain_escalation::VapiSettings;
use std::env;
use std::time::Duration;

/// Configuración completa del centro de mando.
#[derive(Debug, Clone)]
pub struct CentralConfig {
    pub port: u16,

    // --- CADENCIA DEL SCHEDULER ---
    pub scheduler_enabled: bool,
    pub cron_schedule: String,

    // --- DETECCIÓN IA ---
    pub ai_detection_enabled: bool,
    pub ai_detection_interval_min: i64,

    // --- PUENTE DE ALMACENAMIENTO ---
    pub api_base_url: String,
    pub api_username: String,
    pub api_password: String,

    // --- AGENTE DE VOZ ---
    pub vapi: VapiSettings,

    // --- AUXILIARES ---
    pub google_maps_api_key: Option<String>,
    pub coord_fallback_enabled: bool,
    pub fetch_timeout: Duration,
}

impl CentralConfig {
    /**
     * Hidrata la configuración desde el entorno del proceso.
     *
     * # Errors:
     * Solo las coordenadas del puente (API_BASE_URL, API_USERNAME,
     * API_PASSWORD) son obligatorias; todo lo demás tiene default.
     */
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = env::var("API_BASE_URL")
            .context("CRITICAL_FAULT: API_BASE_URL not defined in runtime environment")?;
        let api_username = env::var("API_USERNAME")
            .context("CRITICAL_FAULT: API_USERNAME not defined in runtime environment")?;
        let api_password = env::var("API_PASSWORD")
            .context("CRITICAL_FAULT: API_PASSWORD not defined in runtime environment")?;

        let vapi = VapiSettings {
            private_key: env::var("VAPI_PRIVATE_KEY").ok().filter(|key| !key.is_empty()),
            phone_number_id: env::var("VAPI_PHONE_NUMBER_ID").ok().filter(|id| !id.is_empty()),
            assistant_id: env::var("VAPI_ASSISTANT_ID").ok().filter(|id| !id.is_empty()),
            base_url: env_or("VAPI_BASE_URL", "https://api.vapi.ai"),
            ..VapiSettings::default()
        };

        Ok(Self {
            port: env_parsed("PORT", 3000),
            scheduler_enabled: env_flag("SCHEDULER_ENABLED", true),
            cron_schedule: env_or("CRON_SCHEDULE", "*/1 * * * *"),
            ai_detection_enabled: env_flag("AI_DETECTION_ENABLED", true),
            ai_detection_interval_min: env_parsed("AI_DETECTION_INTERVAL_MIN", 5),
            api_base_url,
            api_username,
            api_password,
            vapi,
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY").ok().filter(|key| !key.is_empty()),
            coord_fallback_enabled: env_flag("COORD_FALLBACK_ENABLED", true),
            fetch_timeout: Duration::from_secs(env_parsed("FETCH_TIMEOUT_SECONDS", 15)),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).ok().filter(|value| !value.is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => {
            let lowered = raw.trim().to_ascii_lowercase();
            !(lowered == "false" || lowered == "0" || lowered == "no" || lowered == "off")
        }
        Err(_) => default,
    }
}

fn env_parsed<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|raw| raw.trim().parse().ok()).unwrap_or(default)
}
