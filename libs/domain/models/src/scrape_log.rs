// [libs/domain/models/src/scrape_log.rs]
/*!
 * =================================================================
 * APARATO: SCRAPE LOG CONTRACT (V3.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: REGISTRO POR INTENTO DE CICLO DE PROVEEDOR
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estado del intento de scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeLogState {
    Running,
    Success,
    Error,
}

impl ScrapeLogState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeLogState::Running => "running",
            ScrapeLogState::Success => "success",
            ScrapeLogState::Error => "error",
        }
    }
}

/// Un registro por intento de ciclo de proveedor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeLog {
    pub id: i64,
    pub proveedor_id: i64,
    pub estado: ScrapeLogState,
    #[serde(default)]
    pub total_encontradas: i64,
    #[serde(default)]
    pub total_nuevas: i64,
    /// Etiquetas de fuente usadas en el ciclo, separadas por coma.
    #[serde(default)]
    pub fuentes: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub iniciado_en: DateTime<Utc>,
    #[serde(default)]
    pub finalizado_en: Option<DateTime<Utc>>,
}
