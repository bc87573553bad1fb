// [libs/domain/models/src/provider.rs]
/*!
 * =================================================================
 * APARATO: PROVIDER DOMAIN CONTRACT (V4.2)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN DEL PORTAL GPS DE TERCEROS
 * =================================================================
 */

use crate::wire;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Portal GPS de terceros del que se extraen coordenadas.
///
/// Invariantes: `intervalo_scrape_minutos >= 1`; un proveedor activo debe
/// tener URL. El núcleo solo escribe `ultimo_scrape` y `ultimo_error`;
/// el resto del registro pertenece a la superficie administrativa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub nombre: String,
    /// URL compartida (share link) emitida por el portal.
    pub url_base: Option<String>,
    /// Credenciales opcionales del portal.
    #[serde(default)]
    pub usuario: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Bundle de selectores para la ruta de navegador inactiva.
    /// Se conserva opaco para que la superficie administrativa lo
    /// persista sin pérdida; el núcleo jamás lo interpreta.
    #[serde(default)]
    pub selectores_login: Option<Value>,
    /// Cadencia de scrape. Mínimo un minuto.
    pub intervalo_scrape_minutos: i64,
    #[serde(deserialize_with = "wire::flexible_bool", default)]
    pub activo: bool,
    #[serde(default)]
    pub ultimo_scrape: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ultimo_error: Option<String>,
}

impl Provider {
    /// Determina si el proveedor está vencido para un nuevo ciclo.
    ///
    /// Un proveedor sin rastro de scrape previo siempre está vencido.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.ultimo_scrape {
            None => true,
            Some(last) => {
                let elapsed_minutes = (now - last).num_minutes();
                elapsed_minutes >= self.intervalo_scrape_minutos.max(1)
            }
        }
    }
}
