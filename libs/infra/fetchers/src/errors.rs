// [libs/infra/fetchers/src/errors.rs]
/*!
 * =================================================================
 * APARATO: FETCHER ERROR CATALOG (V3.0)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE PORTAL
 *
 * Un fallo de adaptador viaja íntegro al coordinador, que lo trata
 * como fallo por-proveedor y continúa con el siguiente. El material
 * malformado NO es un fallo: produce cero coordenadas.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// La URL compartida no trae el parámetro access_token requerido.
    #[error("[L3_FETCH_FAULT]: ACCESS_TOKEN_MISSING")]
    MissingAccessToken,

    /// La URL compartida es ilegible como URL.
    #[error("[L3_FETCH_FAULT]: SHARE_URL_MALFORMED -> {0}")]
    InvalidUrl(String),

    /// El portal respondió un estatus no exitoso.
    #[error("[L3_FETCH_FAULT]: PORTAL_HTTP_{0}")]
    PortalStatus(u16),

    /// Ninguna variante de cuerpo produjo respuesta 2xx con contenido.
    #[error("[L3_FETCH_FAULT]: EMPTY_PORTAL_RESPONSE")]
    EmptyResponse,

    /// La operación excedió su presupuesto temporal.
    #[error("[L3_FETCH_TIMEOUT]: PORTAL_BUDGET_EXCEEDED -> {0}")]
    Timeout(String),

    /// Fallo físico de red.
    #[error("[L3_FETCH_NET_FAULT]: PORTAL_UPLINK_SEVERED -> {0}")]
    Transport(String),
}

impl FetchError {
    pub fn from_reqwest(fault: reqwest::Error) -> Self {
        if fault.is_timeout() {
            FetchError::Timeout(fault.to_string())
        } else {
            FetchError::Transport(fault.to_string())
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
