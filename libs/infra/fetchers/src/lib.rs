// [libs/infra/fetchers/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PLATFORM FETCHER DISPATCHER (V6.0 - GOLD MASTER)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DESPACHO DE ADAPTADORES POR PLATAFORMA
 *
 * VISION HIPER-HOLÍSTICA:
 * Acepta una URL compartida y un presupuesto temporal; clasifica el
 * portal por firma de host y delega al adaptador correspondiente.
 * Traccar es etiqueta reservada: conserva su tag pero enruta por el
 * adaptador genérico hasta que exista uno dedicado.
 * =================================================================
 */

use std::time::Duration;

pub mod errors;
pub mod generic;
pub mod gpswox;
pub mod headers;
pub mod micodus;
pub mod platform;

pub use errors::{FetchError, FetchResult};
pub use platform::{detect_platform, Platform};

use centinela_core_detector::DetectedCoord;
use tracing::instrument;

/// Presupuesto por defecto de un viaje completo de adaptador.
pub const DEFAULT_FETCH_BUDGET: Duration = Duration::from_secs(15);

/// Lote normalizado producido por cualquier adaptador.
#[derive(Debug, Clone)]
pub struct FetchedBatch {
    pub coords: Vec<DetectedCoord>,
    pub platform: Platform,
    /// Etiqueta de origen dominante del lote.
    pub source: String,
    /// Cuerpo crudo del portal, conservado para diagnóstico.
    pub raw: Option<String>,
}

/// Despachador de adaptadores con cliente HTTP propio.
pub struct PortalFetcher {
    http_client: reqwest::Client,
    budget: Duration,
}

impl PortalFetcher {
    /**
     * Forja el despachador. El presupuesto aplica a cada viaje HTTP
     * individual del adaptador, no al lote completo.
     */
    pub fn new(budget: Duration) -> FetchResult<Self> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|fault| FetchError::Transport(format!("HTTP_CLIENT_IGNITION: {fault}")))?;

        Ok(Self { http_client, budget })
    }

    /// Clasifica la URL y delega al adaptador correspondiente.
    #[instrument(skip(self), fields(url_head = %share_url.chars().take(48).collect::<String>()))]
    pub async fn fetch(&self, share_url: &str) -> FetchResult<FetchedBatch> {
        match detect_platform(share_url) {
            Platform::Micodus => micodus::fetch(&self.http_client, share_url, self.budget).await,
            Platform::Gpswox => gpswox::fetch(&self.http_client, share_url, self.budget).await,
            // Reservado: sin adaptador dedicado, Traccar viaja por el genérico.
            Platform::Traccar => {
                generic::fetch(&self.http_client, share_url, self.budget, Platform::Traccar).await
            }
            Platform::Generic => {
                generic::fetch(&self.http_client, share_url, self.budget, Platform::Generic).await
            }
        }
    }
}
