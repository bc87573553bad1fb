// [libs/infra/fetchers/src/headers.rs]
/*!
 * =================================================================
 * APARATO: BROWSER HEADER PROFILE (V2.0)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: PERFIL DE CABECERAS TIPO NAVEGADOR
 *
 * Varios portales sirven HTML distinto (o nada) a clientes sin perfil
 * de navegador. Este perfil Chrome/120 de escritorio es compartido por
 * todos los adaptadores.
 * =================================================================
 */

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT};

/// User-Agent Chrome/120 de escritorio.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Perfil de cabeceras tipo navegador para los GET de portal.
pub fn browser_headers() -> HeaderMap {
    let mut profile = HeaderMap::new();
    profile.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    profile.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    profile.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9,es;q=0.8"));
    profile.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    profile
}
