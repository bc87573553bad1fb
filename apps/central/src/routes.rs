// [apps/central/src/routes.rs]
/*!
 * =================================================================
 * APARATO: CONTROL ROUTING MATRIX (V6.0)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: TOPOLOGÍA DE LA SUPERFICIE DE CONTROL
 *
 * Superficie delgada para operadores y la UI existente; las rutas
 * conservan sus formas históricas (incluido el doble segmento
 * /api/ai/api/ * del panel legado).
 * =================================================================
 */

use crate::handlers::{ai, scheduler, scraper, webhook};
use crate::state::CommandState;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub fn create_control_router(application_state: CommandState) -> Router {
    // Escudo de red: CORS para el panel de operación.
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    // ESTRATO DE SCRAPE: estatus y disparo manual.
    let scraper_stratum = Router::new()
        .route("/status", get(scraper::ScraperControlHandler::handle_status))
        .route("/run", post(scraper::ScraperControlHandler::handle_run));

    // ESTRATO DE CADENCIA: interruptor del scheduler.
    let scheduler_stratum = Router::new()
        .route("/status", get(scheduler::SchedulerControlHandler::handle_status))
        .route("/toggle", post(scheduler::SchedulerControlHandler::handle_toggle));

    // ESTRATO IA: detección, corrida forzada y llamada manual.
    let ai_stratum = Router::new()
        .route("/status", get(ai::AiControlHandler::handle_status))
        .route("/toggle-detection", post(ai::AiControlHandler::handle_toggle_detection))
        // Doble segmento /api: forma histórica del panel legado.
        .route("/api/run-detection", post(ai::AiControlHandler::handle_run_detection))
        .route("/api/manual-call", post(ai::AiControlHandler::handle_manual_call));

    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .nest("/api/scraper", scraper_stratum)
        .nest("/api/scheduler", scheduler_stratum)
        .nest("/api/ai", ai_stratum)
        .route("/api/vapi/webhook", post(webhook::VoiceWebhookHandler::handle_incoming))
        .layer(network_security_shield)
        .with_state(application_state)
}
