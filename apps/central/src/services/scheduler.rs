// [apps/central/src/services/scheduler.rs]
/*!
 * =================================================================
 * APARATO: CRON CADENCE DAEMON (V9.0 - GRACEFUL)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: TICK PERIÓDICO DEL PIPELINE COMPLETO
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SINGLE TICK: Un solo latido conduce scrape y detección IA; la
 *    detección corre tras el ciclo cuando su intervalo venció, y su
 *    marca se sella de forma incondicional.
 * 2. NOISE CONTROL: Los ticks ociosos (nada vencido) se reportan a lo
 *    sumo una vez cada 10 minutos.
 * 3. GRACEFUL SHUTDOWN: La señal de apagado detiene la cadencia; el
 *    ciclo en vuelo termina por sí mismo antes de la salida.
 * =================================================================
 */

use crate::services::coordinator::{CycleMode, ScrapeCoordinator};
use crate::state::CommandState;
use chrono::Utc;
use cron::Schedule;
use std::str::FromStr;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Supresión de bitácora de ticks ociosos.
const IDLE_LOG_SUPPRESSION: Duration = Duration::from_secs(600);

/// Cadencia de respaldo cuando la expresión configurada es ilegible.
const FALLBACK_SCHEDULE: &str = "0 */1 * * * *";

/**
 * Normaliza una expresión cron de 5 campos (estándar) a los 6 campos
 * con segundos que exige el parser. Expresiones ya extendidas pasan
 * intactas.
 */
pub fn normalize_cron_expression(raw_expression: &str) -> String {
    let field_count = raw_expression.split_whitespace().count();
    if field_count == 5 {
        format!("0 {}", raw_expression.trim())
    } else {
        raw_expression.trim().to_string()
    }
}

/// Daemon de cadencia del centro de mando.
pub struct SchedulerDaemon;

impl SchedulerDaemon {
    /**
     * Ignición del bucle de cadencia en el runtime de Tokio.
     *
     * @param state Estado maestro inyectado.
     * @param shutdown_signal Receptor del protocolo de apagado.
     */
    pub fn spawn(state: CommandState, mut shutdown_signal: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let normalized = normalize_cron_expression(&state.config.cron_schedule);
            let schedule = match Schedule::from_str(&normalized) {
                Ok(parsed) => parsed,
                Err(fault) => {
                    error!(
                        "⏱️  [SCHEDULER]: Cron expression '{}' unreadable ({}). Falling back to every minute.",
                        state.config.cron_schedule, fault
                    );
                    Schedule::from_str(FALLBACK_SCHEDULE).expect("fallback schedule is static")
                }
            };

            info!("⏱️  [SCHEDULER]: Cadence armed with '{}'.", normalized);

            let coordinator = ScrapeCoordinator::new(state.clone());
            let mut last_idle_log: Option<Instant> = None;

            loop {
                // Próximo disparo según la cadencia.
                let Some(next_fire) = schedule.upcoming(Utc).next() else {
                    warn!("⏱️  [SCHEDULER]: Schedule exhausted. Daemon standing down.");
                    return;
                };
                let wait = (next_fire - Utc::now())
                    .to_std()
                    .unwrap_or(Duration::from_secs(1));

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = shutdown_signal.changed() => {
                        info!("⏱️  [SCHEDULER]: Shutdown signal received. Cadence stopped.");
                        return;
                    }
                }

                if !state.scheduler_enabled.load(Ordering::SeqCst) {
                    continue;
                }

                // --- 1. CICLO DE SCRAPE (solo proveedores vencidos) ---
                let report = coordinator.run_cycle(CycleMode::DueOnly).await;

                let was_idle = !report.skipped && report.providers_selected == 0;
                if was_idle {
                    let should_log = last_idle_log
                        .map(|logged| logged.elapsed() >= IDLE_LOG_SUPPRESSION)
                        .unwrap_or(true);
                    if should_log {
                        info!("⏱️  [SCHEDULER]: Idle tick (no providers due). Next report in 10 min.");
                        last_idle_log = Some(Instant::now());
                    }
                } else if !report.skipped {
                    info!("⏱️  [SCHEDULER]: Tick sealed -> {}.", report.summary_line());
                }

                // --- 2. DETECCIÓN IA + ESCALAMIENTO ---
                let now = Utc::now();
                if state.ai_detection_enabled.load(Ordering::SeqCst) && state.detection_due(now) {
                    run_detection_chain(&state).await;
                    // La marca se sella INCONDICIONALMENTE tras la corrida.
                    state.record_detection(now);
                }
            }
        })
    }
}

/// Corrida detector -> escalamiento con contención total de fallos.
pub async fn run_detection_chain(state: &CommandState) {
    match state.stop_watch.run_detection().await {
        Ok((stop_events, outcomes)) => {
            info!(
                "🛑 [SCHEDULER]: Detection run sealed: {} trip(s) analyzed, {} confirmed stop(s).",
                outcomes.len(),
                stop_events.len()
            );

            if !stop_events.is_empty() {
                let reports = state.escalation.process_stop_events(&stop_events).await;
                for report in &reports {
                    info!(
                        "📞 [SCHEDULER]: Trip {} chain -> {} call(s), halted_by {:?}.",
                        report.trip_id,
                        report.calls.len(),
                        report.halted_by.map(|role| role.as_str())
                    );
                }
            }
        }
        Err(fault) => {
            error!("🛑 [SCHEDULER]: Detection run collapsed: {}.", fault);
        }
    }
}
