// [apps/central/src/services/mod.rs]
/**
 * =================================================================
 * APARATO: SERVICE ORCHESTRATION HUB (V5.0)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE DAEMONS Y MOTORES
 *
 * # Topología de Módulos:
 * - coordinator: Orquestación por ciclo de la ingesta GPS.
 * - scheduler:   Cadencia cron, tick ocioso y cadena de detección.
 * - geocode:     Auxiliar de geocodificación inversa (webhooks).
 * =================================================================
 */

pub mod coordinator;
pub mod geocode;
pub mod scheduler;

// --- RE-EXPORTACIONES SOBERANAS (NOMINAL ACCESS) ---

pub use coordinator::{CycleMode, CycleReport, ScrapeCoordinator};
pub use scheduler::{run_detection_chain, SchedulerDaemon};
