// [apps/central/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CENTRAL LIBRARY ROOT (V5.0 - SOVEREIGN AUTHORITY)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: DEFINICIÓN SUPREMA DEL ÁRBOL DE MÓDULOS
 * =================================================================
 */

// --- ESTRATO DE CONFIGURACIÓN Y ESTADO ---
/// Captura tipada del entorno de ejecución.
pub mod config;
/// Estado compartido: repositorios, motores, guardias e interruptores.
pub mod state;

// --- ESTRATO DE TRANSPORTE Y ACCIÓN ---
/// Adaptadores de entrada de la superficie de control.
pub mod handlers;
/// Núcleo de mando para la ignición de servicios.
pub mod kernel;
/// Topología de rutas de la superficie de control.
pub mod routes;

// --- ESTRATO DE SERVICIOS ---
/// Coordinador de ciclos, daemon de cadencia y auxiliares.
pub mod services;

/**
 * PRELUDIO DEL CENTRO DE MANDO
 *
 * Re-exportación estratégica para la ignición mínima desde main.rs.
 */
pub mod prelude {
    pub use crate::config::CentralConfig;
    pub use crate::kernel::CentralKernel;
    pub use crate::state::CommandState;
}
