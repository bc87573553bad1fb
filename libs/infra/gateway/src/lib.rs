// [libs/infra/gateway/src/lib.rs]
/*!
 * =================================================================
 * APARATO: STORAGE GATEWAY LIBRARY ROOT (V5.0 - SOVEREIGN AUTHORITY)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN SUPREMA DEL ÁRBOL DE MÓDULOS
 *
 * VISION HIPER-HOLÍSTICA:
 * Envuelve el puente CRUD JSON autenticado por portador: bóveda de
 * token con refresco single-flight, verbos con presupuesto temporal,
 * traducción de filas {Value, Type} y repositorios tipados que poseen
 * todo el texto SQL del sistema.
 * =================================================================
 */

// --- ESTRATO DE AUTENTICACIÓN Y TRANSPORTE ---
/// Bóveda del token bearer y decodificación de expiración JWT.
pub mod auth;
/// Cliente CRUD del puente con reintento tras 401.
pub mod client;
/// Catálogo semántico de fallos del puente.
pub mod errors;
/// Traducción de formas de fila {Value, Type} <-> plano.
pub mod translation;

// --- ESTRATO DE PERSISTENCIA TIPADA ---
/// Repositorios por entidad (únicos dueños del SQL).
pub mod repositories;

// --- RE-EXPORTACIONES SOBERANAS ---
pub use auth::{BearerToken, BridgeCredentials, TokenVault};
pub use client::{BridgeClient, InsertOutcome, RecordOutcome};
pub use errors::{GatewayError, GatewayResult};
