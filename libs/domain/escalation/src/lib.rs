// [libs/domain/escalation/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ESCALATION LIBRARY ROOT (V5.0 - SOVEREIGN AUTHORITY)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L2)
 * RESPONSABILIDAD: CADENA DE ESCALAMIENTO POR VOZ IA
 *
 * Planificador puro (motive) + forja de prompts (prompt) + puerto de
 * marcado (dialer) + driver impuro (chain). La separación permite
 * certificar las leyes de hand-off y de orden sin red ni puente.
 * =================================================================
 */

/// Driver de la cadena sobre la jerarquía fija de roles.
pub mod chain;
/// Puerto de marcado y marcador Vapi de doble modo.
pub mod dialer;
/// Catálogo de fallos del escalamiento.
pub mod errors;
/// Planificador puro de motivos y hand-off.
pub mod motive;
/// Normalización E.164 con política México-default.
pub mod phone;
/// Forja de prompts del sistema y mensajes de apertura/cierre.
pub mod prompt;

pub use chain::{ChainReport, EscalationEngine, PlacedCall};
pub use dialer::{CallRequest, CallResult, VapiDialer, VapiSettings, VoiceDialer};
pub use errors::EscalationError;
pub use motive::{base_motive, ChainContext, OperatorHandoff, StopSummary};
pub use phone::normalize_phone_e164;
pub use prompt::{build_system_prompt, first_message, PromptParams, COMPANY_IDENTITY};
