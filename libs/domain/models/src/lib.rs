// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: FLEET DOMAIN MODELS ROOT (V8.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN DE CONTRATOS SOBERANOS DE LA FLOTA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SINGLE SOURCE OF TRUTH: Todo registro persistido por el núcleo
 *    (Coordenadas, Llamadas IA, Eventos, Scrape Logs) y todo registro
 *    leído (Proveedores, Viajes, Contactos, Protocolos) se define aquí.
 * 2. WIRE PARITY: Los nombres serde coinciden bit-a-bit con las columnas
 *    del puente de almacenamiento; los vocabularios cerrados viajan como
 *    sus cadenas históricas ('en_ruta', 'alerta_paro_ia').
 * 3. TOLERANT INGESTION: Deserializadores flexibles para booleanos 0/1
 *    y números que llegan como texto desde portales de terceros.
 * =================================================================
 */

// --- ESTRATO DE PROVEEDORES Y VIAJES ---
/// Portales GPS de terceros y su cadencia de scrape.
pub mod provider;
/// Viajes-unidad activos bajo monitoreo.
pub mod trip;

// --- ESTRATO DE OBSERVACIONES ---
/// Fijaciones GPS observadas (append-only).
pub mod coordinate;

// --- ESTRATO DE ESCALAMIENTO ---
/// Puntos de contacto y jerarquía de roles.
pub mod contact;
/// Configuración afinable del comportamiento de llamadas IA.
pub mod protocol;
/// Registro de llamadas salientes del agente de voz.
pub mod call_log;

// --- ESTRATO DE BITÁCORA ---
/// Línea de tiempo append-only por unidad.
pub mod unit_event;
/// Registro por intento de ciclo de scrape.
pub mod scrape_log;

// --- SOPORTE DE DESERIALIZACIÓN TOLERANTE ---
pub mod wire;

// --- RE-EXPORTACIONES SOBERANAS (NOMINAL ACCESS) ---
pub use call_log::{AiCallLog, CallKind, CallOutcome};
pub use contact::{Contact, ContactRole};
pub use coordinate::Coordinate;
pub use protocol::AiProtocol;
pub use provider::Provider;
pub use scrape_log::{ScrapeLog, ScrapeLogState};
pub use trip::{Trip, TripState};
pub use unit_event::{UnitEvent, UnitEventType};
