// [libs/infra/gateway/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY ACCESS MATRIX (V6.0 - TOPOLOGY MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SQL SOVEREIGNTY: Cada repositorio es el único dueño del texto SQL
 *    de su tabla; ningún otro estrato conoce nombres de columnas.
 * 2. PARAMETER BINDING: Todas las consultas viajan con placeholders y
 *    arreglo de parámetros; la interpolación de valores está vetada.
 * 3. OWNERSHIP DISCIPLINE: El núcleo escribe Coordenadas, Llamadas IA,
 *    Scrape Logs y Eventos; sobre Viajes solo última-posición y sobre
 *    Proveedores solo último-scrape / último-error.
 * =================================================================
 */

// --- ESTRATO 1: FUENTES Y OBSERVACIONES ---

/// Portales GPS y su marca de agua de scrape.
pub mod providers;
/// Viajes-unidad activos y su última posición.
pub mod trips;
/// Fijaciones GPS append-only y ventanas de análisis.
pub mod coordinates;

// --- ESTRATO 2: ESCALAMIENTO ---

/// Jerarquía de contactos por viaje.
pub mod contacts;
/// Protocolos de llamada IA (por viaje o default de flota).
pub mod protocols;
/// Registro de llamadas salientes y reconciliación por webhook.
pub mod call_logs;

// --- ESTRATO 3: BITÁCORA ---

/// Línea de tiempo append-only por unidad.
pub mod unit_events;
/// Registro por intento de ciclo de proveedor.
pub mod scrape_logs;

// --- RE-EXPORTACIONES SOBERANAS (NOMINAL ACCESS API) ---

pub use call_logs::{CallLogRepository, NewCallLog};
pub use contacts::ContactRepository;
pub use coordinates::{CoordinateRepository, NewCoordinate};
pub use protocols::ProtocolRepository;
pub use providers::ProviderRepository;
pub use scrape_logs::ScrapeLogRepository;
pub use trips::TripRepository;
pub use unit_events::UnitEventRepository;
