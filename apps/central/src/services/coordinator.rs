// [apps/central/src/services/coordinator.rs]
/*!
 * =================================================================
 * APARATO: SCRAPE CYCLE COORDINATOR (V11.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L4)
 * RESPONSABILIDAD: ORQUESTACIÓN POR CICLO DE LA INGESTA GPS
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. RE-ENTRANCY: Un solo ciclo en vuelo; el perdedor de la guardia
 *    regresa {skipped, already_running} sin efectos secundarios.
 * 2. PER-PROVIDER CONTAINMENT: El fallo de un portal sella su
 *    scrape-log como error, actualiza ultimo_error y el ciclo continúa
 *    con el siguiente proveedor.
 * 3. DEDUP WINDOW: Una fijación se descarta si el mismo viaje ya tiene
 *    otra a menos de 1e-5 grados dentro de los últimos 5 minutos.
 * 4. ORPHAN FALLBACK: Coordenadas sin viaje receptor van al primer
 *    viaje activo (hasta 50) para no perder señal; la política es
 *    desactivable por configuración.
 * =================================================================
 */

use crate::state::{CommandState, CycleSnapshot};
use centinela_core_detector::{is_valid_position, DetectedCoord};
use centinela_domain_models::{Coordinate, Provider, Trip, UnitEventType};
use centinela_infra_fetchers::FetchedBatch;
use centinela_infra_gateway::repositories::NewCoordinate;
use centinela_infra_gateway::GatewayError;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{error, info, instrument, warn};

/// Tope de fijaciones aceptadas por viaje en un ciclo.
const MAX_COORDS_PER_TRIP: usize = 50;

/// Ventana de deduplicación contra fijaciones ya persistidas.
const DEDUP_WINDOW_MINUTES: i64 = 5;

/// Tolerancia angular del duplicado (≈ 1 metro).
const DEDUP_TOLERANCE_DEGREES: f64 = 1e-5;

/// Modo de selección de proveedores del ciclo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    /// Invocación manual: todos los proveedores activos.
    AllActive,
    /// Invocación del scheduler: solo los vencidos.
    DueOnly,
    /// Invocación puntual sobre un proveedor.
    SingleProvider(i64),
}

/// Reporte agregado de un ciclo del coordinador.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub skipped: bool,
    pub reason: Option<String>,
    pub providers_selected: usize,
    pub providers_failed: usize,
    pub coords_found: usize,
    pub coords_new: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CycleReport {
    fn skipped(reason: &str, at: DateTime<Utc>) -> Self {
        Self {
            skipped: true,
            reason: Some(reason.to_string()),
            providers_selected: 0,
            providers_failed: 0,
            coords_found: 0,
            coords_new: 0,
            started_at: at,
            finished_at: at,
        }
    }

    /// Línea compacta para el ledger de la superficie de control.
    pub fn summary_line(&self) -> String {
        if self.skipped {
            return format!("skipped: {}", self.reason.as_deref().unwrap_or("desconocido"));
        }
        format!(
            "{} proveedor(es), {} fijación(es) encontradas, {} nuevas, {} fallo(s)",
            self.providers_selected, self.coords_found, self.coords_new, self.providers_failed
        )
    }
}

/// Saldo por proveedor dentro del ciclo.
struct ProviderTally {
    found: usize,
    inserted: usize,
    failed: bool,
}

/// Coordinador de ciclos de scrape.
pub struct ScrapeCoordinator {
    state: CommandState,
}

impl ScrapeCoordinator {
    pub fn new(state: CommandState) -> Self {
        Self { state }
    }

    /**
     * Ejecuta un ciclo completo bajo la guardia de re-entrada.
     *
     * Una invocación concurrente regresa de inmediato con el marcador
     * already_running y CERO efectos secundarios.
     */
    #[instrument(skip(self), fields(mode = ?mode))]
    pub async fn run_cycle(&self, mode: CycleMode) -> CycleReport {
        let started_at = Utc::now();

        if !self.state.try_begin_cycle() {
            info!("🛰️  [COORDINATOR]: Cycle already in flight. Skipping.");
            return CycleReport::skipped("already_running", started_at);
        }

        let report = self.run_cycle_guarded(mode, started_at).await;
        self.state.end_cycle();

        self.state.record_run(CycleSnapshot {
            finished_at: report.finished_at,
            success: !report.skipped && report.providers_failed == 0,
            summary: report.summary_line(),
        });

        report
    }

    async fn run_cycle_guarded(&self, mode: CycleMode, started_at: DateTime<Utc>) -> CycleReport {
        // 1. SESIÓN VIVA CONTRA EL PUENTE
        // Único fallo fatal del ciclo; el proceso sigue para el próximo tick.
        if let Err(fault) = self.state.bridge.ensure_authenticated().await {
            error!("🛰️  [COORDINATOR]: Bridge authentication collapsed: {}.", fault);
            return CycleReport::skipped("auth_failed", started_at);
        }

        // 2. INVENTARIO DE PROVEEDORES (cadencia ascendente)
        let all_active = match self.state.providers.list_active().await {
            Ok(found) => found,
            Err(fault) => {
                error!("🛰️  [COORDINATOR]: Provider inventory unreadable: {}.", fault);
                return CycleReport::skipped("providers_unreadable", started_at);
            }
        };

        // 3. SELECCIÓN SEGÚN MODO
        let now = Utc::now();
        let selected: Vec<&Provider> = all_active
            .iter()
            .filter(|provider| match mode {
                CycleMode::AllActive => true,
                CycleMode::DueOnly => provider.is_due(now),
                CycleMode::SingleProvider(target_id) => provider.id == target_id,
            })
            .collect();

        if selected.is_empty() {
            return CycleReport {
                skipped: false,
                reason: Some("no_providers_due".to_string()),
                providers_selected: 0,
                providers_failed: 0,
                coords_found: 0,
                coords_new: 0,
                started_at,
                finished_at: Utc::now(),
            };
        }

        info!("🛰️  [COORDINATOR]: Cycle ignition over {} provider(s).", selected.len());

        // 4. VIAJES EN RUTA (cargados una vez, reusados entre proveedores)
        let active_trips = match self.state.trips.list_en_ruta().await {
            Ok(found) => found,
            Err(fault) => {
                error!("🛰️  [COORDINATOR]: Trip inventory unreadable: {}.", fault);
                return CycleReport::skipped("trips_unreadable", started_at);
            }
        };

        // 5. PROCESO SECUENCIAL POR PROVEEDOR (acota memoria y tasa)
        let mut total_found = 0usize;
        let mut total_inserted = 0usize;
        let mut failed_providers = 0usize;

        for provider in &selected {
            let tally = self.process_provider(provider, &active_trips).await;
            total_found += tally.found;
            total_inserted += tally.inserted;
            if tally.failed {
                failed_providers += 1;
            }
        }

        let finished_at = Utc::now();
        info!(
            "🛰️  [COORDINATOR]: Cycle sealed. {} found / {} new / {} provider fault(s).",
            total_found, total_inserted, failed_providers
        );

        CycleReport {
            skipped: false,
            reason: None,
            providers_selected: selected.len(),
            providers_failed: failed_providers,
            coords_found: total_found,
            coords_new: total_inserted,
            started_at,
            finished_at,
        }
    }

    /// Ciclo de un proveedor: log running -> fetch -> persistencia -> sellado.
    #[instrument(skip(self, provider, active_trips), fields(proveedor = provider.id))]
    async fn process_provider(&self, provider: &Provider, active_trips: &[Trip]) -> ProviderTally {
        let cycle_start = Utc::now();

        let Some(share_url) = provider.url_base.as_deref().filter(|url| !url.trim().is_empty()) else {
            warn!("🛰️  [COORDINATOR]: Provider {} active without URL. Skipping.", provider.id);
            return ProviderTally { found: 0, inserted: 0, failed: false };
        };

        let log_id = match self.state.scrape_logs.open_running(provider.id, cycle_start).await {
            Ok(opened) => opened,
            Err(fault) => {
                warn!("🛰️  [COORDINATOR]: Scrape-log open failed for provider {}: {}.", provider.id, fault);
                None
            }
        };

        // --- FETCH DEL PORTAL ---
        let batch = match self.state.fetcher.fetch(share_url).await {
            Ok(batch) => batch,
            Err(fault) => {
                let fault_text = fault.to_string();
                error!("🛰️  [COORDINATOR]: Provider {} fetch collapsed: {}.", provider.id, fault_text);

                if let Some(id) = log_id {
                    if let Err(seal_fault) =
                        self.state.scrape_logs.finalize_error(id, &fault_text, Utc::now()).await
                    {
                        warn!("🛰️  [COORDINATOR]: Error-log seal failed: {}.", seal_fault);
                    }
                }
                if let Err(mark_fault) = self
                    .state
                    .providers
                    .record_scrape_result(provider.id, Utc::now(), Some(&fault_text))
                    .await
                {
                    warn!("🛰️  [COORDINATOR]: Provider error-mark failed: {}.", mark_fault);
                }

                return ProviderTally { found: 0, inserted: 0, failed: true };
            }
        };

        // --- PERSISTENCIA POR VIAJE ---
        let (found, inserted, sources) = self.persist_batch(provider, &batch, active_trips).await;

        // --- SELLADO DE MARCA DE AGUA Y LOG ---
        if let Err(fault) = self
            .state
            .providers
            .record_scrape_result(provider.id, Utc::now(), None)
            .await
        {
            warn!("🛰️  [COORDINATOR]: Provider watermark update failed: {}.", fault);
        }

        if let Some(id) = log_id {
            // Material malformado no es error: success con conteo 0.
            if let Err(fault) = self
                .state
                .scrape_logs
                .finalize_success(id, found as i64, inserted as i64, &sources, Utc::now())
                .await
            {
                warn!("🛰️  [COORDINATOR]: Success-log seal failed: {}.", fault);
            }
        }

        ProviderTally { found, inserted, failed: false }
    }

    /**
     * Distribuye el lote entre los viajes receptores y persiste cada
     * fijación nueva, actualizando la última posición del viaje.
     */
    async fn persist_batch(
        &self,
        provider: &Provider,
        batch: &FetchedBatch,
        active_trips: &[Trip],
    ) -> (usize, usize, String) {
        let found = batch.coords.len();
        let mut source_tags: BTreeSet<String> = BTreeSet::new();
        for coord in &batch.coords {
            source_tags.insert(coord.source.clone());
        }
        let sources = if source_tags.is_empty() {
            batch.source.clone()
        } else {
            source_tags.into_iter().collect::<Vec<_>>().join(",")
        };

        if found == 0 {
            return (0, 0, sources);
        }

        // Resolución del conjunto receptor: viajes enlazados al proveedor
        // o sin proveedor declarado.
        let mut receiving_trips: Vec<&Trip> = active_trips
            .iter()
            .filter(|trip| trip.proveedor_id == Some(provider.id) || trip.proveedor_id.is_none())
            .collect();

        // Política de huérfanas: el primer viaje activo recibe la señal
        // para no perderla (desactivable por configuración).
        if receiving_trips.is_empty() {
            if self.state.config.coord_fallback_enabled {
                if let Some(first_active) = active_trips.first() {
                    warn!(
                        "🛰️  [COORDINATOR]: No trip matches provider {}. Falling back to trip {}.",
                        provider.id, first_active.id
                    );
                    receiving_trips.push(first_active);
                }
            }
            if receiving_trips.is_empty() {
                warn!("🛰️  [COORDINATOR]: Provider {} batch has no receiving trip. Signal dropped.", provider.id);
                return (found, 0, sources);
            }
        }

        let mut inserted_total = 0usize;
        for trip in receiving_trips {
            inserted_total += self.persist_for_trip(provider, trip, &batch.coords).await;
        }

        (found, inserted_total, sources)
    }

    /// Persiste hasta 50 fijaciones nuevas de un viaje, con dedup.
    async fn persist_for_trip(
        &self,
        provider: &Provider,
        trip: &Trip,
        coords: &[DetectedCoord],
    ) -> usize {
        let now = Utc::now();
        let window_start = now - Duration::minutes(DEDUP_WINDOW_MINUTES);

        // Fijaciones ya persistidas dentro de la ventana de dedup.
        let mut recent_fixes: Vec<Coordinate> = match self
            .state
            .coordinates
            .recent_for_trip(trip.id, window_start, MAX_COORDS_PER_TRIP as i64)
            .await
        {
            Ok(fixes) => fixes,
            Err(fault) => {
                warn!("🛰️  [COORDINATOR]: Dedup window unreadable for trip {}: {}.", trip.id, fault);
                Vec::new()
            }
        };

        let mut inserted = 0usize;

        for coord in coords.iter().take(MAX_COORDS_PER_TRIP) {
            if !is_valid_position(coord.lat, coord.lng) {
                continue;
            }
            if is_duplicate_fix(&recent_fixes, coord.lat, coord.lng) {
                continue;
            }

            let new_fix = NewCoordinate {
                viaje_id: Some(trip.id),
                proveedor_id: provider.id,
                lat: coord.lat,
                lng: coord.lng,
                velocidad: coord.speed,
                rumbo: coord.heading,
                timestamp_gps: coord.timestamp.clone(),
                fuente: coord.source.clone(),
            };

            match self.state.coordinates.insert_fix(&new_fix, now).await {
                Ok(_) => {
                    inserted += 1;

                    // La fijación recién aceptada entra a la ventana local
                    // para deduplicar el resto del lote.
                    recent_fixes.push(Coordinate {
                        id: 0,
                        viaje_id: Some(trip.id),
                        proveedor_id: provider.id,
                        lat: Some(coord.lat),
                        lng: Some(coord.lng),
                        velocidad: coord.speed,
                        rumbo: coord.heading,
                        timestamp_gps: coord.timestamp.clone(),
                        timestamp_ingesta: now,
                        fuente: coord.source.clone(),
                    });

                    if let Err(fault) = self
                        .state
                        .trips
                        .update_last_position(trip.id, coord.lat, coord.lng, now)
                        .await
                    {
                        warn!("🛰️  [COORDINATOR]: Last-position update failed for trip {}: {}.", trip.id, fault);
                    }
                }
                // Duplicado a nivel puente: operación idempotente, se absorbe.
                Err(GatewayError::Conflict(_)) => {}
                Err(fault) => {
                    warn!("🛰️  [COORDINATOR]: Fix insert failed for trip {}: {}.", trip.id, fault);
                }
            }
        }

        if inserted > 0 {
            let note = format!("{} coordenada(s) nueva(s) vía {}", inserted, provider.nombre);
            if let Err(fault) = self
                .state
                .events
                .append(trip.id, UnitEventType::ScrapeExitoso, &note, now)
                .await
            {
                warn!("🛰️  [COORDINATOR]: Scrape event append failed for trip {}: {}.", trip.id, fault);
            }
        }

        inserted
    }
}

/// ¿Existe ya una fijación indistinguible dentro de la ventana?
fn is_duplicate_fix(recent_fixes: &[Coordinate], lat: f64, lng: f64) -> bool {
    recent_fixes.iter().any(|fix| match (fix.lat, fix.lng) {
        (Some(existing_lat), Some(existing_lng)) => {
            (existing_lat - lat).abs() < DEDUP_TOLERANCE_DEGREES
                && (existing_lng - lng).abs() < DEDUP_TOLERANCE_DEGREES
        }
        _ => false,
    })
}
