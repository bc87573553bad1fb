// [apps/central/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: COMMAND STATE HUB (V8.0 - SINGULARITY)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN DE REPOSITORIOS, MOTORES Y GUARDIAS
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SERVICE OBJECT: Todo "global" del sistema (token del puente,
 *    guardia de re-entrada, interruptores) vive acotado a este objeto
 *    construido al arranque; los tests lo parametrizan completo.
 * 2. RE-ENTRANCY GUARD: Un único AtomicBool protege el ciclo del
 *    coordinador; el perdedor del compare_exchange regresa de
 *    inmediato con el marcador already_running.
 * 3. DETECTION LEDGER: La marca last_detection se escribe de forma
 *    incondicional al cerrar cada corrida de detección.
 * =================================================================
 */

use crate::config::CentralConfig;
use centinela_domain_detection::StopWatch;
use centinela_domain_escalation::{EscalationEngine, VapiDialer};
use centinela_infra_fetchers::PortalFetcher;
use centinela_infra_gateway::repositories::{
    CallLogRepository, ContactRepository, CoordinateRepository, ProtocolRepository,
    ProviderRepository, ScrapeLogRepository, TripRepository, UnitEventRepository,
};
use centinela_infra_gateway::{BridgeClient, BridgeCredentials};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

/// Instantánea del último ciclo para la superficie de control.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSnapshot {
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    pub summary: String,
}

/// Contenedor de estado compartido (thread-safe) del centro de mando.
#[derive(Clone)]
pub struct CommandState {
    pub config: Arc<CentralConfig>,
    pub bridge: Arc<BridgeClient>,

    // --- REPOSITORIOS TIPADOS (L3) ---
    pub providers: Arc<ProviderRepository>,
    pub trips: Arc<TripRepository>,
    pub coordinates: Arc<CoordinateRepository>,
    pub contacts: Arc<ContactRepository>,
    pub protocols: Arc<ProtocolRepository>,
    pub call_logs: Arc<CallLogRepository>,
    pub events: Arc<UnitEventRepository>,
    pub scrape_logs: Arc<ScrapeLogRepository>,

    // --- MOTORES (L2/L3) ---
    pub fetcher: Arc<PortalFetcher>,
    pub stop_watch: Arc<StopWatch>,
    pub escalation: Arc<EscalationEngine<VapiDialer>>,

    // --- INTERRUPTORES Y GUARDIAS ---
    pub scheduler_enabled: Arc<AtomicBool>,
    pub ai_detection_enabled: Arc<AtomicBool>,
    cycle_guard: Arc<AtomicBool>,

    // --- LEDGER DE CORRIDAS ---
    last_run: Arc<RwLock<Option<CycleSnapshot>>>,
    last_detection: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl CommandState {
    /**
     * Forja el estado maestro inyectando todas las dependencias.
     * Falla solo ante configuración inutilizable (URL del puente vacía).
     */
    pub fn new(config: CentralConfig) -> anyhow::Result<Self> {
        debug!("🧬 [COMMAND_STATE]: Executing ignition sequence...");

        let bridge = Arc::new(BridgeClient::new(
            &config.api_base_url,
            BridgeCredentials {
                username: config.api_username.clone(),
                password: config.api_password.clone(),
            },
        )?);

        let providers = Arc::new(ProviderRepository::new(bridge.clone()));
        let trips = Arc::new(TripRepository::new(bridge.clone()));
        let coordinates = Arc::new(CoordinateRepository::new(bridge.clone()));
        let contacts = Arc::new(ContactRepository::new(bridge.clone()));
        let protocols = Arc::new(ProtocolRepository::new(bridge.clone()));
        let call_logs = Arc::new(CallLogRepository::new(bridge.clone()));
        let events = Arc::new(UnitEventRepository::new(bridge.clone()));
        let scrape_logs = Arc::new(ScrapeLogRepository::new(bridge.clone()));

        let fetcher = Arc::new(
            PortalFetcher::new(config.fetch_timeout)
                .map_err(|fault| anyhow::anyhow!("FETCHER_IGNITION: {fault}"))?,
        );

        let stop_watch = Arc::new(StopWatch::new(
            trips.clone(),
            coordinates.clone(),
            call_logs.clone(),
            events.clone(),
        ));

        let dialer = VapiDialer::new(config.vapi.clone(), bridge.clone())
            .map_err(|fault| anyhow::anyhow!("DIALER_IGNITION: {fault}"))?;
        let escalation = Arc::new(EscalationEngine::new(
            contacts.clone(),
            protocols.clone(),
            call_logs.clone(),
            events.clone(),
            dialer,
        ));

        Ok(Self {
            scheduler_enabled: Arc::new(AtomicBool::new(config.scheduler_enabled)),
            ai_detection_enabled: Arc::new(AtomicBool::new(config.ai_detection_enabled)),
            cycle_guard: Arc::new(AtomicBool::new(false)),
            last_run: Arc::new(RwLock::new(None)),
            last_detection: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
            bridge,
            providers,
            trips,
            coordinates,
            contacts,
            protocols,
            call_logs,
            events,
            scrape_logs,
            fetcher,
            stop_watch,
            escalation,
        })
    }

    // --- GUARDIA DE RE-ENTRADA DEL COORDINADOR ---

    /// Intenta tomar el ciclo. El perdedor regresa false de inmediato.
    pub fn try_begin_cycle(&self) -> bool {
        self.cycle_guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Libera la guardia al cerrar el ciclo (éxito o fallo).
    pub fn end_cycle(&self) {
        self.cycle_guard.store(false, Ordering::SeqCst);
    }

    pub fn is_cycle_running(&self) -> bool {
        self.cycle_guard.load(Ordering::SeqCst)
    }

    // --- LEDGER DE CORRIDAS ---

    pub fn record_run(&self, snapshot: CycleSnapshot) {
        match self.last_run.write() {
            Ok(mut ledger) => *ledger = Some(snapshot),
            Err(poison) => error!("💀 [COMMAND_STATE]: Run ledger lock poisoned: {}.", poison),
        }
    }

    pub fn last_run(&self) -> Option<CycleSnapshot> {
        self.last_run.read().ok().and_then(|ledger| ledger.clone())
    }

    /// ¿Venció el intervalo de detección IA?
    pub fn detection_due(&self, now: DateTime<Utc>) -> bool {
        let interval = Duration::minutes(self.config.ai_detection_interval_min.max(1));
        match self.last_detection.read() {
            Ok(ledger) => match *ledger {
                Some(last) => now - last >= interval,
                None => true,
            },
            Err(_) => true,
        }
    }

    /// Sella la marca de detección (incondicional tras cada corrida).
    pub fn record_detection(&self, when: DateTime<Utc>) {
        match self.last_detection.write() {
            Ok(mut ledger) => *ledger = Some(when),
            Err(poison) => error!("💀 [COMMAND_STATE]: Detection ledger lock poisoned: {}.", poison),
        }
    }

    pub fn last_detection(&self) -> Option<DateTime<Utc>> {
        self.last_detection.read().ok().and_then(|ledger| *ledger)
    }
}
