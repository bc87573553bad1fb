// [libs/domain/detection/src/watch.rs]
/*!
 * =================================================================
 * APARATO: STOP WATCH RUNNER (V7.2 - DEBOUNCE HARDENED)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: CORRIDA DE DETECCIÓN SOBRE LA FLOTA HABILITADA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. DOUBLE-SOURCE DEBOUNCE: Un paro se suprime si en los últimos 60
 *    minutos existe una llamada IA tipo 'paro' O un evento
 *    'alerta_paro_ia' para el viaje. El evento emitido es a su vez el
 *    token de debounce del siguiente ciclo.
 * 2. FAIL-OPEN READS: Si la lectura de debounce falla, se asume "sin
 *    alerta reciente": el sistema prefiere un posible duplicado antes
 *    que un paro silenciado.
 * 3. RESTART TRAIL: Un viaje con token de paro vivo que vuelve a
 *    moverse deja un único evento 'reinicio_movimiento'.
 * =================================================================
 */

use crate::classifier::{classify, lookback_window_minutes, StopVerdict, ANALYSIS_FIX_LIMIT};
use crate::errors::DetectionError;
use crate::StopEvent;
use centinela_domain_models::{CallKind, Trip, UnitEventType};
use centinela_infra_gateway::repositories::{
    CallLogRepository, CoordinateRepository, TripRepository, UnitEventRepository,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Ventana de supresión de re-alertas.
pub const DEBOUNCE_WINDOW_MINUTES: i64 = 60;

/// Desenlace por viaje de una corrida (superficie de control).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionOutcome {
    pub trip_id: i64,
    pub unit: String,
    pub verdict: String,
    pub stop_emitted: bool,
    pub debounced: bool,
}

/// Corredor de detección sobre los viajes habilitados para IA.
pub struct StopWatch {
    trips: Arc<TripRepository>,
    coordinates: Arc<CoordinateRepository>,
    call_logs: Arc<CallLogRepository>,
    events: Arc<UnitEventRepository>,
}

impl StopWatch {
    pub fn new(
        trips: Arc<TripRepository>,
        coordinates: Arc<CoordinateRepository>,
        call_logs: Arc<CallLogRepository>,
        events: Arc<UnitEventRepository>,
    ) -> Self {
        Self { trips, coordinates, call_logs, events }
    }

    /**
     * Corre la detección sobre todos los viajes en ruta con IA activa.
     *
     * Devuelve los StopEvent confirmados (listos para escalamiento) y
     * el desenlace por viaje para la superficie de control.
     */
    #[instrument(skip(self))]
    pub async fn run_detection(&self) -> Result<(Vec<StopEvent>, Vec<DetectionOutcome>), DetectionError> {
        let now = Utc::now();
        let monitored_trips = self.trips.list_ai_enabled().await?;

        info!("🛑 [STOP_WATCH]: Analyzing {} AI-enabled trip(s) en route.", monitored_trips.len());

        let mut confirmed_events = Vec::new();
        let mut outcomes = Vec::with_capacity(monitored_trips.len());

        for trip in monitored_trips {
            let outcome = self.analyze_trip(&trip, now, &mut confirmed_events).await;
            outcomes.push(outcome);
        }

        Ok((confirmed_events, outcomes))
    }

    async fn analyze_trip(
        &self,
        trip: &Trip,
        now: DateTime<Utc>,
        confirmed_events: &mut Vec<StopEvent>,
    ) -> DetectionOutcome {
        let threshold_minutes = trip.stop_threshold_minutes();
        let window_start = now - Duration::minutes(lookback_window_minutes(threshold_minutes));

        let window_fixes = match self
            .coordinates
            .recent_for_trip(trip.id, window_start, ANALYSIS_FIX_LIMIT)
            .await
        {
            Ok(fixes) => fixes,
            Err(fault) => {
                warn!("🛑 [STOP_WATCH]: Window read failed for trip {}: {}.", trip.id, fault);
                return DetectionOutcome {
                    trip_id: trip.id,
                    unit: trip.unit_label(),
                    verdict: "ventana_ilegible".into(),
                    stop_emitted: false,
                    debounced: false,
                };
            }
        };

        let verdict = classify(&window_fixes, threshold_minutes);
        let verdict_label = verdict.label();

        if verdict.is_movement() {
            self.record_restart_if_needed(trip, now).await;
        }

        let StopVerdict::Stopped { stopped_minutes, .. } = verdict else {
            return DetectionOutcome {
                trip_id: trip.id,
                unit: trip.unit_label(),
                verdict: verdict_label.into(),
                stop_emitted: false,
                debounced: false,
            };
        };

        // --- DEBOUNCE DE DOBLE FUENTE (fail-open) ---
        if self.is_debounced(trip.id, now).await {
            info!("🛑 [STOP_WATCH]: Trip {} stop suppressed by 60-minute debounce.", trip.id);
            return DetectionOutcome {
                trip_id: trip.id,
                unit: trip.unit_label(),
                verdict: verdict_label.into(),
                stop_emitted: false,
                debounced: true,
            };
        }

        let newest = window_fixes.first();
        let last_lat = newest.and_then(|fix| fix.lat).unwrap_or_default();
        let last_lng = newest.and_then(|fix| fix.lng).unwrap_or_default();
        let last_coord_time = newest
            .and_then(|fix| fix.timestamp_gps.clone())
            .or_else(|| newest.map(|fix| fix.timestamp_ingesta.to_rfc3339()));

        let alert_description = format!(
            "Paro confirmado: unidad {} detenida {} min (umbral {} min) en {:.6}, {:.6}",
            trip.unit_label(),
            stopped_minutes,
            threshold_minutes,
            last_lat,
            last_lng
        );

        // El evento emitido es el token de debounce del siguiente ciclo.
        if let Err(fault) = self
            .events
            .append(trip.id, UnitEventType::AlertaParoIa, &alert_description, now)
            .await
        {
            warn!("🛑 [STOP_WATCH]: Alert event append failed for trip {}: {}.", trip.id, fault);
        }

        confirmed_events.push(StopEvent {
            trip_id: trip.id,
            trip: trip.clone(),
            stopped_minutes,
            threshold_minutes,
            last_lat,
            last_lng,
            last_coord_time,
            coord_count: window_fixes.len(),
        });

        info!(
            "🚨 [STOP_WATCH]: Trip {} CONFIRMED STOP ({} min >= {} min threshold).",
            trip.id, stopped_minutes, threshold_minutes
        );

        DetectionOutcome {
            trip_id: trip.id,
            unit: trip.unit_label(),
            verdict: "paro_confirmado".into(),
            stop_emitted: true,
            debounced: false,
        }
    }

    /// Lectura de debounce con política fail-open.
    async fn is_debounced(&self, trip_id: i64, now: DateTime<Utc>) -> bool {
        let debounce_start = now - Duration::minutes(DEBOUNCE_WINDOW_MINUTES);

        let recent_call = match self
            .call_logs
            .has_recent_of_kind(trip_id, CallKind::Paro, debounce_start)
            .await
        {
            Ok(found) => found,
            Err(fault) => {
                warn!("🛑 [STOP_WATCH]: Call-log debounce read failed ({}). Assuming no recent alert.", fault);
                false
            }
        };
        if recent_call {
            return true;
        }

        match self
            .events
            .has_recent_of_type(trip_id, UnitEventType::AlertaParoIa, debounce_start)
            .await
        {
            Ok(found) => found,
            Err(fault) => {
                warn!("🛑 [STOP_WATCH]: Event debounce read failed ({}). Assuming no recent alert.", fault);
                false
            }
        }
    }

    /**
     * Deja un único evento 'reinicio_movimiento' cuando un viaje con
     * token de paro vivo vuelve a moverse. El propio evento de reinicio
     * (posterior a la última alerta) evita la repetición.
     */
    async fn record_restart_if_needed(&self, trip: &Trip, now: DateTime<Utc>) {
        let latest_alert = match self
            .events
            .latest_occurrence(trip.id, UnitEventType::AlertaParoIa)
            .await
        {
            Ok(Some(when)) if now - when <= Duration::minutes(DEBOUNCE_WINDOW_MINUTES) => when,
            _ => return,
        };

        let already_recorded = match self
            .events
            .latest_occurrence(trip.id, UnitEventType::ReinicioMovimiento)
            .await
        {
            Ok(Some(restart_at)) => restart_at > latest_alert,
            Ok(None) => false,
            Err(_) => true, // lectura fallida: mejor callar que duplicar el rastro
        };

        if already_recorded {
            return;
        }

        let description = format!("Unidad {} reanudó movimiento tras alerta de paro", trip.unit_label());
        if let Err(fault) = self
            .events
            .append(trip.id, UnitEventType::ReinicioMovimiento, &description, now)
            .await
        {
            warn!("🛑 [STOP_WATCH]: Restart event append failed for trip {}: {}.", trip.id, fault);
        } else {
            info!("🟢 [STOP_WATCH]: Trip {} movement restart recorded.", trip.id);
        }
    }
}
