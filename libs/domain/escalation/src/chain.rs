// [libs/domain/escalation/src/chain.rs]
/*!
 * =================================================================
 * APARATO: ESCALATION CHAIN DRIVER (V9.1 - HANDOFF SEALED)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: CADENA DE LLAMADAS SOBRE LA JERARQUÍA FIJA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SEQUENTIAL CHAIN: Las llamadas de un mismo paro son estrictamente
 *    secuenciales: cada una depende del desenlace anterior (el contexto
 *    de hand-off no es asociativo).
 * 2. OPERATOR POLICY: El operador jamás detiene la cadena; su resumen
 *    (o su silencio) viaja al siguiente coordinador. El primer rol
 *    no-operador que contesta la termina.
 * 3. FAULT CONTAINMENT: Un rechazo de creación de llamada se registra
 *    con desenlace 'error' y el texto del estatus; la cadena continúa
 *    con el siguiente rol.
 * =================================================================
 */

use crate::dialer::{CallRequest, CallResult, VoiceDialer};
use crate::errors::EscalationError;
use crate::motive::{base_motive, ChainContext, StopSummary};
use crate::phone::normalize_phone_e164;
use crate::prompt::{
    build_system_prompt, first_message, verification_first_message, verification_prompt, PromptParams,
};
use centinela_domain_detection::StopEvent;
use centinela_domain_models::{CallKind, CallOutcome, Contact, ContactRole, Trip, UnitEventType};
use centinela_infra_gateway::repositories::{
    CallLogRepository, ContactRepository, NewCallLog, ProtocolRepository, UnitEventRepository,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Resumen de una llamada colocada por la cadena.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedCall {
    pub role: ContactRole,
    pub phone: String,
    pub answered: bool,
    pub outcome: CallOutcome,
    pub external_call_id: Option<String>,
}

/// Reporte de la cadena de un paro.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub trip_id: i64,
    pub calls: Vec<PlacedCall>,
    /// Rol que contestó y terminó la cadena, si alguno.
    pub halted_by: Option<ContactRole>,
}

/// Motor de escalamiento genérico sobre el puerto de marcado.
pub struct EscalationEngine<D: VoiceDialer> {
    contacts: Arc<ContactRepository>,
    protocols: Arc<ProtocolRepository>,
    call_logs: Arc<CallLogRepository>,
    events: Arc<UnitEventRepository>,
    dialer: D,
}

impl<D: VoiceDialer> EscalationEngine<D> {
    pub fn new(
        contacts: Arc<ContactRepository>,
        protocols: Arc<ProtocolRepository>,
        call_logs: Arc<CallLogRepository>,
        events: Arc<UnitEventRepository>,
        dialer: D,
    ) -> Self {
        Self { contacts, protocols, call_logs, events, dialer }
    }

    /// Procesa los paros confirmados uno a uno (sin concurrencia entre
    /// cadenas del mismo lote: el volumen por ciclo es de dígitos).
    #[instrument(skip(self, stop_events))]
    pub async fn process_stop_events(&self, stop_events: &[StopEvent]) -> Vec<ChainReport> {
        let mut reports = Vec::with_capacity(stop_events.len());

        for stop_event in stop_events {
            match self.escalate_stop(stop_event).await {
                Ok(report) => reports.push(report),
                Err(fault) => {
                    error!("📞 [ESCALATION]: Chain collapsed for trip {}: {}.", stop_event.trip_id, fault);
                }
            }
        }

        reports
    }

    /**
     * Ejecuta la cadena completa de un paro confirmado.
     *
     * # Errors:
     * Solo un fallo de almacenamiento que impida ARMAR la cadena
     * (contactos/protocolo ilegibles) aborta el evento; los fallos por
     * llamada se contienen y la cadena continúa.
     */
    #[instrument(skip(self, stop_event), fields(viaje = stop_event.trip_id))]
    pub async fn escalate_stop(&self, stop_event: &StopEvent) -> Result<ChainReport, EscalationError> {
        let trip = &stop_event.trip;

        // 1. RASTRO DEL PARO EN LA BITÁCORA
        let detection_note = format!(
            "Paro detectado: unidad {} lleva {} minutos detenida",
            trip.unit_label(),
            stop_event.stopped_minutes
        );
        if let Err(fault) = self
            .events
            .append(stop_event.trip_id, UnitEventType::DetencionDetectada, &detection_note, Utc::now())
            .await
        {
            warn!("📞 [ESCALATION]: Detection event append failed: {}.", fault);
        }

        // 2-3. CADENA DE CONTACTOS Y PROTOCOLO EFECTIVO
        let chain = self.contacts.escalation_chain_for_trip(stop_event.trip_id).await?;
        if chain.is_empty() {
            warn!("📞 [ESCALATION]: Trip {} has no escalation contacts.", stop_event.trip_id);
            return Ok(ChainReport { trip_id: stop_event.trip_id, calls: Vec::new(), halted_by: None });
        }

        let protocol = self.protocols.resolve_for_trip(stop_event.trip_id).await?;

        // 4. MOTIVO BASE Y CONTEXTO DE HAND-OFF
        let mut context = ChainContext::new(base_motive(&StopSummary {
            stopped_minutes: stop_event.stopped_minutes,
            threshold_minutes: stop_event.threshold_minutes,
            lat: stop_event.last_lat,
            lng: stop_event.last_lng,
        }));

        let mut placed_calls = Vec::with_capacity(chain.len());
        let mut halted_by = None;

        for contact in chain.iter().filter(|contact| !contact.telefono.trim().is_empty()) {
            let placed = self
                .call_single_role(stop_event, trip, &protocol.idioma, protocol.protocolo.as_deref(), contact, &context)
                .await;

            let answered = placed.answered;
            let summary = placed.summary.clone();
            placed_calls.push(placed.into_placed_call(contact));

            if contact.rol == ContactRole::Operador {
                // El operador alimenta el contexto pero jamás detiene la cadena.
                context.record_operator(answered, summary);
                continue;
            }

            if !context.should_continue_after(contact.rol, answered) {
                info!("📞 [ESCALATION]: Chain halted by {} (answered).", contact.rol.as_str());
                halted_by = Some(contact.rol);
                break;
            }
        }

        Ok(ChainReport { trip_id: stop_event.trip_id, calls: placed_calls, halted_by })
    }

    /// Coloca, persiste y deja rastro de la llamada de un rol.
    async fn call_single_role(
        &self,
        stop_event: &StopEvent,
        trip: &Trip,
        language: &str,
        custom_instructions: Option<&str>,
        contact: &Contact,
        context: &ChainContext,
    ) -> CallResult {
        let normalized_phone = normalize_phone_e164(&contact.telefono);
        let contextual_motive = context.motive_for(contact.rol);
        let unit_label = trip.unit_label();

        let system_prompt = build_system_prompt(&PromptParams {
            language,
            trip_id: trip.id,
            unit_label: &unit_label,
            stopped_minutes: stop_event.stopped_minutes,
            threshold_minutes: stop_event.threshold_minutes,
            lat: stop_event.last_lat,
            lng: stop_event.last_lng,
            custom_instructions,
        });

        let request = CallRequest {
            trip_id: trip.id,
            role: contact.rol,
            phone_e164: normalized_phone.clone(),
            motive: contextual_motive.clone(),
            system_prompt,
            first_message: first_message(language, contact.rol, &unit_label, stop_event.stopped_minutes),
            language: language.to_string(),
            stopped_minutes: stop_event.stopped_minutes,
            origin: trip.origen.clone(),
            destination: trip.destino.clone(),
            reason: "stop_alert".to_string(),
        };

        let call_result = match self.dialer.place_call(&request).await {
            Ok(result) => result,
            Err(fault) => {
                // El rechazo se registra con desenlace 'error' y el texto
                // del estatus; la cadena sigue con el siguiente rol.
                warn!("📞 [ESCALATION]: Call creation failed for {}: {}.", contact.rol.as_str(), fault);
                CallResult {
                    answered: false,
                    outcome: CallOutcome::Error,
                    duration_seconds: None,
                    summary: Some(fault.to_string()),
                    external_call_id: None,
                }
            }
        };

        self.persist_call_trace(
            stop_event.trip_id,
            CallKind::Paro,
            contact,
            &normalized_phone,
            &contextual_motive,
            Some((stop_event.last_lat, stop_event.last_lng)),
            &call_result,
        )
        .await;

        call_result
    }

    /// Registro en llamadas_ia + evento de bitácora (tolerante a fallos).
    #[allow(clippy::too_many_arguments)]
    async fn persist_call_trace(
        &self,
        trip_id: i64,
        kind: CallKind,
        contact: &Contact,
        normalized_phone: &str,
        motive: &str,
        location: Option<(f64, f64)>,
        call_result: &CallResult,
    ) {
        let record = NewCallLog {
            viaje_id: trip_id,
            tipo: kind,
            telefono_llamado: normalized_phone.to_string(),
            rol_destinatario: contact.rol,
            inicio: Utc::now(),
            duracion_segundos: call_result.duration_seconds,
            resultado: call_result.outcome,
            resumen_conversacion: call_result.summary.clone(),
            motivo: motive.to_string(),
            ubicacion_lat: location.map(|(lat, _)| lat),
            ubicacion_lng: location.map(|(_, lng)| lng),
            llamada_externa_id: call_result.external_call_id.clone(),
        };

        if let Err(fault) = self.call_logs.insert_call(&record).await {
            warn!("📞 [ESCALATION]: Call-log insert failed for {}: {}.", contact.rol.as_str(), fault);
        }

        let event_type = if contact.rol == ContactRole::Operador {
            UnitEventType::LlamadaIaOperador
        } else {
            UnitEventType::LlamadaIaCoordinador
        };
        let event_note = format!(
            "Llamada IA a {} ({}): {}",
            contact.rol.as_str(),
            normalized_phone,
            call_result.outcome.as_str()
        );

        if let Err(fault) = self.events.append(trip_id, event_type, &event_note, Utc::now()).await {
            warn!("📞 [ESCALATION]: Call event append failed: {}.", fault);
        }
    }

    /**
     * Llamada manual de verificación fuera de la cadena (superficie de
     * control). Se persiste con tipo 'verificacion'.
     */
    #[instrument(skip(self, trip, custom_message), fields(viaje = trip.id, rol = role.as_str()))]
    pub async fn manual_call(
        &self,
        trip: &Trip,
        role: ContactRole,
        custom_message: Option<&str>,
    ) -> Result<PlacedCall, EscalationError> {
        let contact = self
            .contacts
            .find_by_role(trip.id, role)
            .await?
            .ok_or_else(|| EscalationError::NoContact(role.as_str().to_string()))?;

        let protocol = self.protocols.resolve_for_trip(trip.id).await?;
        let normalized_phone = normalize_phone_e164(&contact.telefono);
        let unit_label = trip.unit_label();

        let motive = custom_message
            .map(str::to_string)
            .unwrap_or_else(|| format!("Llamada de verificación de estatus de la unidad {unit_label}"));

        let request = CallRequest {
            trip_id: trip.id,
            role,
            phone_e164: normalized_phone.clone(),
            motive: motive.clone(),
            system_prompt: verification_prompt(&protocol.idioma, trip.id, &unit_label, custom_message),
            first_message: verification_first_message(&protocol.idioma, role, &unit_label),
            language: protocol.idioma.clone(),
            stopped_minutes: 0,
            origin: trip.origen.clone(),
            destination: trip.destino.clone(),
            reason: "verification".to_string(),
        };

        let call_result = match self.dialer.place_call(&request).await {
            Ok(result) => result,
            Err(fault) => CallResult {
                answered: false,
                outcome: CallOutcome::Error,
                duration_seconds: None,
                summary: Some(fault.to_string()),
                external_call_id: None,
            },
        };

        let location = trip.ultima_lat.zip(trip.ultima_lng);
        self.persist_call_trace(
            trip.id,
            CallKind::Verificacion,
            &contact,
            &normalized_phone,
            &motive,
            location,
            &call_result,
        )
        .await;

        Ok(call_result.into_placed_call(&contact))
    }
}

impl CallResult {
    fn into_placed_call(self, contact: &Contact) -> PlacedCall {
        PlacedCall {
            role: contact.rol,
            phone: normalize_phone_e164(&contact.telefono),
            answered: self.answered,
            outcome: self.outcome,
            external_call_id: self.external_call_id,
        }
    }
}
