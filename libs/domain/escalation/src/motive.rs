// [libs/domain/escalation/src/motive.rs]
/*!
 * =================================================================
 * APARATO: CONTEXTUAL MOTIVE PLANNER (V5.0 - PURE ENGINE)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: MOTIVOS DE LLAMADA Y HAND-OFF DEL OPERADOR
 *
 * VISION HIPER-HOLÍSTICA:
 * Planificador puro de la cadena: el contexto del hand-off fluye
 * estrictamente hacia adelante por el orden de roles. El resumen del
 * operador viaja VERBATIM dentro del motivo de cada coordinador; si el
 * operador no contestó, el motivo lo declara. El cliente recibe el
 * motivo base sin hand-off.
 * =================================================================
 */

use centinela_domain_models::ContactRole;

/// Parámetros del motivo base de un paro.
#[derive(Debug, Clone, Copy)]
pub struct StopSummary {
    pub stopped_minutes: i64,
    pub threshold_minutes: i64,
    pub lat: f64,
    pub lng: f64,
}

/// Motivo base: minutos detenida, última fijación a 6 decimales y umbral.
pub fn base_motive(summary: &StopSummary) -> String {
    format!(
        "Unidad detenida {} minutos en {:.6}, {:.6} (umbral configurado: {} minutos)",
        summary.stopped_minutes, summary.lat, summary.lng, summary.threshold_minutes
    )
}

/// Desenlace capturado de la llamada al operador.
#[derive(Debug, Clone)]
pub struct OperatorHandoff {
    pub answered: bool,
    pub summary: Option<String>,
}

/// Contexto conversacional que fluye hacia adelante por la cadena.
#[derive(Debug, Clone)]
pub struct ChainContext {
    base_motive: String,
    operator_handoff: Option<OperatorHandoff>,
}

impl ChainContext {
    pub fn new(base_motive: String) -> Self {
        Self { base_motive, operator_handoff: None }
    }

    /// Captura el desenlace del operador para las llamadas siguientes.
    pub fn record_operator(&mut self, answered: bool, summary: Option<String>) {
        self.operator_handoff = Some(OperatorHandoff { answered, summary });
    }

    pub fn base(&self) -> &str {
        &self.base_motive
    }

    /**
     * Motivo contextual para un rol de la cadena.
     *
     * - Operador (primera llamada): motivo base.
     * - Coordinadores: motivo base + hand-off (resumen verbatim del
     *   operador, o el aviso de que no contestó).
     * - Cliente: motivo base, sin hand-off.
     */
    pub fn motive_for(&self, role: ContactRole) -> String {
        if !role.is_coordinator() {
            return self.base_motive.clone();
        }

        match &self.operator_handoff {
            Some(handoff) if handoff.answered => match &handoff.summary {
                Some(operator_summary) => format!(
                    "{}. Ya se llamó al operador y dijo: {}",
                    self.base_motive, operator_summary
                ),
                None => format!("{}. Ya se llamó al operador y atendió la llamada", self.base_motive),
            },
            Some(_) => format!(
                "{}. El operador no contestó; infórmale al coordinador",
                self.base_motive
            ),
            // Sin llamada previa al operador (sin contacto): motivo base.
            None => self.base_motive.clone(),
        }
    }

    /**
     * Regla de avance de la cadena: el operador NUNCA detiene el
     * escalamiento (la política siempre informa al siguiente
     * coordinador); cualquier otro rol que conteste la termina.
     */
    pub fn should_continue_after(&self, role: ContactRole, answered: bool) -> bool {
        if role == ContactRole::Operador {
            return true;
        }
        !answered
    }
}
