// [apps/central/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: CENTRAL SOVEREIGN KERNEL (V10.0 - GRACEFUL)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: IGNICIÓN DE DAEMONS Y TRANSPORTE HTTP
 *
 * VISION HIPER-HOLÍSTICA:
 * Placa base donde se conectan los servicios: valida la sesión contra
 * el puente, arma el daemon de cadencia y levanta la superficie de
 * control. El apagado es ordenado: la señal detiene la cadencia, el
 * ciclo en vuelo termina solo, Axum drena y el proceso sale.
 * =================================================================
 */

use crate::config::CentralConfig;
use crate::routes::create_control_router;
use crate::services::SchedulerDaemon;
use crate::state::CommandState;
use std::net::{IpAddr, SocketAddr};
use tokio::sync::watch;
use tracing::{error, info, warn};

pub struct CentralKernel {
    pub application_state: CommandState,
    server_network_port: u16,
}

impl CentralKernel {
    /**
     * Forja el estado maestro y valida la sesión inicial contra el
     * puente. Un login fallido al arranque NO es fatal: el ciclo lo
     * reintentará en el próximo tick.
     */
    pub async fn ignite(config: CentralConfig) -> anyhow::Result<Self> {
        let server_network_port = config.port;
        let application_state = CommandState::new(config)?;

        match application_state.bridge.ensure_authenticated().await {
            Ok(()) => info!("🔑 [KERNEL]: Bridge session established at ignition."),
            Err(fault) => warn!("🔑 [KERNEL]: Initial bridge login failed ({}). Cycle will retry.", fault),
        }

        Ok(Self { application_state, server_network_port })
    }

    /// Lanza daemons y servidor HTTP; regresa al completar el apagado.
    pub async fn launch_operations(self) -> anyhow::Result<()> {
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);

        // --- 1. DAEMON DE CADENCIA (scrape + detección IA) ---
        let scheduler_handle = SchedulerDaemon::spawn(self.application_state.clone(), shutdown_receiver);

        // --- 2. TRANSPORTE HTTP (superficie de control) ---
        let control_router = create_control_router(self.application_state.clone());
        let bind_address = SocketAddr::new("0.0.0.0".parse::<IpAddr>()?, self.server_network_port);

        let tcp_listener = tokio::net::TcpListener::bind(bind_address).await?;
        info!("🚀 [KERNEL_ONLINE]: Centinela control surface listening at {}.", bind_address);

        let serve_result = axum::serve(tcp_listener, control_router)
            .with_graceful_shutdown(async {
                if let Err(fault) = tokio::signal::ctrl_c().await {
                    error!("💀 [KERNEL]: Signal listener collapsed: {}.", fault);
                }
                info!("🛑 [KERNEL]: Termination signal received. Draining...");
            })
            .await;

        // --- 3. APAGADO ORDENADO ---
        let _ = shutdown_sender.send(true);
        if let Err(join_fault) = scheduler_handle.await {
            warn!("⏱️  [KERNEL]: Scheduler daemon join fault: {}.", join_fault);
        }

        serve_result.map_err(anyhow::Error::from)?;
        info!("👋 [KERNEL]: Centinela central stopped cleanly.");
        Ok(())
    }
}
