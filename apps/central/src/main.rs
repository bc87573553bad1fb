// [apps/central/src/main.rs]
/*!
 * =================================================================
 * APARATO: CENTRAL MAIN ENTRY POINT (V6.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 * =================================================================
 */

use centinela_central::prelude::*;
use centinela_shared_atalaya::init_tracing;
use dotenvy::dotenv;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. CARGA DE ENTORNO
    // Hidrata las variables de .env en el espacio de nombres del proceso.
    dotenv().ok();

    // 2. OBSERVABILIDAD (ATALAYA)
    init_tracing("centinela_central");

    // 3. RUNTIME ASÍNCRONO
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(async {
        info!("🛰️  [COMMAND_CENTER]: Centinela ignition sequence starting...");

        // 4. CONFIGURACIÓN TIPADA
        let config = CentralConfig::from_env()?;

        // 5. KERNEL: estado, daemons y superficie de control.
        let kernel = CentralKernel::ignite(config).await?;
        kernel.launch_operations().await
    })
}
