// [libs/shared/telemetry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TELEMETRY BOOTSTRAP (V1.0 - MESH ALIGNED)
 * CLASIFICACIÓN: SHARED INFRASTRUCTURE (ESTRATO L0)
 * RESPONSABILIDAD: INICIALIZACIÓN DE TRACING Y CAPTURA DE PÁNICOS
 * =================================================================
 */

use tracing_subscriber::EnvFilter;

/// Inicializa el subscriber global de tracing para un binario de la malla.
///
/// En builds de depuración emite texto compacto a stdout; en release
/// emite JSON de línea, apto para ingestión por un colector externo.
pub fn init_tracing(service_nominal_identifier: &str) {
    let default_directive = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    if cfg!(debug_assertions) {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .compact()
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .flatten_event(true)
            .init();
    }

    install_panic_hook();

    tracing::info!(service = service_nominal_identifier, "telemetry initialized");
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());

        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        tracing::error!(location = %location, payload = %payload, "panic captured");
    }));
}
