use std::sync::Arc;

use ai_home::config::{self, AppState, Config};
use ai_home::error::ServerError;
use ai_home::{logger, server};

fn main() -> Result<(), ServerError> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    // Connections are served by `spawn_local` tasks on a single thread;
    // file reads still go to the blocking pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), ServerError> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(AppState::new(&cfg));

    if !state.home.resource_base().is_dir() {
        logger::log_warning(&format!(
            "Resource directory {} does not exist; home requests will return 404",
            state.home.resource_base().display()
        ));
    }
    logger::log_server_start(&addr, &cfg);

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            server::shutdown_signal(),
        ))
        .await;

    Ok(())
}
