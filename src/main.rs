use minikv::config::Config;
use minikv::persistence::aof::{self, AofWriter, FsyncPolicy};
use minikv::server;
use minikv::store::Store;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Parse command line args
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_args(&args);

    // Initialize tracing
    let level = config
        .loglevel
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let mut store = Store::new();
    let mut aof_writer = AofWriter::new();

    if config.appendonly {
        let aof_path = config.aof_path();
        let policy = FsyncPolicy::from_str(&config.appendfsync);

        // The log is fully replayed before the listener is bound
        info!("Replaying AOF from {}...", aof_path.display());
        match aof::restore(&aof_path, policy, &mut store) {
            Ok((stats, writer)) => {
                info!(
                    "AOF replayed {} commands ({} strings, {} hashes)",
                    stats.frames_applied,
                    store.string_count(),
                    store.hash_count()
                );
                info!("AOF enabled: {}", aof_path.display());
                aof_writer = writer;
            }
            Err(e) => warn!(
                "Failed to restore AOF: {e}, serving {} strings and {} hashes with AOF disabled",
                store.string_count(),
                store.hash_count()
            ),
        }
    }

    let store = Arc::new(RwLock::new(store));
    let aof = Arc::new(Mutex::new(aof_writer));

    server::run_server(store, config, aof).await
}
