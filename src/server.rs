use crate::command;
use crate::config::Config;
use crate::persistence::aof::{FsyncPolicy, SharedAofWriter};
use crate::resp::Decoder;
use crate::store::SharedStore;
use bytes::BytesMut;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

pub async fn run_server(
    store: SharedStore,
    config: Config,
    aof: SharedAofWriter,
) -> std::io::Result<()> {
    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("minikv listening on {addr}");

    if aof.lock().await.fsync_policy() == FsyncPolicy::Everysec {
        let aof_clone = aof.clone();
        tokio::spawn(async move {
            aof_fsync_loop(aof_clone).await;
        });
    }

    // Accept loop with graceful shutdown on ctrl-c
    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = result?;
                debug!("New connection from {peer_addr}");

                let store = store.clone();
                let aof = aof.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, store, aof).await {
                        debug!("Connection error from {peer_addr}: {e}");
                    }
                    debug!("Connection closed: {peer_addr}");
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                let mut aof = aof.lock().await;
                if let Err(e) = aof.sync() {
                    warn!("Failed to sync AOF on shutdown: {e}");
                }
                return Ok(());
            }
        }
    }
}

/// Each read is handled as one complete request.
async fn handle_connection(
    mut stream: TcpStream,
    store: SharedStore,
    aof: SharedAofWriter,
) -> std::io::Result<()> {
    let mut buf = BytesMut::with_capacity(1024);

    loop {
        buf.clear();
        if stream.read_buf(&mut buf).await? == 0 {
            return Ok(());
        }

        let response = process_request(&buf, &store, &aof).await;
        stream.write_all(&response).await?;
    }
}

/// Decode, execute and (for writes) log one request buffer, returning the
/// serialized reply.
///
/// The store lock is held across the append so log order matches the order
/// mutations were applied. The store is updated before the append; a crash
/// between the two loses that write on restart.
pub async fn process_request(
    buf: &[u8],
    store: &SharedStore,
    aof: &SharedAofWriter,
) -> Vec<u8> {
    let frame = Decoder::decode(buf);
    if frame.consumed < buf.len() {
        debug!("Ignoring {} bytes past the decoded frame", buf.len() - frame.consumed);
    }

    let mut store = store.write().await;
    let outcome = command::dispatch(&frame, &mut store);

    if outcome.persist {
        let mut aof = aof.lock().await;
        if let Err(e) = aof.append(frame.raw(buf)) {
            warn!("Failed to append to AOF: {e}");
        }
    }

    outcome.reply.serialize()
}

/// Background task that syncs the AOF every second (for everysec policy).
async fn aof_fsync_loop(aof: SharedAofWriter) {
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let mut aof = aof.lock().await;
        if let Err(e) = aof.sync() {
            warn!("Failed to sync AOF: {e}");
        }
    }
}
