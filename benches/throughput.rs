use minikv::config::Config;
use minikv::persistence::aof::{AofWriter, FsyncPolicy};
use minikv::resp::encode_command;
use minikv::store::Store;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

fn start_server(port: u16, aof_path: Option<&Path>) -> tokio::task::JoinHandle<()> {
    let config = Config {
        port,
        ..Default::default()
    };
    let store = Arc::new(RwLock::new(Store::new()));
    let mut writer = AofWriter::new();
    if let Some(path) = aof_path {
        writer.open(path, FsyncPolicy::No).unwrap();
    }
    let aof = Arc::new(Mutex::new(writer));

    tokio::spawn(async move {
        let _ = minikv::server::run_server(store, config, aof).await;
    })
}

fn get_client(port: u16) -> TcpStream {
    for i in 0..50 {
        match TcpStream::connect(("127.0.0.1", port)) {
            Ok(conn) => return conn,
            Err(_) if i < 49 => {
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            Err(e) => panic!("Failed to connect: {e}"),
        }
    }
    unreachable!()
}

fn query(conn: &mut TcpStream, words: &[&str]) -> Vec<u8> {
    conn.write_all(&encode_command(words).unwrap()).unwrap();
    let mut reply = Vec::new();
    let mut chunk = [0u8; 64];
    while !reply.ends_with(b"\r\n") {
        let n = conn.read(&mut chunk).unwrap();
        assert!(n > 0, "server closed connection");
        reply.extend_from_slice(&chunk[..n]);
    }
    reply
}

fn ops_per_sec(iterations: usize, mut op: impl FnMut(usize)) -> f64 {
    let start = Instant::now();
    for i in 0..iterations {
        op(i);
    }
    iterations as f64 / start.elapsed().as_secs_f64()
}

fn bench_set_get(conn: &mut TcpStream, iterations: usize) -> (f64, f64) {
    let set_ops = ops_per_sec(iterations, |i| {
        query(conn, &["SET", &format!("k{i}"), &format!("v{i}")]);
    });
    let get_ops = ops_per_sec(iterations, |i| {
        query(conn, &["GET", &format!("k{i}")]);
    });
    (set_ops, get_ops)
}

fn bench_hset_hget(conn: &mut TcpStream, iterations: usize) -> (f64, f64) {
    let hset_ops = ops_per_sec(iterations, |i| {
        query(conn, &["HSET", "bench", &format!("f{i}"), &format!("v{i}")]);
    });
    let hget_ops = ops_per_sec(iterations, |i| {
        query(conn, &["HGET", "bench", &format!("f{i}")]);
    });
    (hset_ops, hget_ops)
}

#[tokio::main]
async fn main() {
    let dir = tempfile::tempdir().unwrap();
    let aof_path = dir.path().join("aof");

    let port = 17000;
    let aof_port = 17001;
    let _server = start_server(port, None);
    let _aof_server = start_server(aof_port, Some(&aof_path));
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    tokio::task::spawn_blocking(move || {
        let iterations = 10_000;
        println!("=== minikv Benchmark ({iterations} operations) ===\n");

        let mut conn = get_client(port);
        let ping_ops = ops_per_sec(iterations, |_| {
            query(&mut conn, &["PING"]);
        });
        println!("PING:        {ping_ops:>10.0} ops/sec");

        let (set_ops, get_ops) = bench_set_get(&mut conn, iterations);
        println!("SET:         {set_ops:>10.0} ops/sec");
        println!("GET:         {get_ops:>10.0} ops/sec");

        let (hset_ops, hget_ops) = bench_hset_hget(&mut conn, iterations);
        println!("HSET:        {hset_ops:>10.0} ops/sec");
        println!("HGET:        {hget_ops:>10.0} ops/sec");

        let mut conn = get_client(aof_port);
        let (set_ops, _) = bench_set_get(&mut conn, iterations);
        println!("SET (AOF):   {set_ops:>10.0} ops/sec");

        println!("\n=== Done ===");
    })
    .await
    .unwrap();
}
