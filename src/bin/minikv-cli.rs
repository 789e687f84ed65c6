use bytes::BytesMut;
use std::io::{self, BufRead, Write};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use minikv::config::Config;
use minikv::resp::encode_command;

/// Usage: `minikv-cli [host:port]`
#[tokio::main]
async fn main() -> io::Result<()> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| Config::default().addr());
    let mut stream = TcpStream::connect(&addr).await?;
    eprintln!("Connected to {addr}");

    let mut lines = io::stdin().lock().lines();
    loop {
        print!("{addr}> ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => continue,
            ["QUIT" | "quit"] => break,
            _ => {}
        }
        let cmd = match encode_command(&tokens) {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("(error) {e}");
                continue;
            }
        };

        stream.write_all(&cmd).await?;

        // Every reply is a single CRLF-terminated line
        let mut buf = BytesMut::with_capacity(256);
        loop {
            let n = stream.read_buf(&mut buf).await?;
            if n == 0 {
                eprintln!("Connection closed by server");
                return Ok(());
            }
            if let Some(end) = buf.windows(2).position(|w| w == b"\r\n") {
                println!("{}", render_reply(&String::from_utf8_lossy(&buf[..end])));
                break;
            }
        }
    }

    Ok(())
}

fn render_reply(line: &str) -> String {
    match line.split_at_checked(1) {
        Some(("+", s)) => s.to_string(),
        Some(("-", s)) => format!("(error) {s}"),
        Some(("_", _)) => "(nil)".to_string(),
        _ => line.to_string(),
    }
}
