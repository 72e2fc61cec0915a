//! Example: Print live readings from a VBUS gateway.
//!
//! Usage: cargo run --example live_data -- <host> [port] [password]
//!
//! Set `RUST_LOG=debug` together with `VBUS_TRACE=7` to see hex dumps,
//! command lines and dropped frames.

use std::env;

use tracing_subscriber::EnvFilter;
use vbus_client::{Connection, ConnectionConfig, TraceOptions};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <host> [port] [password]", args[0]);
        eprintln!("Example: {} 192.168.13.45 7053 vbus", args[0]);
        std::process::exit(1);
    }

    let mut config = ConnectionConfig::new(args[1].as_str());
    if let Some(port) = args.get(2) {
        match port.parse() {
            Ok(port) => config = config.with_port(port),
            Err(_) => {
                eprintln!("Invalid port: {}", port);
                std::process::exit(1);
            }
        }
    }
    if let Some(password) = args.get(3) {
        config = config.with_password(password.as_str());
    }
    if let Some(bits) = env::var("VBUS_TRACE").ok().and_then(|v| v.parse().ok()) {
        config = config.with_trace(TraceOptions::from_bits(bits));
    }

    let mut conn = Connection::new(config);
    if let Err(e) = conn.open() {
        eprintln!("Failed to connect: {}", e);
        std::process::exit(1);
    }
    println!("Connected to {}", conn.config().address());

    loop {
        match conn.data() {
            Ok(readings) => {
                for reading in readings {
                    let fields: Vec<String> = reading
                        .iter()
                        .map(|(field, value)| format!("{}={}", field, value))
                        .collect();
                    println!("{}", fields.join(" "));
                }
            }
            Err(e) => {
                eprintln!("Stream ended: {}", e);
                break;
            }
        }
    }
}
