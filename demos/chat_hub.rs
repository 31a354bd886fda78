//! Presence and relay hub example
//!
//! Run with: cargo run --example chat_hub [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example chat_hub                  # binds to 0.0.0.0:5050
//!   cargo run --example chat_hub localhost        # binds to 127.0.0.1:5050
//!   cargo run --example chat_hub 127.0.0.1:6000   # binds to 127.0.0.1:6000
//!
//! HTTP diagnostics (health, interfaces, ping) listen on 5051 unless
//! HUB_HTTP_PORT says otherwise.
//!
//! ## Talking to it
//!
//! With the bundled client:
//!   cargo run --example chat_client -- alice
//!
//! With netcat:
//!   printf '{"type":"register","userId":"alice"}\n' | nc localhost 5050

use std::net::SocketAddr;
use std::sync::Arc;

use switchboard_rs::http::{self, DiagState};
use switchboard_rs::{HubConfig, HubServer};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:5050
/// - "localhost:6000" -> 127.0.0.1:6000
/// - "127.0.0.1" -> 127.0.0.1:5050
/// - "0.0.0.0:5050" -> 0.0.0.0:5050
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 5050;

    // Replace "localhost" with "127.0.0.1"
    let normalized = arg.replace("localhost", "127.0.0.1");

    // Try parsing as SocketAddr first (includes port)
    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    // Try parsing as IP address without port
    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: chat_hub [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:5050)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PORT             Relay port when BIND_ADDR is not given");
    eprintln!("  HUB_HTTP_PORT    Diagnostics port (default: 5051)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("switchboard_rs=debug".parse()?)
                .add_directive("chat_hub=debug".parse()?),
        )
        .init();

    let mut config = HubConfig::from_env();
    if let Some(addr_str) = args.get(1) {
        match parse_bind_addr(addr_str) {
            Ok(addr) => config.bind_addr = addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    println!("Starting hub on {}", config.bind_addr);
    println!("Diagnostics on http://{}/health", config.http_addr);
    println!();
    println!("=== Register ===");
    println!(
        "  printf '{{\"type\":\"register\",\"userId\":\"alice\"}}\\n' | nc localhost {}",
        config.bind_addr.port()
    );
    println!();
    println!("=== Send a message ===");
    println!("  {{\"type\":\"message\",\"to\":\"alice\",\"from\":\"bob\",\"message\":\"hi\"}}");
    println!();

    let http_addr = config.http_addr;
    let server = HubServer::new(config);
    let diag = Arc::new(DiagState::new(
        Arc::clone(server.registry()),
        Arc::clone(server.stats()),
    ));

    tokio::spawn(async move {
        if let Err(e) = http::serve(http_addr, diag).await {
            eprintln!("Diagnostics error: {}", e);
        }
    });

    // Run with Ctrl+C handling
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Hub error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    Ok(())
}
