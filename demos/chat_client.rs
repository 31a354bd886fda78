//! Interactive hub chat client
//!
//! Run with: cargo run --example chat_client -- USER_ID [HUB_ADDR]
//!
//! Examples:
//!   cargo run --example chat_client -- alice                  # talks to 127.0.0.1:5050
//!   cargo run --example chat_client -- bob 192.168.1.20:5050
//!
//! Once registered, type `recipient message...` and press enter to send
//! a chat. Inbound messages print as they arrive.

use switchboard_rs::client::HubClient;
use switchboard_rs::wire::Envelope;
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_usage() {
    eprintln!("Usage: chat_client USER_ID [HUB_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  USER_ID     Identifier to register under");
    eprintln!("  HUB_ADDR    Hub address (default: 127.0.0.1:5050)");
    eprintln!();
    eprintln!("Once connected, type `recipient message...` to send a chat.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let Some(user_id) = args.get(1) else {
        print_usage();
        std::process::exit(1);
    };
    let addr = args.get(2).map(String::as_str).unwrap_or("127.0.0.1:5050");

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("switchboard_rs=info".parse()?),
        )
        .init();

    let mut client = HubClient::connect(addr).await?;
    let ack = client.register(user_id).await?;
    println!("Registered as '{}'", ack.user_id);
    println!("Type `recipient message...` to send a chat. Ctrl+C to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break; // stdin closed
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.split_once(' ') {
                    Some((to, message)) => client.send_chat(to, message).await?,
                    None => eprintln!("Expected `recipient message...`"),
                }
            }
            envelope = client.next_envelope() => {
                let Some(envelope) = envelope? else {
                    println!("Hub closed the connection");
                    break;
                };
                match envelope {
                    Envelope::Relay(relay) => {
                        let from = relay
                            .fields
                            .get("from")
                            .and_then(|v| v.as_str())
                            .unwrap_or("?");
                        match relay.fields.get("message").and_then(|v| v.as_str()) {
                            Some(text) => println!("[{from}] {text}"),
                            None => println!("[{from}] {} frame: {:?}", relay.kind, relay.fields),
                        }
                    }
                    other => println!("Received: {other:?}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nBye");
                break;
            }
        }
    }

    client.close().await?;
    Ok(())
}
