//! Smoke test binary for the upstream relay
//! This is a utility binary, not part of the main application
//!
//! Usage: relay_smoke [message]

use chat_relay_gateway::{
    chat::ConversationStore,
    completion::HttpCompletionClient,
    config::Config,
    relay::{RelayDefaults, RelayService, RelayResult},
};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    println!("Testing the upstream relay from Rust...\n");

    // Test 1: Configuration
    println!("1. Loading configuration from the environment...");
    let config = match Config::from_env() {
        Ok(config) => {
            println!("   ✓ Endpoint: {}", config.upstream.api_url);
            println!("   ✓ Default model: {}", config.upstream.default_model);
            config
        }
        Err(e) => {
            eprintln!("   ✗ {}", e);
            eprintln!("   Make sure to export it: export UPSTREAM_API_KEY=\"your-key\"");
            eprintln!("   Or load from .env file");
            return Err(e.into());
        }
    };

    // Test 2: Relay one message
    let message = env::args()
        .nth(1)
        .unwrap_or_else(|| "What is 2+2? Answer in one sentence.".to_string());
    println!("\n2. Relaying message...");
    println!("   Message: '{}'", message);

    let relay = RelayService::new(
        Arc::new(ConversationStore::new()),
        Arc::new(HttpCompletionClient::from_config(&config.upstream)),
        RelayDefaults::from(&config.upstream),
    );

    match relay.send_message(&message, None, None).await {
        RelayResult::Replied(turn) => {
            println!("   ✓ Response received:");
            println!("   {}", turn.content().trim());
        }
        RelayResult::Failed(error) => {
            eprintln!("   ✗ Relay failed:");
            eprintln!("   {}", error);
            eprintln!("\n   Troubleshooting:");
            eprintln!("   - Check UPSTREAM_API_KEY and UPSTREAM_API_URL");
            return Err(error.into());
        }
    }

    // Test 3: History bookkeeping
    println!("\n3. Checking conversation log...");
    let history = relay.get_history().await;
    println!("   ✓ {} turns recorded", history.len());

    println!("\n✓ All checks completed!");
    Ok(())
}
