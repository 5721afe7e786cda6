//! Basic usage example - read and write a switch backed by Workers KV
//!
//! Requires `CLOUDFLARE_API_TOKEN` and `CLOUDFLARE_ACCOUNT_ID` in the
//! environment. Run with: cargo run --example basic_usage [namespace]

use switchkit::{Result, SwitchKit, SwitchKitError};
use switchkit_cloudflare::{CloudflareKvAdaptor, CloudflareKvOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let auth_token = std::env::var("CLOUDFLARE_API_TOKEN")
        .map_err(|_| SwitchKitError::Validation {
            field: "CLOUDFLARE_API_TOKEN".to_string(),
            message: "environment variable is not set".to_string(),
        })?;
    let account_id = std::env::var("CLOUDFLARE_ACCOUNT_ID")
        .map_err(|_| SwitchKitError::Validation {
            field: "CLOUDFLARE_ACCOUNT_ID".to_string(),
            message: "environment variable is not set".to_string(),
        })?;

    // Namespace title from args or a default
    let namespace = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "switchkit-demo".to_string());

    println!("Resolving namespace: {}", namespace);

    let options = CloudflareKvOptions::new(auth_token, account_id);
    let mut switches = SwitchKit::new(CloudflareKvAdaptor::new(&namespace, options)?);
    switches.init().await;

    if !switches.is_initialized() {
        println!("Namespace resolution failed, see log output.");
        return Ok(());
    }

    println!("Writing switch checkout-v2=on ...");
    switches.set("checkout-v2", "on", None).await?;

    match switches.get("checkout-v2").await? {
        Some(switch) => println!("checkout-v2 = {}", switch.value),
        None => println!("checkout-v2 not found."),
    }

    Ok(())
}
