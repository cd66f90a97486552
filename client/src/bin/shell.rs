//! Minimal front-end shell: connect, show the signing account and the
//! stored value, optionally overwrite it. Everything interesting lives in
//! the library; this is glue.
//!
//! ```text
//! shell [new-value]
//!
//! VALUE_STORE_ENDPOINT   node endpoint    (default http://127.0.0.1:7545)
//! VALUE_STORE_NETWORK    network id       (default 5777)
//! VALUE_STORE_REGISTRY   descriptor path  (default deployments.json)
//! ```

use std::{env, fs::File};

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use value_store_client::{
    DeploymentRegistry, HttpTransport, LedgerTransport, Signer, ValueStoreClient,
};

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let endpoint = env_or("VALUE_STORE_ENDPOINT", "http://127.0.0.1:7545");
    let network_id = env_or("VALUE_STORE_NETWORK", "5777");
    let registry_path = env_or("VALUE_STORE_REGISTRY", "deployments.json");

    let registry_file = File::open(&registry_path)
        .with_context(|| format!("opening deployment descriptor `{registry_path}`"))?;
    let registry = DeploymentRegistry::from_reader(registry_file)?;

    let transport = HttpTransport::new(&endpoint)?;
    let accounts = transport.accounts().await?;
    let account = accounts
        .first()
        .context("endpoint exposes no signing accounts")?
        .clone();
    println!("Your account: {account}");

    let client = ValueStoreClient::new(&registry, &network_id, transport)?;
    println!("Contract: {}", client.address());

    if let Some(raw) = env::args().nth(1) {
        let new_value: u128 = raw.parse().context("new value must be an integer")?;
        let receipt = client.set_value(new_value, &Signer::new(account)).await?;
        for event in &receipt.events {
            println!("ValueChanged: {}", event.new_value);
        }
    }

    println!("Stored value: {}", client.get_value().await?);
    Ok(())
}
