//! Example: list current SMB share-mode locks and their resolved paths.
//!
//! Usage:
//!   QUMULO_ADDRESS=cluster.example.com \
//!   QUMULO_TOKEN=session-v1:... \
//!   cargo run --example list_locks [filter]
//!
//! Set QUMULO_INSECURE=1 to skip TLS verification (self-signed clusters).

use qumulo_locks::{ClusterConfig, Diagnostic, HttpTransport, LockSession, QumuloError, Result};
use tokio::sync::mpsc;

fn env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| QumuloError::Decode {
        what: "environment",
        detail: format!("{name} is not set"),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let address = env("QUMULO_ADDRESS")?;
    let token = env("QUMULO_TOKEN")?;
    let insecure = std::env::var("QUMULO_INSECURE").is_ok_and(|v| v == "1");
    let filter = std::env::args().nth(1).unwrap_or_default();

    let config = ClusterConfig::new(address, token).accept_invalid_certs(insecure);
    let transport = HttpTransport::new(&config)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Diagnostic>();
    let mut session = LockSession::connect(transport, Some(tx)).await?;
    eprintln!("authenticated as {}", session.user());

    let records = session.refresh(&filter).await?.to_vec();
    while let Ok(event) = rx.try_recv() {
        eprintln!("[{:?}] {event}", event.level());
    }

    println!(
        "{:<10} {:<40} {:<24} {:<16} {:<16}",
        "File ID", "File Path", "Lock Mode", "Holder", "Node"
    );
    for record in &records {
        println!(
            "{:<10} {:<40} {:<24} {:<16} {:<16}",
            record.file_id, record.path, record.mode, record.owner_address, record.node_address
        );
    }

    Ok(())
}
