use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use anyhow::Result;
use shared::types::DeviceRecord;
use crate::notifier::Notifier;
use crate::registry::{hash, DeviceRegistry};

/// Apply one record: upsert, then publish the new state to the hash watchers
/// and to every subscriber.
pub fn apply(
    registry: &DeviceRegistry,
    notifier: &Notifier,
    hash_tx: &watch::Sender<String>,
    record: DeviceRecord,
) {
    let mac = record.source_mac;
    if registry.upsert(record).is_none() {
        tracing::info!("New device {} ({} known)", mac, registry.len());
    }

    let snapshot = Arc::new(registry.snapshot());
    hash_tx.send_replace(hash::compute_hash(&snapshot));

    let delivered = notifier.broadcast(snapshot);
    tracing::trace!("Published update for {} to {} subscribers", mac, delivered);
}

/// Registry manager event loop - bridges listener records to the registry
pub async fn run(
    registry: Arc<DeviceRegistry>,
    notifier: Arc<Notifier>,
    hash_tx: watch::Sender<String>,
    mut rx: mpsc::Receiver<DeviceRecord>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            Some(record) = rx.recv() => {
                apply(&registry, &notifier, &hash_tx, record);
            }
            _ = cancel.cancelled() => {
                tracing::info!("Registry manager shutting down");
                break;
            }
        }
    }

    Ok(())
}
