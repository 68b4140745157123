use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use shared::codec::MacAddress;
use shared::types::{DeviceRecord, DeviceSnapshot};

/// Latest record per hardware address.
///
/// All access goes through one mutex; callers only ever get copies out.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<MacAddress, DeviceRecord>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // No critical section here can leave the map half-updated, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, HashMap<MacAddress, DeviceRecord>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or wholesale replace the record for its hardware address.
    /// Returns the record it replaced, if any.
    pub fn upsert(&self, record: DeviceRecord) -> Option<DeviceRecord> {
        self.lock().insert(record.source_mac, record)
    }

    /// Copy of the whole registry
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.lock()
            .iter()
            .map(|(mac, record)| (*mac, record.clone()))
            .collect()
    }

    pub fn get(&self, mac: &MacAddress) -> Option<DeviceRecord> {
        self.lock().get(mac).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}
