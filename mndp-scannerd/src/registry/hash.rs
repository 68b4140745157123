use std::net::IpAddr;
use serde::Serialize;
use sha2::{Sha256, Digest};
use shared::codec::MacAddress;
use shared::types::DeviceSnapshot;

/// Hash only device data: observed_at/last_seen change on every
/// announcement even when nothing about the device did.
#[derive(Serialize)]
struct HashView<'a> {
    source_mac: &'a MacAddress,
    sender_ip: &'a IpAddr,
    identity: &'a Option<String>,
    version: &'a Option<String>,
    platform: &'a Option<String>,
    software_id: &'a Option<String>,
    board: &'a Option<String>,
    interface_name: &'a Option<String>,
    ipv4_address: &'a Option<String>,
    ipv6_address: &'a Option<String>,
    uptime: &'a Option<String>,
}

/// Computes a SHA-256 hash of the device snapshot.
/// The snapshot is ordered by MAC, so the output is deterministic.
pub fn compute_hash(devices: &DeviceSnapshot) -> String {
    let views: Vec<HashView<'_>> = devices
        .values()
        .map(|d| HashView {
            source_mac: &d.source_mac,
            sender_ip: &d.sender_ip,
            identity: &d.identity,
            version: &d.version,
            platform: &d.platform,
            software_id: &d.software_id,
            board: &d.board,
            interface_name: &d.interface_name,
            ipv4_address: &d.ipv4_address,
            ipv6_address: &d.ipv6_address,
            uptime: &d.uptime,
        })
        .collect();

    let json = serde_json::to_string(&views)
        .expect("Failed to serialize devices for hashing");

    let hash = Sha256::digest(json.as_bytes());
    hex::encode(hash)
}
