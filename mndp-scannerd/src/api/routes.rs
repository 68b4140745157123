use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use tokio::sync::watch;
use shared::codec::MacAddress;
use shared::protocol::{API_DEVICES, API_DEVICES_HASH, WS_PATH};
use shared::types::{DeviceRecord, DeviceSnapshot};
use crate::api::ws;
use crate::notifier::Notifier;
use crate::registry::DeviceRegistry;

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<DeviceRegistry>,
    pub notifier: Arc<Notifier>,
    pub hash_rx: watch::Receiver<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(WS_PATH, get(ws::ws_handler))
        .route(API_DEVICES, get(get_devices))
        .route(API_DEVICES_HASH, get(get_hash))
        .route(&format!("{API_DEVICES}/:mac"), get(get_device))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn get_devices(State(state): State<AppState>) -> Json<DeviceSnapshot> {
    Json(state.registry.snapshot())
}

async fn get_hash(State(state): State<AppState>) -> String {
    state.hash_rx.borrow().clone()
}

async fn get_device(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<DeviceRecord>, StatusCode> {
    let mac: MacAddress = mac.parse().map_err(|_| StatusCode::BAD_REQUEST)?;

    state
        .registry
        .get(&mac)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use chrono::Utc;

    fn test_state() -> AppState {
        let registry = Arc::new(DeviceRegistry::new());
        registry.upsert(DeviceRecord {
            source_mac: "aa:bb:cc:dd:ee:ff".parse().unwrap(),
            sender_ip: IpAddr::V4(Ipv4Addr::new(192, 168, 88, 1)),
            observed_at: "12:00:00".to_string(),
            last_seen: Utc::now(),
            identity: Some("router".to_string()),
            version: None,
            platform: None,
            software_id: None,
            board: None,
            interface_name: None,
            ipv4_address: None,
            ipv6_address: None,
            uptime: None,
        });
        let (_hash_tx, hash_rx) = watch::channel("abc123".to_string());

        AppState {
            registry,
            notifier: Arc::new(Notifier::new()),
            hash_rx,
        }
    }

    #[tokio::test]
    async fn test_get_devices() {
        let Json(devices) = get_devices(State(test_state())).await;
        assert_eq!(devices.len(), 1);
    }

    #[tokio::test]
    async fn test_get_device_accepts_any_mac_spelling() {
        let Json(device) = get_device(State(test_state()), Path("AA-BB-CC-DD-EE-FF".to_string()))
            .await
            .unwrap();
        assert_eq!(device.identity.as_deref(), Some("router"));
    }

    #[tokio::test]
    async fn test_get_device_errors() {
        let missing = get_device(State(test_state()), Path("11:22:33:44:55:66".to_string())).await;
        assert_eq!(missing.unwrap_err(), StatusCode::NOT_FOUND);

        let malformed = get_device(State(test_state()), Path("nope".to_string())).await;
        assert_eq!(malformed.unwrap_err(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_hash() {
        assert_eq!(get_hash(State(test_state())).await, "abc123");
    }
}
