use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use chrono::Local;
use shared::codec::decode_packet;
use shared::protocol::{MNDP_PORT, RECV_BUFFER_LEN};
use shared::types::DeviceRecord;

/// Bind on all interfaces with SO_REUSEADDR/SO_REUSEPORT so other MNDP
/// listeners on this host keep working.
fn create_listener_socket(port: u16) -> std::io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;

    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    socket.set_broadcast(true)?;

    let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;

    UdpSocket::from_std(socket.into())
}

/// Turn one datagram into a device record, if it names a device
fn handle_datagram(datagram: &[u8], sender: SocketAddr) -> Option<DeviceRecord> {
    let packet = decode_packet(datagram);
    let sequence = packet.sequence;

    match DeviceRecord::from_announcement(packet, sender.ip(), Local::now()) {
        Some(record) => {
            tracing::debug!("Announcement from {} ({}) seq {:?}", record.source_mac, sender, sequence);
            Some(record)
        }
        None => {
            tracing::debug!("Ignoring {} byte packet from {} without MAC", datagram.len(), sender);
            None
        }
    }
}

pub async fn run_listener(tx: mpsc::Sender<DeviceRecord>, cancel: CancellationToken) -> Result<()> {
    let socket = create_listener_socket(MNDP_PORT)
        .with_context(|| format!("Failed to bind MNDP listener on port {}", MNDP_PORT))?;

    tracing::info!("Listening for announcements on UDP port {}", MNDP_PORT);
    listen(socket, tx, cancel).await
}

/// Receive loop. Receive errors are logged and never end the loop.
async fn listen(socket: UdpSocket, tx: mpsc::Sender<DeviceRecord>, cancel: CancellationToken) -> Result<()> {
    let mut buf = vec![0u8; RECV_BUFFER_LEN];

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, sender)) => {
                        if let Some(record) = handle_datagram(&buf[..len], sender) {
                            if let Err(e) = tx.send(record).await {
                                tracing::error!("Failed to forward device record: {}", e);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Error receiving packet: {}", e);
                    }
                }
            }

            _ = cancel.cancelled() => {
                tracing::info!("Listener shutting down");
                break;
            }
        }
    }

    Ok(())
}
