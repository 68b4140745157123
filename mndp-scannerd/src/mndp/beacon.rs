use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use shared::codec::PacketEncoder;
use shared::protocol::{BEACON_INTERVAL, MNDP_BROADCAST_ADDR, MNDP_PORT};
use crate::mndp::host::HostInfo;

/// Ephemeral-port UDP socket allowed to send to the broadcast address
fn create_broadcast_socket() -> std::io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_broadcast(true)?;

    let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;

    UdpSocket::from_std(socket.into())
}

/// Announce this host every [`BEACON_INTERVAL`] until cancelled.
///
/// Only failing to open the socket ends the task; a failed send is logged and
/// retried on the next tick.
pub async fn run_beacon(host: HostInfo, cancel: CancellationToken) -> Result<()> {
    let socket = create_broadcast_socket().context("Failed to create beacon socket")?;
    let target = SocketAddrV4::new(MNDP_BROADCAST_ADDR, MNDP_PORT);
    let encoder = PacketEncoder::new();

    tracing::info!("Announcing to {} every {:?}", target, BEACON_INTERVAL);

    let mut interval = tokio::time::interval(BEACON_INTERVAL);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let facts = host.facts();
                let packet = match encoder.encode(&facts) {
                    Ok(packet) => packet,
                    Err(e) => {
                        tracing::error!("Failed to encode announcement: {}", e);
                        continue;
                    }
                };

                match socket.send_to(&packet, target).await {
                    Ok(sent) => tracing::debug!("Sent {} byte announcement as {}", sent, facts.identity),
                    Err(e) => tracing::warn!("Failed to send announcement: {}", e),
                }
            }

            _ = cancel.cancelled() => {
                tracing::info!("Beacon shutting down");
                break;
            }
        }
    }

    Ok(())
}
