//! Binds the UDP/269 socket and joins the All-MANET-Routers multicast group.

use std::net::{Ipv6Addr, SocketAddrV6};

use socket2::{Domain, Protocol, Socket, Type};

/// AODVv2's well-known UDP port.
pub const AODVV2_PORT: u16 = 269;

/// All-MANET-Routers multicast address, link-local scope.
pub const ALL_MANET_ROUTERS: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0x6d);

/// Binds a non-blocking IPv6 UDP socket to port 269 on all interfaces and
/// joins [`ALL_MANET_ROUTERS`] on `interface_index`.
pub(crate) fn bind(interface_index: u32) -> std::io::Result<tokio::net::UdpSocket> {
    let socket = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_only_v6(true)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;

    let bind_addr = SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, AODVV2_PORT, 0, 0);
    socket.bind(&bind_addr.into())?;
    socket.join_multicast_v6(&ALL_MANET_ROUTERS, interface_index)?;

    tokio::net::UdpSocket::from_std(socket.into())
}
