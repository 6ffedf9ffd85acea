use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket},
    time::Duration,
};

/// An unconnected datagram socket.
pub trait DatagramSocket {
    /// Sends `payload` as a single datagram to `remote`, returning the number of bytes sent.
    ///
    /// # Errors
    ///
    /// If the datagram could not be handed to the network stack, an error will be returned.
    fn send_to(&mut self, payload: &[u8], remote: SocketAddr) -> io::Result<usize>;
}

/// Opens the sockets used to send metrics.
///
/// A client asks its transport for a fresh socket on every call that has something to send, uses it for every metric in
/// that call, and drops it before returning. Sockets are never cached across calls.
pub trait Transport: Send + Sync {
    /// Opens a new socket capable of reaching `remote`.
    ///
    /// # Errors
    ///
    /// If the socket could not be created or configured, an error will be returned.
    fn open(&self, remote: SocketAddr) -> io::Result<Box<dyn DatagramSocket>>;
}

/// A [`Transport`] that sends metrics over UDP.
#[derive(Clone, Debug, Default)]
pub struct UdpTransport {
    write_timeout: Option<Duration>,
}

impl UdpTransport {
    /// Creates a new `UdpTransport` that applies the given write timeout to every socket it opens.
    ///
    /// A zero timeout is treated as no timeout, since sockets reject it.
    pub fn new(write_timeout: Option<Duration>) -> Self {
        Self { write_timeout: write_timeout.filter(|timeout| !timeout.is_zero()) }
    }
}

impl Transport for UdpTransport {
    fn open(&self, remote: SocketAddr) -> io::Result<Box<dyn DatagramSocket>> {
        let local = if remote.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(local)?;
        socket.set_write_timeout(self.write_timeout)?;
        Ok(Box::new(socket))
    }
}

impl DatagramSocket for UdpSocket {
    fn send_to(&mut self, payload: &[u8], remote: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, payload, remote)
    }
}
