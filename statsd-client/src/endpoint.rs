use std::{
    fmt, io,
    net::{IpAddr, SocketAddr, ToSocketAddrs as _},
};

/// Destination of every datagram sent by a client.
///
/// IP literals are resolved to a socket address up front. Hostnames are kept as-is and resolved by the operating
/// system at send time, since UDP has no connection setup that would surface a bad hostname any earlier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// A fully resolved socket address.
    Resolved(SocketAddr),

    /// A hostname that still needs to be resolved.
    Hostname {
        /// Hostname of the StatsD server.
        host: String,

        /// UDP port of the StatsD server.
        port: u16,
    },
}

impl Endpoint {
    /// Creates an `Endpoint` from a host and port.
    ///
    /// The host can be an IPv4 literal, an IPv6 literal (optionally wrapped in brackets), or a hostname.
    ///
    /// # Errors
    ///
    /// If the host is empty, or contains characters that can never appear in a hostname, an error will be returned
    /// describing the problem. No name resolution is performed here.
    pub fn new(host: &str, port: u16) -> Result<Self, String> {
        if host.is_empty() {
            return Err("host must not be empty".to_string());
        }

        let unbracketed = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if let Ok(ip) = unbracketed.parse::<IpAddr>() {
            return Ok(Endpoint::Resolved(SocketAddr::new(ip, port)));
        }

        if let Some(c) = host.chars().find(|c| !is_hostname_char(*c)) {
            return Err(format!("invalid character {c:?} in host '{host}'"));
        }

        Ok(Endpoint::Hostname { host: host.to_string(), port })
    }

    /// Returns the destination port.
    pub const fn port(&self) -> u16 {
        match self {
            Endpoint::Resolved(addr) => addr.port(),
            Endpoint::Hostname { port, .. } => *port,
        }
    }

    /// Resolves the endpoint to a single socket address.
    ///
    /// IPv4 addresses are preferred when a hostname resolves to both families.
    ///
    /// # Errors
    ///
    /// If the hostname cannot be resolved, or resolves to no addresses, an error will be returned.
    pub fn resolve(&self) -> io::Result<SocketAddr> {
        match self {
            Endpoint::Resolved(addr) => Ok(*addr),
            Endpoint::Hostname { host, port } => {
                let addrs = (host.as_str(), *port).to_socket_addrs()?.collect::<Vec<_>>();
                addrs
                    .iter()
                    .find(|addr| addr.is_ipv4())
                    .or_else(|| addrs.first())
                    .copied()
                    .ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::AddrNotAvailable,
                            format!("no addresses found for '{host}'"),
                        )
                    })
            }
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Resolved(addr) => write!(f, "{addr}"),
            Endpoint::Hostname { host, port } => write!(f, "{host}:{port}"),
        }
    }
}

fn is_hostname_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_')
}
