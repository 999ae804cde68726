//! Config for the address the HTTP API listens on.
use std::net::ToSocketAddrs;
use std::ops::Deref;
use std::str::FromStr;

/// Default bind address of the HTTP API.
pub const DEFAULT_HTTP_BIND_ADDR: &str = "0.0.0.0:8080";

/// A socket address that may be given as a host name, resolved once while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketAddr(std::net::SocketAddr);

impl Deref for SocketAddr {
    type Target = std::net::SocketAddr;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for SocketAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SocketAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.to_socket_addrs()
            .map_err(|e| format!("Cannot parse socket address '{s}': {e}"))?
            .next()
            .map(Self)
            .ok_or_else(|| format!("Found no addresses for '{s}'"))
    }
}

impl From<SocketAddr> for std::net::SocketAddr {
    fn from(addr: SocketAddr) -> Self {
        addr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn default_bind_addr_listens_on_all_interfaces() {
        let addr: std::net::SocketAddr = DEFAULT_HTTP_BIND_ADDR.parse::<SocketAddr>().unwrap().into();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn parses_ip_and_host_names() {
        let addr = SocketAddr::from_str("127.0.0.1:0").unwrap();
        assert_eq!(*addr, std::net::SocketAddr::from(([127, 0, 0, 1], 0)));
        assert_eq!(addr.to_string(), "127.0.0.1:0");

        // localhost resolves to either the v4 or the v6 loopback address
        let addr = SocketAddr::from_str("localhost:8080").unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            SocketAddr::from_str("no port here").unwrap_err(),
            "Cannot parse socket address 'no port here': invalid socket address",
        );
    }
}
