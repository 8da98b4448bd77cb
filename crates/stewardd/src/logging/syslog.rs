//! UDP transport for RFC 3164 style syslog datagrams.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use steward_config::{DEFAULT_SYSLOG_PORT, SyslogFacility};
use tracing::Level;

use super::LoggingError;

/// Socket plus addressing for one syslog destination.
#[derive(Debug)]
pub(crate) struct SyslogTransport {
    socket: UdpSocket,
    target: SocketAddr,
    facility: SyslogFacility,
    tag: String,
}

impl SyslogTransport {
    /// Resolves `endpoint` (`host` or `host:port`) and binds a local socket.
    pub(crate) fn connect(
        endpoint: &str,
        facility: SyslogFacility,
        tag: &str,
    ) -> Result<Self, LoggingError> {
        let target = resolve(endpoint)?;
        let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).map_err(|source| LoggingError::SyslogSocket {
            endpoint: endpoint.to_owned(),
            source,
        })?;
        Ok(Self {
            socket,
            target,
            facility,
            tag: tag.to_owned(),
        })
    }

    pub(crate) const fn target(&self) -> SocketAddr {
        self.target
    }

    pub(crate) const fn facility(&self) -> SyslogFacility {
        self.facility
    }

    /// Sends one formatted record. Delivery is best-effort.
    pub(crate) fn send(&self, level: Level, line: &[u8]) {
        let mut datagram =
            format!("<{}>{}: ", priority(self.facility, level), self.tag).into_bytes();
        datagram.extend_from_slice(line.trim_ascii_end());
        let _ = self.socket.send_to(&datagram, self.target);
    }
}

/// Syslog priority value: facility code times eight plus severity.
pub(crate) fn priority(facility: SyslogFacility, level: Level) -> u16 {
    u16::from(facility.code()) * 8 + u16::from(severity(level))
}

fn severity(level: Level) -> u8 {
    match level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 6,
        _ => 7,
    }
}

fn resolve(endpoint: &str) -> Result<SocketAddr, LoggingError> {
    let (host, port) = split_endpoint(endpoint);
    let candidates: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| LoggingError::SyslogResolve {
            endpoint: endpoint.to_owned(),
            source,
        })?
        .collect();
    // IPv4 first: `localhost` often lists `::1` before `127.0.0.1`.
    candidates
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| candidates.first())
        .copied()
        .ok_or_else(|| LoggingError::SyslogUnresolved {
            endpoint: endpoint.to_owned(),
        })
}

fn split_endpoint(endpoint: &str) -> (&str, u16) {
    let endpoint = endpoint.trim();
    if let Some(rest) = endpoint.strip_prefix('[')
        && let Some((host, tail)) = rest.split_once(']')
    {
        let port = tail
            .strip_prefix(':')
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_SYSLOG_PORT);
        return (host, port);
    }
    match endpoint.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse() {
            Ok(port) => (host, port),
            Err(_) => (endpoint, DEFAULT_SYSLOG_PORT),
        },
        _ => (endpoint, DEFAULT_SYSLOG_PORT),
    }
}
