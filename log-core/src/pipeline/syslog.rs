//! Syslog forwarder.
//!
//! Lines are framed BSD-style as `<PRI>line\0` with the `user` facility.
//! A local address is tried as a unix datagram socket, then as a unix stream
//! socket; if both fail the forwarder falls back to UDP on
//! `localhost:514`.

use crate::config::{SyslogAddress, SYSLOG_FALLBACK_HOST, SYSLOG_FALLBACK_PORT};
use crate::error::PipelineError;
use std::io::{self, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
#[cfg(unix)]
use std::os::unix::net::{UnixDatagram, UnixStream};
use std::path::Path;
use tracing::{debug, warn, Level};

/// `LOG_USER` facility code.
const FACILITY_USER: u8 = 1;

/// Syslog severity for a tracing level.
pub fn severity(level: Level) -> u8 {
    match level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 6,
        Level::DEBUG | Level::TRACE => 7,
    }
}

/// Frame a rendered line for the wire.
pub fn frame(level: Level, line: &str) -> Vec<u8> {
    let pri = (FACILITY_USER << 3) | severity(level);
    let mut buf = Vec::with_capacity(line.len() + 6);
    buf.extend_from_slice(format!("<{}>", pri).as_bytes());
    buf.extend_from_slice(line.as_bytes());
    buf.push(0);
    buf
}

/// Which transport a [`SyslogSink`] ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyslogTransport {
    UnixDatagram,
    UnixStream,
    Udp,
}

#[derive(Debug)]
pub enum SyslogSink {
    #[cfg(unix)]
    UnixDatagram(UnixDatagram),
    #[cfg(unix)]
    UnixStream(UnixStream),
    Udp { socket: UdpSocket, target: SocketAddr },
}

impl SyslogSink {
    /// Open a forwarder for `address`, falling back to UDP on
    /// `localhost:514` whenever the configured address cannot be used.
    ///
    /// # Errors
    ///
    /// Only fails when the fallback UDP transport itself cannot be set up.
    pub fn open(address: &SyslogAddress) -> Result<Self, PipelineError> {
        match address {
            SyslogAddress::Local(path) => match Self::connect_local(path) {
                Ok(sink) => Ok(sink),
                Err(e) => {
                    warn!(
                        "Syslog socket {} unavailable ({}), falling back to UDP {}:{}",
                        path.display(),
                        e,
                        SYSLOG_FALLBACK_HOST,
                        SYSLOG_FALLBACK_PORT
                    );
                    Self::connect_udp(SYSLOG_FALLBACK_HOST, SYSLOG_FALLBACK_PORT)
                }
            },
            SyslogAddress::Network { host, port } => match Self::connect_udp(host, *port) {
                Ok(sink) => Ok(sink),
                Err(e) => {
                    warn!(
                        "Syslog address {}:{} unusable ({}), falling back to UDP {}:{}",
                        host,
                        port,
                        e,
                        SYSLOG_FALLBACK_HOST,
                        SYSLOG_FALLBACK_PORT
                    );
                    Self::connect_udp(SYSLOG_FALLBACK_HOST, SYSLOG_FALLBACK_PORT)
                }
            },
        }
    }

    /// Connect to a unix socket, datagram first, then stream.
    #[cfg(unix)]
    pub fn connect_local(path: &Path) -> io::Result<Self> {
        let dgram = UnixDatagram::unbound().and_then(|sock| {
            sock.connect(path)?;
            Ok(sock)
        });
        match dgram {
            Ok(sock) => {
                debug!("Connected to syslog datagram socket {}", path.display());
                Ok(SyslogSink::UnixDatagram(sock))
            }
            Err(dgram_err) => {
                debug!(
                    "Datagram connect to {} failed ({}), trying stream",
                    path.display(),
                    dgram_err
                );
                let stream = UnixStream::connect(path)?;
                Ok(SyslogSink::UnixStream(stream))
            }
        }
    }

    #[cfg(not(unix))]
    pub fn connect_local(path: &Path) -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("unix sockets are not available for {}", path.display()),
        ))
    }

    /// Bind an ephemeral UDP socket aimed at `host:port`.
    ///
    /// The socket is left unconnected so a missing listener never turns
    /// into a refused send.
    pub fn connect_udp(host: &str, port: u16) -> Result<Self, PipelineError> {
        let address = format!("{}:{}", host, port);
        let setup_err = |source: io::Error| PipelineError::SyslogSetup {
            address: address.clone(),
            source,
        };

        let candidates: Vec<SocketAddr> =
            (host, port).to_socket_addrs().map_err(setup_err)?.collect();

        let mut last_err = io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "host resolved to no addresses",
        );
        for target in candidates {
            let unspecified = if target.is_ipv4() {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            } else {
                IpAddr::V6(Ipv6Addr::UNSPECIFIED)
            };
            let bind_addr = SocketAddr::new(unspecified, 0);
            match UdpSocket::bind(bind_addr) {
                Ok(socket) => return Ok(SyslogSink::Udp { socket, target }),
                Err(e) => last_err = e,
            }
        }
        Err(setup_err(last_err))
    }

    pub fn transport(&self) -> SyslogTransport {
        match self {
            #[cfg(unix)]
            SyslogSink::UnixDatagram(_) => SyslogTransport::UnixDatagram,
            #[cfg(unix)]
            SyslogSink::UnixStream(_) => SyslogTransport::UnixStream,
            SyslogSink::Udp { .. } => SyslogTransport::Udp,
        }
    }

    /// Send one framed line.
    pub fn send(&self, level: Level, line: &str) -> io::Result<()> {
        let buf = frame(level, line);
        match self {
            #[cfg(unix)]
            SyslogSink::UnixDatagram(sock) => sock.send(&buf).map(|_| ()),
            #[cfg(unix)]
            SyslogSink::UnixStream(stream) => {
                let mut stream = stream;
                stream.write_all(&buf)
            }
            SyslogSink::Udp { socket, target } => socket.send_to(&buf, target).map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_frame_uses_user_facility() {
        let buf = frame(Level::INFO, "hello");
        assert_eq!(buf, b"<14>hello\0".to_vec());
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity(Level::ERROR), 3);
        assert_eq!(severity(Level::WARN), 4);
        assert_eq!(severity(Level::DEBUG), 7);
        assert!(frame(Level::ERROR, "x").starts_with(b"<11>"));
    }

    #[test]
    fn test_udp_sink_reaches_listener() {
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let sink = SyslogSink::connect_udp("127.0.0.1", port).unwrap();
        assert_eq!(sink.transport(), SyslogTransport::Udp);
        sink.send(Level::INFO, "Email sent").unwrap();

        let mut buf = [0u8; 256];
        let (n, _) = listener.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<14>Email sent\0");
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_local_socket_falls_back_to_udp() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such.sock");

        let sink = SyslogSink::open(&SyslogAddress::Local(missing)).unwrap();
        assert_eq!(sink.transport(), SyslogTransport::Udp);
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_socket_receives_framed_bytes() {
        use std::io::Read;
        use std::os::unix::net::UnixListener;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let sink = SyslogSink::open(&SyslogAddress::Local(path)).unwrap();
        assert_eq!(sink.transport(), SyslogTransport::UnixStream);
        sink.send(Level::INFO, "x").unwrap();

        let (mut conn, _) = listener.accept().unwrap();
        let mut buf = [0u8; 6];
        conn.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"<14>x\0");
    }
}
