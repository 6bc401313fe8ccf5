//! UdpSink - one datagram per packet, unicast or multicast

use contracts::{ContractError, OutputSink};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, warn};

/// Configuration for UdpSink
#[derive(Debug, Clone)]
pub struct UdpSinkConfig {
    /// Destination address
    pub addr: SocketAddr,
    /// Local address to bind (selects the outgoing interface)
    pub bind: SocketAddr,
    /// TTL (multicast TTL for multicast destinations)
    pub ttl: u32,
}

impl UdpSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let bind = match params.get("bind") {
            Some(b) => b
                .parse()
                .map_err(|e| format!("invalid bind address '{}': {}", b, e))?,
            None if addr.is_ipv6() => SocketAddr::from(([0u16; 8], 0)),
            None => SocketAddr::from(([0, 0, 0, 0], 0)),
        };

        let ttl = params
            .get("ttl")
            .map(|t| t.parse().map_err(|e| format!("invalid ttl '{}': {}", t, e)))
            .transpose()?
            .unwrap_or(1);

        Ok(Self { addr, bind, ttl })
    }
}

/// Sink that sends packets as UDP datagrams
pub struct UdpSink {
    name: String,
    config: UdpSinkConfig,
    socket: UdpSocket,
}

impl UdpSink {
    /// Create a new UdpSink
    #[instrument(name = "udp_sink_new", skip(name, config), fields(addr = %config.addr))]
    pub async fn new(name: impl Into<String>, config: UdpSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let socket = UdpSocket::bind(config.bind).await?;
        if config.addr.ip().is_multicast() && config.addr.is_ipv4() {
            socket.set_multicast_ttl_v4(config.ttl)?;
        } else {
            socket.set_ttl(config.ttl)?;
        }
        socket.connect(config.addr).await?;

        debug!(
            sink = %name,
            target = %config.addr,
            ttl = config.ttl,
            "UdpSink connected"
        );

        Ok(Self {
            name,
            config,
            socket,
        })
    }

    /// Create from params (for factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config =
            UdpSinkConfig::from_params(params).map_err(|e| ContractError::SinkConnection {
                sink_name: name.clone(),
                message: e,
            })?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: name,
                message: e.to_string(),
            })
    }
}

impl OutputSink for UdpSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, data: &[u8]) -> Result<(), ContractError> {
        match self.socket.send(data).await {
            Ok(_) => Ok(()),
            // An ICMP port-unreachable from an earlier datagram: nobody is
            // listening yet, which is not a reason to stop transmitting.
            Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                warn!(sink = %self.name, target = %self.config.addr, "No receiver listening");
                Ok(())
            }
            Err(e) => Err(ContractError::sink_write(&self.name, e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_udp_sink_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "239.0.0.2:4433".to_string());
        params.insert("ttl".to_string(), "4".to_string());

        let config = UdpSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 4433);
        assert_eq!(config.ttl, 4);
        assert_eq!(config.bind, "0.0.0.0:0".parse().unwrap());
    }

    #[test]
    fn test_udp_sink_config_errors() {
        assert!(UdpSinkConfig::from_params(&HashMap::new()).is_err());

        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:1".to_string());
        params.insert("ttl".to_string(), "many".to_string());
        assert!(UdpSinkConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn test_udp_sink_delivers_datagrams() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = UdpSinkConfig {
            addr: receiver.local_addr().unwrap(),
            bind: "127.0.0.1:0".parse().unwrap(),
            ttl: 1,
        };
        let mut sink = UdpSink::new("udp_test", config).await.unwrap();

        sink.send(b"first").await.unwrap();
        sink.send(b"second").await.unwrap();

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"first");
        let n = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"second");
    }

    #[tokio::test]
    async fn test_udp_sink_without_receiver() {
        let config = UdpSinkConfig {
            addr: "127.0.0.1:19998".parse().unwrap(),
            bind: "127.0.0.1:0".parse().unwrap(),
            ttl: 1,
        };

        let mut sink = UdpSink::new("test_net", config).await.unwrap();
        // Should not fail even with no receiver
        assert!(sink.send(b"a").await.is_ok());
        assert!(sink.send(b"b").await.is_ok());
    }
}
