//! Broker, endpoint and node descriptors.
//!
//! A broker advertises one endpoint per listener; metadata queries resolve
//! a `(broker, listener)` pair to a [`Node`] that clients can connect to.

use std::fmt;

use crate::types::{BrokerId, ListenerName};

/// Security protocol spoken on an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecurityProtocol {
    /// Un-authenticated, non-encrypted channel.
    #[default]
    Plaintext,
    /// SSL channel.
    Ssl,
    /// SASL authenticated, non-encrypted channel.
    SaslPlaintext,
    /// SASL authenticated, SSL channel.
    SaslSsl,
}

impl fmt::Display for SecurityProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecurityProtocol::Plaintext => "PLAINTEXT",
            SecurityProtocol::Ssl => "SSL",
            SecurityProtocol::SaslPlaintext => "SASL_PLAINTEXT",
            SecurityProtocol::SaslSsl => "SASL_SSL",
        };
        write!(f, "{}", name)
    }
}

/// A named network endpoint exposed by a broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndPoint {
    /// Host name or address.
    pub host: String,
    /// Port number.
    pub port: i32,
    /// Listener this endpoint serves.
    pub listener: ListenerName,
    /// Security protocol spoken on this endpoint.
    pub security_protocol: SecurityProtocol,
}

impl EndPoint {
    /// Create a new endpoint.
    pub fn new(
        host: impl Into<String>,
        port: i32,
        listener: impl Into<ListenerName>,
        security_protocol: SecurityProtocol,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            listener: listener.into(),
            security_protocol,
        }
    }
}

impl fmt::Display for EndPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{} ({})",
            self.listener, self.host, self.port, self.security_protocol
        )
    }
}

/// A connectable node, as resolved for one listener.
///
/// [`Node::NO_NODE`] is the placeholder returned when a broker is known
/// but cannot be resolved for the requested listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// The broker id backing this node.
    pub id: BrokerId,
    /// Host name or address; empty for placeholder nodes.
    pub host: String,
    /// Port number; `-1` for placeholder nodes.
    pub port: i32,
    /// Rack the broker lives in, if known.
    pub rack: Option<String>,
}

impl Node {
    /// Placeholder for "no node available".
    pub const NO_NODE: Node = Node {
        id: BrokerId::NO_LEADER,
        host: String::new(),
        port: -1,
        rack: None,
    };

    /// Create a new node.
    pub fn new(id: BrokerId, host: impl Into<String>, port: i32, rack: Option<String>) -> Self {
        Self {
            id,
            host: host.into(),
            port,
            rack,
        }
    }

    /// Placeholder node that retains the broker id but carries no address.
    ///
    /// Used in cluster views so replica arrays keep their positions even
    /// when a replica cannot be resolved for the requested listener.
    pub fn empty(id: BrokerId) -> Self {
        Self {
            id,
            host: String::new(),
            port: -1,
            rack: None,
        }
    }

    /// True for placeholder nodes with no usable address.
    pub fn is_empty(&self) -> bool {
        self.host.is_empty() || self.port < 0
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (id: {})", self.host, self.port, self.id)
    }
}

/// A live broker and its advertised endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broker {
    /// The broker id.
    pub id: BrokerId,
    /// One endpoint per listener.
    pub endpoints: Vec<EndPoint>,
    /// Rack the broker lives in, if configured.
    pub rack: Option<String>,
}

impl Broker {
    /// Create a new broker descriptor.
    pub fn new(id: BrokerId, endpoints: Vec<EndPoint>, rack: Option<String>) -> Self {
        Self {
            id,
            endpoints,
            rack,
        }
    }

    /// The endpoint serving the given listener, if the broker exposes it.
    pub fn endpoint(&self, listener: &ListenerName) -> Option<&EndPoint> {
        self.endpoints.iter().find(|e| &e.listener == listener)
    }

    /// Resolve this broker to a connectable node for the given listener.
    pub fn node(&self, listener: &ListenerName) -> Option<Node> {
        self.endpoint(listener)
            .map(|e| Node::new(self.id, e.host.clone(), e.port, self.rack.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_broker() -> Broker {
        Broker::new(
            BrokerId::new(1),
            vec![
                EndPoint::new("b1.internal", 9092, "INTERNAL", SecurityProtocol::Plaintext),
                EndPoint::new("b1.example.com", 9093, "EXTERNAL", SecurityProtocol::Ssl),
            ],
            Some("rack-a".to_string()),
        )
    }

    #[test]
    fn test_node_resolution_per_listener() {
        let broker = test_broker();

        let internal = broker.node(&ListenerName::new("INTERNAL")).unwrap();
        assert_eq!(internal.host, "b1.internal");
        assert_eq!(internal.port, 9092);
        assert_eq!(internal.rack.as_deref(), Some("rack-a"));

        let external = broker.node(&ListenerName::new("EXTERNAL")).unwrap();
        assert_eq!(external.host, "b1.example.com");
        assert_eq!(external.port, 9093);
    }

    #[test]
    fn test_missing_listener_resolves_to_none() {
        let broker = test_broker();
        assert!(broker.node(&ListenerName::new("SASL")).is_none());
        assert!(broker.endpoint(&ListenerName::new("SASL")).is_none());
    }

    #[test]
    fn test_no_node_is_empty() {
        assert!(Node::NO_NODE.is_empty());
        assert_eq!(Node::NO_NODE.id, BrokerId::NO_LEADER);
    }

    #[test]
    fn test_empty_node_keeps_id() {
        let node = Node::empty(BrokerId::new(3));
        assert!(node.is_empty());
        assert_eq!(node.id, BrokerId::new(3));
    }

    #[test]
    fn test_resolved_node_is_not_empty() {
        let broker = test_broker();
        let node = broker.node(&ListenerName::new("INTERNAL")).unwrap();
        assert!(!node.is_empty());
    }

    #[test]
    fn test_security_protocol_display() {
        assert_eq!(SecurityProtocol::Plaintext.to_string(), "PLAINTEXT");
        assert_eq!(SecurityProtocol::SaslSsl.to_string(), "SASL_SSL");
    }
}
