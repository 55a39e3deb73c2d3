// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ergonomic, Rust-native mirror of the generated `RequestedPort`
//! (spec §6): `prost`'s generated enums round-trip as plain `i32` on
//! the wire, so `CreateMachine` callers and handlers convert through
//! this type rather than poking at the raw protobuf enum values.

use crate::{requested_port, PortDirection, PortType, RequestedPort};
use zuri_core::{ProtocolUrl, Status};

/// One port a caller is requesting when it creates a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    pub protocol_url: ProtocolUrl,
    pub port_type: PortType,
    pub port_direction: PortDirection,
}

impl PortDescriptor {
    pub fn new(protocol_url: ProtocolUrl, port_type: PortType, port_direction: PortDirection) -> Self {
        Self { protocol_url, port_type, port_direction }
    }
}

// `requested_port` is just a namespacing shim so call sites read
// `wire::requested_port::streaming(...)` rather than constructing the
// prost struct's three fields by hand at every use site.
pub mod requested_port {
    use super::*;

    pub fn bidirectional_streaming(protocol_url: &ProtocolUrl) -> RequestedPort {
        RequestedPort {
            protocol_uri: protocol_url.as_str().to_string(),
            port_type: PortType::Streaming as i32,
            port_direction: PortDirection::BiDirectional as i32,
        }
    }
}

impl TryFrom<&RequestedPort> for PortDescriptor {
    type Error = Status;

    fn try_from(wire: &RequestedPort) -> Result<Self, Self::Error> {
        let protocol_url = ProtocolUrl::parse(wire.protocol_uri.clone())?;
        let port_type = PortType::try_from(wire.port_type)
            .map_err(|_| Status::invalid_configuration(format!("unknown port_type {}", wire.port_type)))?;
        let port_direction = PortDirection::try_from(wire.port_direction).map_err(|_| {
            Status::invalid_configuration(format!("unknown port_direction {}", wire.port_direction))
        })?;
        Ok(Self { protocol_url, port_type, port_direction })
    }
}

impl From<&PortDescriptor> for RequestedPort {
    fn from(port: &PortDescriptor) -> Self {
        RequestedPort {
            protocol_uri: port.protocol_url.as_str().to_string(),
            port_type: port.port_type as i32,
            port_direction: port.port_direction as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_wire_type() {
        let url = ProtocolUrl::parse("dev.zuri.proto:null").unwrap();
        let descriptor =
            PortDescriptor::new(url, PortType::Streaming, PortDirection::BiDirectional);
        let wire: RequestedPort = (&descriptor).into();
        let back = PortDescriptor::try_from(&wire).unwrap();
        assert_eq!(back, descriptor);
    }

    #[test]
    fn rejects_unknown_enum_values() {
        let wire = RequestedPort {
            protocol_uri: "dev.zuri.proto:null".to_string(),
            port_type: 99,
            port_direction: 0,
        };
        assert!(PortDescriptor::try_from(&wire).is_err());
    }
}
