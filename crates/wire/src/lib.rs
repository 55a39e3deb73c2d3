// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The `RemotingService`/`InvokeService` wire messages (spec §6):
//! tonic/prost-generated types from `proto/remoting.proto`, plus the
//! hand-written DTOs that round the wire inside them (the
//! `config_json` field is opaque bytes at the protobuf layer — this
//! crate owns serializing/deserializing it).

mod config;
mod handshake;
mod metadata;
mod ports;

pub use config::ConfigMap;
pub use handshake::{CsrAnnouncement, RunSignal};
pub use metadata::PROTOCOL_URL_METADATA_KEY;
pub use ports::{requested_port, PortDescriptor};

tonic::include_proto!("zuri");
