// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one piece of stream-initial metadata the wire protocol defines
//! (spec §3, §4.3): the protocol URL a `Communicate` call is
//! multiplexing.

/// gRPC metadata key a `Communicate` call's initial request MUST set
/// to select which `PortSocket` the stream attaches to.
pub const PROTOCOL_URL_METADATA_KEY: &str = "x-zuri-protocol-url";
