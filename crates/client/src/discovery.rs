// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent discovery policy (spec §4.6): how `IsolateClient::initialize`
//! locates the agent it talks to.

/// An mTLS identity this process already holds, used to connect to an
/// agent it did not itself spawn. `ca_private_key_pem` lets the client
/// keep minting certificates against the same trust root the target
/// agent's workers already check (`zuri_security::SessionCa::load`) —
/// spec §4.6's "mints a session CA" applies to every policy, not only
/// `AlwaysSpawn`; the difference is only whether that CA is freshly
/// generated or reloaded from a CA this process didn't create.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub ca_certificate_pem: String,
    pub ca_private_key_pem: String,
}

/// Agent discovery policy (spec §4.6): exactly the three variants
/// spec.md names.
#[derive(Debug, Clone)]
pub enum AgentDiscoveryPolicy {
    /// Connect to `endpoint_uri`; fail if unreachable.
    UseSpecifiedEndpoint { endpoint_uri: String, credentials: ClientCredentials },
    /// Attempt `UseSpecifiedEndpoint`; on connection refusal, fall
    /// through to `AlwaysSpawn`.
    SpawnIfMissing { endpoint_uri: String, credentials: ClientCredentials },
    /// Mint a session CA, generate an agent keypair signed by it,
    /// create the run directory, start the agent binary with
    /// `--background`, poll for its listening socket up to a
    /// registration timeout.
    AlwaysSpawn,
}
