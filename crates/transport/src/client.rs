// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side gRPC channel construction (spec §4.6): the isolate
//! client dials an agent's `InvokeService`, and a worker's
//! `RemotingService`, over whichever transport each announced
//! (`tcp4:host:port` or `unix:/path/to.sock`). No grounding precedent
//! in the retrieval pack — built from `tonic`'s own documented
//! unix-domain-socket client pattern, same gap already noted for
//! `zuri-wire`/`tls.rs` and `zuri-transport`/`uds.rs`.

use tonic::transport::{Channel, ClientTlsConfig, Endpoint, Uri};
use tower::service_fn;
use zuri_core::Status;

fn to_status(action: &str, err: impl std::fmt::Display) -> Status {
    Status::agent_unreachable(format!("failed to {action}: {err}"))
}

/// Connects to a `host:port` endpoint under mTLS.
pub async fn connect_tcp(addr: &str, tls_config: ClientTlsConfig) -> Result<Channel, Status> {
    Endpoint::from_shared(format!("https://{addr}"))
        .map_err(|err| to_status("parse endpoint", err))?
        .tls_config(tls_config)
        .map_err(|err| to_status("configure TLS", err))?
        .connect()
        .await
        .map_err(|err| to_status("connect", err))
}

/// Connects to a unix-domain-socket endpoint under mTLS. The URI given
/// to `Endpoint` is never resolved — `connect_with_connector` always
/// dials `path` instead — it exists only because `tonic` requires one.
pub async fn connect_unix(path: std::path::PathBuf, tls_config: ClientTlsConfig) -> Result<Channel, Status> {
    Endpoint::from_static("https://[::]:0")
        .tls_config(tls_config)
        .map_err(|err| to_status("configure TLS", err))?
        .connect_with_connector(service_fn(move |_: Uri| {
            let path = path.clone();
            async move {
                let stream = tokio::net::UnixStream::connect(path).await?;
                Ok::<_, std::io::Error>(hyper_util::rt::TokioIo::new(stream))
            }
        }))
        .await
        .map_err(|err| to_status("connect", err))
}

/// Parses an endpoint URI written in one of the two forms this system
/// uses (`tcp4:host:port` or `unix:/path`) and dials it.
pub async fn connect(endpoint_uri: &str, tls_config: ClientTlsConfig) -> Result<Channel, Status> {
    if let Some(addr) = endpoint_uri.strip_prefix("tcp4:") {
        connect_tcp(addr, tls_config).await
    } else if let Some(path) = endpoint_uri.strip_prefix("unix:") {
        connect_unix(std::path::PathBuf::from(path), tls_config).await
    } else {
        Err(Status::invalid_configuration(format!("unrecognized endpoint uri scheme: {endpoint_uri}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_an_unrecognized_scheme() {
        let tls_config = ClientTlsConfig::new();
        let result = tokio::runtime::Runtime::new().unwrap().block_on(connect("carrier-pigeon:nope", tls_config));
        let err = result.unwrap_err();
        assert_eq!(err.namespace, zuri_core::StatusNamespace::InvalidConfiguration);
    }
}
