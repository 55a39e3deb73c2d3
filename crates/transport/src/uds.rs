// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-domain-socket transport for `tonic` (spec §6's `--listen-transport
//! unix`). `tonic::transport::Server` accepts any incoming stream of
//! `AsyncRead + AsyncWrite` io that also implements its `Connected`
//! trait; `tokio::net::UnixStream` doesn't implement that trait itself,
//! so this module supplies the thin wrapper tonic's own unix-socket
//! example uses. No grounding precedent in the retrieval pack (same gap
//! noted in `zuri-wire`/`tls.rs` for the rest of the gRPC plumbing) —
//! built from tonic's documented UDS server pattern.

use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::UnixStream;
use tonic::transport::server::Connected;

/// Wraps a [`UnixStream`] so it can be handed to `Server::serve_with_incoming`
/// alongside a TLS config, the same way a TCP connection would be.
pub struct UdsStream(pub UnixStream);

/// Connection metadata tonic attaches to each request's extensions.
/// Unix sockets have no meaningful peer address, so this carries
/// nothing beyond the unit it wraps.
#[derive(Clone, Debug)]
pub struct UdsConnectInfo;

impl Connected for UdsStream {
    type ConnectInfo = UdsConnectInfo;

    fn connect_info(&self) -> Self::ConnectInfo {
        UdsConnectInfo
    }
}

impl AsyncRead for UdsStream {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().0).poll_read(cx, buf)
    }
}

impl AsyncWrite for UdsStream {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.get_mut().0).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().0).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().0).poll_shutdown(cx)
    }
}

/// Adapts a bound [`tokio::net::UnixListener`] into the stream shape
/// `Server::serve_with_incoming` wants, one [`UdsStream`] per accepted
/// connection.
pub fn incoming(
    listener: tokio::net::UnixListener,
) -> impl futures::Stream<Item = std::io::Result<UdsStream>> {
    use futures::StreamExt;
    tokio_stream::wrappers::UnixListenerStream::new(listener).map(|result| result.map(UdsStream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wraps_a_connected_pair_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();
        let accept = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            UdsStream(stream)
        });
        let _client = UnixStream::connect(&path).await.unwrap();
        let wrapped = accept.await.unwrap();
        let _info = wrapped.connect_info();
    }
}
