//! TCP relay sitting between a client and a server endpoint.
//!
//! Each direction can be paused and resumed independently; bytes read while
//! a direction is paused are dropped, which looks like a lossy link to both
//! ends without either process restarting. Cancelling the lifetime token
//! tears both pump loops down.

use std::{
    io,
    net::Ipv4Addr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use thiserror::Error as ThisError;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
    time::timeout,
};
use tokio_util::sync::CancellationToken;

/// Read buffer of each pump.
pub const BUFFER_SIZE: usize = 16_370;

/// How long `shutdown` waits for the relay tasks.
pub const JOIN_TIMEOUT: Duration = Duration::from_millis(500);

///
/// ProxyError
///

#[derive(Debug, ThisError)]
pub enum ProxyError {
    #[error("proxy '{0}' is already started")]
    AlreadyStarted(String),

    #[error("proxy '{id}' could not connect to server port {port}")]
    ConnectServer {
        id: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("proxy '{id}' could not listen for clients")]
    Listen {
        id: String,
        #[source]
        source: io::Error,
    },

    #[error("proxy '{0}' was not started")]
    NotStarted(String),
}

///
/// Gate
///
/// Whether one direction forwards what it reads.
///

#[derive(Clone, Debug)]
struct Gate(Arc<AtomicBool>);

impl Gate {
    fn open() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    fn set(&self, open: bool) {
        self.0.store(open, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

///
/// SocketProxy
///

#[derive(Debug)]
pub struct SocketProxy {
    id: String,
    server_port: u16,
    port: Option<u16>,
    token: CancellationToken,
    client_to_server: Gate,
    server_to_client: Gate,
    tasks: Vec<JoinHandle<()>>,
}

impl SocketProxy {
    /// A proxy for the server on `server_port`, shut down with `lifetime`.
    #[must_use]
    pub fn new(id: impl Into<String>, server_port: u16, lifetime: &CancellationToken) -> Self {
        Self {
            id: id.into(),
            server_port,
            port: None,
            token: lifetime.child_token(),
            client_to_server: Gate::open(),
            server_to_client: Gate::open(),
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Port clients connect to instead of the server's.
    pub fn port(&self) -> Result<u16, ProxyError> {
        self.port.ok_or_else(|| ProxyError::NotStarted(self.id.clone()))
    }

    /// Connect to the server, listen for one client and relay between them
    /// once it arrives. Returns the client-facing port.
    pub async fn start(&mut self) -> Result<u16, ProxyError> {
        if self.port.is_some() {
            return Err(ProxyError::AlreadyStarted(self.id.clone()));
        }
        tracing::info!(proxy = %self.id, "creating proxies for server and client");

        let server = TcpStream::connect((Ipv4Addr::LOCALHOST, self.server_port))
            .await
            .map_err(|source| ProxyError::ConnectServer {
                id: self.id.clone(),
                port: self.server_port,
                source,
            })?;
        let listen_err = |source| ProxyError::Listen {
            id: self.id.clone(),
            source,
        };
        server.set_nodelay(true).map_err(listen_err)?;
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(listen_err)?;
        let port = listener.local_addr().map_err(listen_err)?.port();

        self.port = Some(port);
        tracing::info!(
            proxy = %self.id,
            server_port = self.server_port,
            port,
            "proxies created"
        );

        let relay = Relay {
            id: self.id.clone(),
            token: self.token.clone(),
            client_to_server: self.client_to_server.clone(),
            server_to_client: self.server_to_client.clone(),
        };
        self.tasks.push(tokio::spawn(relay.run(listener, server)));

        Ok(port)
    }

    pub fn stop_client_to_server(&self) {
        self.client_to_server.set(false);
    }

    pub fn start_client_to_server(&self) {
        self.client_to_server.set(true);
    }

    pub fn stop_server_to_client(&self) {
        self.server_to_client.set(false);
    }

    pub fn start_server_to_client(&self) {
        self.server_to_client.set(true);
    }

    /// Cancel the relay and wait up to [`JOIN_TIMEOUT`] for it to finish.
    pub async fn shutdown(&mut self) {
        self.port = None;
        self.stop_client_to_server();
        self.stop_server_to_client();
        self.token.cancel();

        for task in std::mem::take(&mut self.tasks) {
            if timeout(JOIN_TIMEOUT, task).await.is_err() {
                tracing::error!(proxy = %self.id, "relay did not stop in time");
            }
        }
    }
}

impl Drop for SocketProxy {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

///
/// Relay
///

struct Relay {
    id: String,
    token: CancellationToken,
    client_to_server: Gate,
    server_to_client: Gate,
}

impl Relay {
    async fn run(self, listener: TcpListener, server: TcpStream) {
        let accepted = tokio::select! {
            () = self.token.cancelled() => return,
            accepted = listener.accept() => accepted,
        };
        let client = match accepted {
            Ok((client, addr)) => {
                tracing::info!(proxy = %self.id, %addr, "client connected");
                client
            }
            Err(err) => {
                tracing::error!(proxy = %self.id, %err, "couldn't accept socket");
                return;
            }
        };
        if let Err(err) = client.set_nodelay(true) {
            tracing::error!(proxy = %self.id, %err, "couldn't configure client socket");
        }

        let (server_read, server_write) = server.into_split();
        let (client_read, client_write) = client.into_split();
        tracing::info!(proxy = %self.id, "relaying started");

        tokio::join!(
            pump(
                "server to client",
                &self.id,
                server_read,
                client_write,
                &self.server_to_client,
                &self.token,
            ),
            pump(
                "client to server",
                &self.id,
                client_read,
                server_write,
                &self.client_to_server,
                &self.token,
            ),
        );
    }
}

async fn pump(
    direction: &str,
    id: &str,
    mut source: impl AsyncRead + Unpin,
    mut destination: impl AsyncWrite + Unpin,
    gate: &Gate,
    token: &CancellationToken,
) {
    let mut buffer = vec![0; BUFFER_SIZE];

    loop {
        let read = tokio::select! {
            () = token.cancelled() => break,
            read = source.read(&mut buffer) => read,
        };

        match read {
            Ok(0) => {
                tracing::info!(proxy = id, direction, "connection lost");
                break;
            }
            Ok(len) if gate.is_open() => {
                if let Err(err) = destination.write_all(&buffer[..len]).await {
                    tracing::error!(proxy = id, direction, %err, "messaging failed");
                    break;
                }
                tracing::debug!(proxy = id, direction, len, "message relayed");
            }
            Ok(len) => {
                tracing::info!(proxy = id, direction, len, "message dropped, direction stopped");
            }
            Err(err) => {
                tracing::error!(proxy = id, direction, %err, "messaging failed");
                break;
            }
        }
    }

    // signal end of stream to the peer
    let _ = destination.shutdown().await;
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    async fn server() -> (u16, JoinHandle<TcpStream>) {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });

        (port, accept)
    }

    async fn read_exact(stream: &mut TcpStream, len: usize) -> Vec<u8> {
        let mut buf = vec![0; len];
        timeout(Duration::from_secs(5), stream.read_exact(&mut buf))
            .await
            .unwrap()
            .unwrap();

        buf
    }

    #[tokio::test]
    async fn port_is_unavailable_before_start() {
        let lifetime = CancellationToken::new();
        let proxy = SocketProxy::new("idle", 1, &lifetime);

        assert!(matches!(proxy.port(), Err(ProxyError::NotStarted(_))));
    }

    #[tokio::test]
    async fn relays_both_directions() {
        let lifetime = CancellationToken::new();
        let (server_port, accept) = server().await;
        let mut proxy = SocketProxy::new("relay", server_port, &lifetime);
        let port = proxy.start().await.unwrap();

        let mut client = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.unwrap();
        let mut server = accept.await.unwrap();

        client.write_all(b"ping").await.unwrap();
        assert_eq!(read_exact(&mut server, 4).await, b"ping");

        server.write_all(b"pong").await.unwrap();
        assert_eq!(read_exact(&mut client, 4).await, b"pong");

        proxy.shutdown().await;
    }

    #[tokio::test]
    async fn stopped_direction_drops_bytes() {
        let lifetime = CancellationToken::new();
        let (server_port, accept) = server().await;
        let mut proxy = SocketProxy::new("lossy", server_port, &lifetime);
        let port = proxy.start().await.unwrap();

        let mut client = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.unwrap();
        let mut server = accept.await.unwrap();

        proxy.stop_client_to_server();
        client.write_all(b"lost").await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        proxy.start_client_to_server();
        client.write_all(b"kept").await.unwrap();
        assert_eq!(read_exact(&mut server, 4).await, b"kept");

        proxy.shutdown().await;
    }

    #[tokio::test]
    async fn starting_twice_is_rejected() {
        let lifetime = CancellationToken::new();
        let (server_port, _accept) = server().await;
        let mut proxy = SocketProxy::new("twice", server_port, &lifetime);
        proxy.start().await.unwrap();

        assert!(matches!(proxy.start().await, Err(ProxyError::AlreadyStarted(_))));
    }

    #[tokio::test]
    async fn cancelling_the_lifetime_closes_the_client() {
        let lifetime = CancellationToken::new();
        let (server_port, accept) = server().await;
        let mut proxy = SocketProxy::new("cancel", server_port, &lifetime);
        let port = proxy.start().await.unwrap();

        let mut client = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.unwrap();
        let _server = accept.await.unwrap();

        lifetime.cancel();

        let mut buf = [0; 1];
        let read = timeout(Duration::from_secs(5), client.read(&mut buf))
            .await
            .unwrap();
        assert!(matches!(read, Ok(0) | Err(_)), "{read:?}");
    }

    #[tokio::test]
    async fn missing_server_is_reported() {
        let lifetime = CancellationToken::new();
        let (server_port, accept) = server().await;
        accept.abort();
        // the listener is gone once the accept task is aborted
        let _ = accept.await;

        let mut proxy = SocketProxy::new("nobody", server_port, &lifetime);
        assert!(matches!(
            proxy.start().await,
            Err(ProxyError::ConnectServer { .. })
        ));
    }
}
