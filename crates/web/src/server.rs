//! TCP server bootstrap.
//!
//! [`Server`] binds a listener, accepts connections and serves each one on
//! its own task with [`HttpConnection`]. It never installs a tracing
//! subscriber; binaries do that.

use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use twig_http::connection::{ConnectionConfig, HttpConnection};
use twig_http::handler::{ErrorHandler, Handler};

pub struct ServerBuilder {
    handler: Option<Arc<dyn Handler>>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    address: Option<io::Result<Vec<SocketAddr>>>,
    config: ConnectionConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { handler: None, error_handler: None, address: None, config: ConnectionConfig::default() }
    }

    /// The address to listen on. Resolution failures surface from [`ServerBuilder::build`].
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    /// The top-level handler, usually a [`Router`](crate::Router) or a [`HostRouter`](crate::HostRouter).
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Replaces the error handler of every connection.
    pub fn error_handler<E: ErrorHandler + 'static>(mut self, error_handler: E) -> Self {
        self.error_handler = Some(Arc::new(error_handler));
        self
    }

    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let handler = self.handler.ok_or(ServerBuildError::MissingHandler)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)??;
        if address.is_empty() {
            return Err(ServerBuildError::MissingAddress);
        }

        Ok(Server { handler, error_handler: self.error_handler, address, config: self.config })
    }
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder").field("address", &self.address).field("config", &self.config).finish_non_exhaustive()
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("handler must be set")]
    MissingHandler,
    #[error("address must be set")]
    MissingAddress,
    #[error("address can't be resolved: {0}")]
    InvalidAddress(#[from] io::Error),
}

pub struct Server {
    handler: Arc<dyn Handler>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    address: Vec<SocketAddr>,
    config: ConnectionConfig,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("address", &self.address).field("config", &self.config).finish_non_exhaustive()
    }
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the configured address and serves forever.
    ///
    /// Returns only when binding fails.
    pub async fn start(self) -> io::Result<()> {
        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };

        self.serve(tcp_listener).await;
        Ok(())
    }

    /// Serves connections accepted from `tcp_listener`. Accept failures are
    /// logged and skipped.
    pub async fn serve(self, tcp_listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let mut connection = HttpConnection::with_config(tcp_stream, self.config);
            if let Some(error_handler) = &self.error_handler {
                connection = connection.with_error_handler(Arc::clone(error_handler));
            }
            let handler = Arc::clone(&self.handler);

            tokio::spawn(async move {
                match connection.process(handler).await {
                    Ok(()) => {
                        debug!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!("service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, StatusCode};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use twig_http::handler::handler_fn;

    use super::{Server, ServerBuildError};
    use crate::router::{Router, get};

    #[test]
    fn build_requires_handler_and_address() {
        let err = Server::builder().address("127.0.0.1:0").build().unwrap_err();
        assert!(matches!(err, ServerBuildError::MissingHandler));

        let router = Router::builder().build().unwrap();
        let err = Server::builder().handler(router).build().unwrap_err();
        assert!(matches!(err, ServerBuildError::MissingAddress));
    }

    #[test]
    fn unresolvable_address() {
        let router = Router::builder().build().unwrap();
        let err = Server::builder().handler(router).address("not an address").build().unwrap_err();
        assert!(matches!(err, ServerBuildError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn serves_over_tcp() {
        let router = Router::builder()
            .route(
                "/hello/<name>",
                get(handler_fn(|req| {
                    Box::pin(async move {
                        let text = format!("hello {}", req.params().get("name").unwrap_or_default());
                        if let Some(mut body) = req.respond(StatusCode::OK, HeaderMap::new()).await {
                            body.write_all(text.as_bytes()).await.unwrap();
                        }
                    })
                })),
            )
            .build()
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Server::builder().handler(router).address(addr).build().unwrap();
        tokio::spawn(server.serve(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET /hello/world HTTP/1.0\r\n\r\n").await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.0 200 OK\r\n"), "{response}");
        assert!(response.ends_with("hello world"));
    }
}
