//! Async hello server.
//!
//! Accepts TCP connections and answers each one with the fixed response
//! once the request's end-of-headers delimiter arrives. Nothing in the
//! request is parsed; the bytes are read and discarded.

use crate::response::{find_end_of_headers, WIRE_RESPONSE};
use bytes::BytesMut;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

/// Read buffer size
const BUFFER_SIZE: usize = 4 * 1024;

/// Async server instance
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    /// Bind the listening socket.
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Server {
            listener,
            local_addr,
        })
    }

    /// Address the listener actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections forever, one task per connection.
    ///
    /// Returns only if accepting itself fails; individual connection
    /// errors are logged and do not stop the loop. There is no
    /// concurrency limit and no shutdown path beyond process interruption.
    pub async fn run(&self) -> std::io::Result<()> {
        info!(address = %self.local_addr, "Serving");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    debug!(peer = %addr, "New connection");

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream).await {
                            debug!(error = %e, "Connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    return Err(e);
                }
            }
        }
    }
}

/// Handle a single client connection.
///
/// Reads until the buffer contains `\r\n\r\n`, discards what was read,
/// writes the fixed response, then shuts down the write half so the
/// client sees EOF after the body. If the delimiter never arrives the
/// read pends indefinitely; there is deliberately no timeout.
async fn handle_connection(mut stream: TcpStream) -> std::io::Result<()> {
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);

    while find_end_of_headers(&buffer).is_none() {
        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            // Peer closed before finishing its headers
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        }
    }

    stream.write_all(WIRE_RESPONSE).await?;
    stream.shutdown().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio_test::assert_ok;
    use tokio::time::timeout;

    async fn spawn_server() -> SocketAddr {
        let server = Server::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr();
        tokio::spawn(async move {
            let _ = server.run().await;
        });
        addr
    }

    #[tokio::test]
    async fn test_responds_with_exact_bytes_then_closes() {
        let addr = spawn_server().await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        assert_ok!(
            stream
                .write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n")
                .await
        );

        // read_to_end returns only once the server closes its side
        let mut received = Vec::new();
        stream.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, WIRE_RESPONSE);
    }

    #[tokio::test]
    async fn test_response_is_input_independent() {
        let addr = spawn_server().await;

        for request in [
            "POST /submit HTTP/1.1\r\nHost: y\r\nContent-Length: 0\r\n\r\n",
            "DELETE /anything?q=1 HTTP/1.0\r\nX-Custom: abc\r\n\r\n",
            "NONSENSE\r\n\r\n",
        ] {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(request.as_bytes()).await.unwrap();

            let mut received = Vec::new();
            stream.read_to_end(&mut received).await.unwrap();
            assert_eq!(received, WIRE_RESPONSE, "request: {request:?}");
        }
    }

    #[tokio::test]
    async fn test_headers_split_across_writes() {
        let addr = spawn_server().await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        stream.write_all(b"Host: x\r\n\r\n").await.unwrap();

        let mut received = Vec::new();
        stream.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, WIRE_RESPONSE);
    }

    #[tokio::test]
    async fn test_pends_without_end_of_headers() {
        let addr = spawn_server().await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET / HTTP/1.1\r\nHost: x").await.unwrap();

        // No delimiter sent: the server must not respond or close
        let mut byte = [0u8; 1];
        let read = timeout(Duration::from_millis(200), stream.read(&mut byte)).await;
        assert!(read.is_err(), "connection should still be pending");
    }
}
