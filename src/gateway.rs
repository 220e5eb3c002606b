//! Synchronous request-dispatch gateway.
//!
//! A blocking, WSGI-style calling convention between a tiny HTTP server
//! and an application callback: the server reads one request head, builds
//! an [`Environ`], and hands it to the application together with a
//! [`StartResponse`] handle. The application reports a status and headers
//! through the handle and returns the body as a sequence of chunks.
//!
//! Requests are handled strictly one at a time; there is no concurrency.

use crate::response::{find_end_of_headers, BODY, CONTENT_TYPE, STATUS_OK};
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Maximum number of request headers the environ will carry
const MAX_HEADERS: usize = 32;

/// Read buffer size
const BUFFER_SIZE: usize = 4 * 1024;

/// Request environment handed to the application.
///
/// Built from the request head; the body (if any) is never read.
#[derive(Debug, Clone)]
pub struct Environ {
    pub method: String,
    pub path: String,
    pub query: String,
    /// Minor HTTP version: 0 for HTTP/1.0, 1 for HTTP/1.1.
    pub version: u8,
    pub headers: Vec<(String, String)>,
}

/// Response-start handle passed to the application.
///
/// The application must call [`start`](Self::start) exactly once before
/// returning; the gateway rejects responses that were never started or
/// started more than once.
#[derive(Debug, Default)]
pub struct StartResponse {
    status: Option<String>,
    headers: Vec<(String, String)>,
    restarted: bool,
}

impl StartResponse {
    /// Record the response status line and headers.
    pub fn start(&mut self, status: &str, headers: &[(&str, &str)]) {
        if self.status.is_some() {
            self.restarted = true;
        }
        self.status = Some(status.to_string());
        self.headers = headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
    }

    fn into_parts(self) -> Result<(String, Vec<(String, String)>), GatewayError> {
        if self.restarted {
            return Err(GatewayError::ResponseRestarted);
        }
        match self.status {
            Some(status) => Ok((status, self.headers)),
            None => Err(GatewayError::ResponseNotStarted),
        }
    }
}

/// The hello application: ignores the request entirely.
pub fn hello_app(_environ: &Environ, start_response: &mut StartResponse) -> Vec<Vec<u8>> {
    start_response.start(STATUS_OK, &[CONTENT_TYPE]);
    vec![BODY.to_vec()]
}

/// Blocking gateway server dispatching every request to one application.
pub struct GatewayServer<F> {
    listener: TcpListener,
    local_addr: SocketAddr,
    app: F,
}

impl<F> GatewayServer<F>
where
    F: Fn(&Environ, &mut StartResponse) -> Vec<Vec<u8>>,
{
    /// Bind the listening socket and register the application.
    pub fn bind(addr: &str, app: F) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;
        Ok(GatewayServer {
            listener,
            local_addr,
            app,
        })
    }

    /// Address the listener actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept and dispatch requests forever, one at a time.
    ///
    /// A failed request is logged and the loop keeps serving; only an
    /// accept failure propagates.
    pub fn serve_forever(&self) -> std::io::Result<()> {
        info!(address = %self.local_addr, "Serving");

        loop {
            let (stream, addr) = self.listener.accept()?;
            debug!(peer = %addr, "New request");

            if let Err(e) = self.handle_request(stream) {
                warn!(error = %e, "Request error");
            }
        }
    }

    /// Read one request head, invoke the application, write the response.
    fn handle_request(&self, mut stream: TcpStream) -> Result<(), GatewayError> {
        let head = read_request_head(&mut stream)?;
        let environ = parse_environ(&head)?;

        let mut start_response = StartResponse::default();
        let chunks = (self.app)(&environ, &mut start_response);
        let (status, headers) = start_response.into_parts()?;

        let body_len: usize = chunks.iter().map(Vec::len).sum();
        let mut response = Vec::with_capacity(128 + body_len);
        response.extend_from_slice(b"HTTP/1.1 ");
        response.extend_from_slice(status.as_bytes());
        response.extend_from_slice(b"\r\n");
        for (name, value) in &headers {
            response.extend_from_slice(name.as_bytes());
            response.extend_from_slice(b": ");
            response.extend_from_slice(value.as_bytes());
            response.extend_from_slice(b"\r\n");
        }
        // Close-delimited body, so the client always learns the length
        response.extend_from_slice(b"Connection: close\r\n\r\n");
        for chunk in &chunks {
            response.extend_from_slice(chunk);
        }

        stream.write_all(&response)?;
        stream.shutdown(Shutdown::Write)?;
        Ok(())
    }
}

/// Read from the stream until the end-of-headers delimiter, returning the
/// request head including the blank line.
fn read_request_head(stream: &mut TcpStream) -> Result<Vec<u8>, GatewayError> {
    let mut buffer = Vec::with_capacity(BUFFER_SIZE);
    let mut chunk = [0u8; BUFFER_SIZE];

    loop {
        if let Some(head_len) = find_end_of_headers(&buffer) {
            buffer.truncate(head_len);
            return Ok(buffer);
        }

        let n = stream.read(&mut chunk)?;
        if n == 0 {
            // Peer closed before finishing its headers
            return Err(GatewayError::Io(std::io::Error::from(
                std::io::ErrorKind::UnexpectedEof,
            )));
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
}

/// Parse a complete request head into an [`Environ`].
fn parse_environ(head: &[u8]) -> Result<Environ, GatewayError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);

    match req.parse(head) {
        Ok(httparse::Status::Complete(_)) => {
            let target = req.path.unwrap_or("/");
            let (path, query) = match target.split_once('?') {
                Some((path, query)) => (path, query),
                None => (target, ""),
            };

            Ok(Environ {
                method: req.method.unwrap_or("").to_string(),
                path: path.to_string(),
                query: query.to_string(),
                version: req.version.unwrap_or(1),
                headers: req
                    .headers
                    .iter()
                    .map(|h| {
                        (
                            h.name.to_string(),
                            String::from_utf8_lossy(h.value).into_owned(),
                        )
                    })
                    .collect(),
            })
        }
        Ok(httparse::Status::Partial) => {
            Err(GatewayError::Parse("truncated request head".to_string()))
        }
        Err(e) => Err(GatewayError::Parse(e.to_string())),
    }
}

/// Gateway request-handling errors
#[derive(Debug)]
pub enum GatewayError {
    Io(std::io::Error),
    Parse(String),
    ResponseNotStarted,
    ResponseRestarted,
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Io(e) => write!(f, "I/O error: {e}"),
            GatewayError::Parse(e) => write!(f, "Failed to parse request head: {e}"),
            GatewayError::ResponseNotStarted => {
                write!(f, "Application returned without starting a response")
            }
            GatewayError::ResponseRestarted => {
                write!(f, "Application started the response more than once")
            }
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::Io(e)
    }
}
