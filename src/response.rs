//! The fixed response both servers hand out, plus the end-of-headers scan.

/// Response body, identical for both variants.
pub const BODY: &[u8] = b"Hello, World!";

/// Complete wire message written by the async server.
///
/// Byte-exact: no Content-Length, the body is delimited by connection close.
pub const WIRE_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
    Connection: close\r\n\
    Content-Type: text/plain; charset=utf-8\r\n\
    \r\n\
    Hello, World!";

/// Status the gateway application reports.
pub const STATUS_OK: &str = "200 OK";

/// The one header the gateway application sets.
pub const CONTENT_TYPE: (&str, &str) = ("Content-type", "text/plain; charset=utf-8");

/// Find the end-of-headers delimiter `\r\n\r\n` in `buffer`.
///
/// Returns the index one past the delimiter, i.e. the length of the
/// request head including the blank line.
pub fn find_end_of_headers(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}
