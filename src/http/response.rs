/// Name reported in the `Server` header and on message pages.
pub const SERVER_NAME: &str = "pinhole";

/// Version reported alongside [`SERVER_NAME`].
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reason phrase used for codes missing from the table.
pub const UNKNOWN_REASON: &str = "Unknown Status";

/// An HTTP status code.
///
/// Any integer is representable so the reply emitter can be driven with
/// codes outside the table; those get [`UNKNOWN_REASON`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const PAYLOAD_TOO_LARGE: StatusCode = StatusCode(413);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);
    pub const GATEWAY_TIMEOUT: StatusCode = StatusCode(504);

    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// Returns the numeric HTTP status code.
    ///
    /// ```
    /// # use pinhole::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the reason phrase for this status code.
    ///
    /// ```
    /// # use pinhole::http::response::StatusCode;
    /// assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), "Not Found");
    /// assert_eq!(StatusCode::from_u16(999).reason_phrase(), "Unknown Status");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            203 => "Non-Authoritative Information",
            204 => "No Content",
            205 => "Reset Content",
            206 => "Partial Content",
            207 => "Partial Update OK",
            300 => "Multiple Choices",
            301 => "Moved Permanently",
            302 => "Moved Temporarily",
            303 => "See Other",
            304 => "Not Modified",
            305 => "Use Proxy",
            307 => "Temporary Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            402 => "Payment Required",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            407 => "Proxy Authentication Required",
            408 => "Request Timeout",
            409 => "Conflict",
            410 => "Gone",
            411 => "Length Required",
            412 => "Precondition Failed",
            413 => "Request Entity Too Large",
            414 => "Request-URI Too Long",
            415 => "Unsupported Media Type",
            416 => "Requested Range Not Satisfiable",
            417 => "Expectation Failed",
            // kept for clients that still look for them
            418 => "Reauthentication Required",
            419 => "Proxy Reauthentication Required",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            505 => "HTTP Version Not Supported",
            506 => "Partial Update Not Implemented",
            _ => UNKNOWN_REASON,
        }
    }
}

/// The head of a reply, plus a body when it is known up front.
///
/// `content_length` of `None` means the length is not known and the client
/// has to read until the connection closes.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    /// Extra headers, written after the standard ones in this order
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Builder for constructing replies in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::OK)
///     .content_type("text/plain")
///     .body(b"hello".to_vec())
///     .build();
/// ```
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    content_type: Option<String>,
    content_length: Option<u64>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            content_length: None,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Declares the length of a body that will be streamed separately.
    pub fn content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    /// Appends a header. Duplicates are kept.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Sets an in-memory body; the content length follows from it.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.content_length = Some(body.len() as u64);
        self.body = body;
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            content_type: self.content_type,
            content_length: self.content_length,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// An HTML page carrying a server message.
    pub fn page(status: StatusCode, text: &str) -> Self {
        let body = format!(
            "<html><head><title>{SERVER_NAME} server message</title></head>\n\
             <body><h3>Message from {SERVER_NAME}</h3>\n\
             {text}</body></html>\n"
        );

        ResponseBuilder::new(status)
            .content_type("text/html")
            .body(body.into_bytes())
            .build()
    }

    pub fn client_error(status: StatusCode, msg: &str) -> Self {
        Self::page(status, &format!("Client error {}: {}", status.as_u16(), msg))
    }

    pub fn server_error(status: StatusCode, msg: &str) -> Self {
        Self::page(status, &format!("Server error {}: {}", status.as_u16(), msg))
    }

    /// The page sent right before the process gives up.
    pub fn aborted(msg: &str) -> Self {
        Self::page(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Server aborted: {msg}"),
        )
    }

    /// Echo of a TRACE request.
    pub fn trace(raw: &[u8]) -> Self {
        ResponseBuilder::new(StatusCode::OK)
            .content_type("message/http")
            .body(raw.to_vec())
            .build()
    }
}
