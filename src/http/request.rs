/// HTTP request methods.
///
/// The vocabulary is fixed and ordered. Anything outside it parses to
/// `UNKNOWN`; the raw token is kept on the [`Message`] so error pages
/// can echo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// TRACE - Echo the request back
    TRACE,
    /// CONNECT - Open a tunnel
    CONNECT,
    /// Any token outside the vocabulary above
    UNKNOWN,
}

const METHODS: [(&str, Method); 8] = [
    ("OPTIONS", Method::OPTIONS),
    ("GET", Method::GET),
    ("HEAD", Method::HEAD),
    ("POST", Method::POST),
    ("PUT", Method::PUT),
    ("DELETE", Method::DELETE),
    ("TRACE", Method::TRACE),
    ("CONNECT", Method::CONNECT),
];

impl Method {
    /// Parses an HTTP method token, ignoring ASCII case.
    ///
    /// # Example
    ///
    /// ```
    /// # use pinhole::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("head"), Method::HEAD);
    /// assert_eq!(Method::from_token("PATCH"), Method::UNKNOWN);
    /// ```
    pub fn from_token(token: &str) -> Self {
        METHODS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|(_, method)| *method)
            .unwrap_or(Method::UNKNOWN)
    }

    pub fn as_str(&self) -> &'static str {
        METHODS
            .iter()
            .find(|(_, method)| method == self)
            .map(|(name, _)| *name)
            .unwrap_or("UNKNOWN")
    }
}

/// Protocol version negotiated by the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const HTTP_10: Version = Version { major: 1, minor: 0 };
    pub const HTTP_11: Version = Version { major: 1, minor: 1 };

    /// Whether the connection may stay open after a determinate reply.
    pub fn is_persistent(&self) -> bool {
        *self >= Version::HTTP_11
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::HTTP_11
    }
}

/// A single request header with a canonicalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// A parsed client message.
#[derive(Debug, Clone)]
pub struct Message {
    /// The method matched from the vocabulary
    pub method: Method,
    /// The method token exactly as the client sent it
    pub method_name: String,
    /// The request path; keeps a trailing `?` when a query was split off
    pub uri: String,
    /// Everything after the first `?` of the request target
    pub query: Option<String>,
    pub version: Version,
    /// Headers in arrival order; names may repeat
    pub headers: Vec<Header>,
}

impl Message {
    /// Retrieves the first header with the given name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}
