use pinhole::http::request::{Header, Message, Method, Version};

fn message(headers: Vec<(&str, &str)>) -> Message {
    Message {
        method: Method::GET,
        method_name: "GET".to_string(),
        uri: "/".to_string(),
        query: None,
        version: Version::HTTP_11,
        headers: headers
            .into_iter()
            .map(|(name, value)| Header {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

#[test]
fn test_request_header_retrieval() {
    let req = message(vec![("Host", "example.com"), ("Content-Type", "application/json")]);

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_first_wins() {
    let req = message(vec![("Accept", "text/html"), ("Accept", "*/*")]);

    assert_eq!(req.header("Accept"), Some("text/html"));
}

#[test]
fn test_request_method_from_token() {
    assert_eq!(Method::from_token("GET"), Method::GET);
    assert_eq!(Method::from_token("post"), Method::POST);
    assert_eq!(Method::from_token("CoNnEcT"), Method::CONNECT);
    assert_eq!(Method::from_token("INVALID"), Method::UNKNOWN);
    assert_eq!(Method::from_token(""), Method::UNKNOWN);
}

#[test]
fn test_request_method_names() {
    assert_eq!(Method::OPTIONS.as_str(), "OPTIONS");
    assert_eq!(Method::DELETE.as_str(), "DELETE");
    assert_eq!(Method::UNKNOWN.as_str(), "UNKNOWN");
}

#[test]
fn test_version_persistence() {
    assert!(Version::HTTP_11.is_persistent());
    assert!(Version { major: 2, minor: 0 }.is_persistent());
    assert!(!Version::HTTP_10.is_persistent());
    assert!(!Version { major: 0, minor: 9 }.is_persistent());
    assert_eq!(Version::default(), Version::HTTP_11);
}
