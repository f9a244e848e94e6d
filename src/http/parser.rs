use bytes::Bytes;
use thiserror::Error;

use crate::http::request::{Header, Message, Method, Version};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("end of stream while reading request")]
    Incomplete,

    #[error("request exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("message contains no request line")]
    MissingRequestLine,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

const WHITE: &[u8] = b" \t";

/// Returns the length of the first complete message in `buf`.
///
/// A message ends at two newlines in a row, ignoring any carriage returns
/// between them. The count starts at one, so a buffer that opens with a bare
/// line terminator is a complete (empty) message.
pub fn find_message_end(buf: &[u8]) -> Option<usize> {
    let mut newlines = 1;

    for (i, &b) in buf.iter().enumerate() {
        match b {
            b'\n' => {
                newlines += 1;
                if newlines == 2 {
                    return Some(i + 1);
                }
            }
            b'\r' => {}
            _ => newlines = 0,
        }
    }

    None
}

/// A framed but unparsed client message.
///
/// `lines` holds the offset of every physical line start, followed by the
/// length of the buffer, so line `i` spans `lines[i]..lines[i + 1]`.
#[derive(Debug, Clone)]
pub struct RawMessage {
    text: Bytes,
    lines: Vec<usize>,
}

impl RawMessage {
    pub fn new(text: Bytes) -> Self {
        let mut lines = vec![0];
        lines.extend(
            text.iter()
                .enumerate()
                .filter(|(_, b)| **b == b'\n')
                .map(|(i, _)| i + 1),
        );
        if lines.last() != Some(&text.len()) {
            lines.push(text.len());
        }

        Self { text, lines }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    pub fn into_bytes(self) -> Bytes {
        self.text
    }

    fn physical_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.windows(2).map(|w| &self.text[w[0]..w[1]])
    }

    /// Whether the first word of the message is `TRACE`, in any case.
    pub fn is_trace(&self) -> bool {
        let Some(first) = self.physical_lines().next() else {
            return false;
        };

        let start = first
            .iter()
            .position(|b| !WHITE.contains(b))
            .unwrap_or(first.len());
        let word = &first[start..];

        word.len() >= 6
            && word[..5].eq_ignore_ascii_case(b"TRACE")
            && b" \t\r\n".contains(&word[5])
    }

    /// Folds continuation lines and strips line terminators.
    ///
    /// The first element is the request line, the rest are header lines.
    /// The trailing blank line is not included.
    pub fn logical_lines(&self) -> Result<Vec<String>, ParseError> {
        let physical: Vec<&[u8]> = self.physical_lines().collect();
        let last = physical.len().saturating_sub(1);

        let mut logical = Vec::with_capacity(physical.len());
        let mut current = Vec::new();

        for (i, line) in physical.iter().enumerate() {
            current.extend_from_slice(strip_terminator(line));

            // The request line is never continued, and neither is the
            // terminating blank line.
            let continued = i != 0
                && i != last
                && physical[i + 1]
                    .first()
                    .is_some_and(|b| WHITE.contains(b));

            if !continued {
                logical.push(String::from_utf8_lossy(&current).into_owned());
                current.clear();
            }
        }

        // forget the blank line at the end
        logical.pop();

        match logical.first() {
            Some(first) if !first.is_empty() => Ok(logical),
            _ => Err(ParseError::MissingRequestLine),
        }
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_white(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Splits `s` at the first space or tab after skipping leading ones.
fn next_word(s: &str) -> (&str, &str) {
    let s = s.trim_start_matches(is_white);
    match s.find(is_white) {
        Some(end) => (&s[..end], &s[end..]),
        None => (s, ""),
    }
}

/// Parses a request line such as `GET /a/b?x=1 HTTP/1.1`.
pub fn parse_request_line(line: &str) -> Message {
    let (method_name, rest) = next_word(line);
    let (target, rest) = next_word(rest);

    let (uri, query) = match target.find('?') {
        Some(q) => (&target[..=q], Some(target[q + 1..].to_string())),
        None => (target, None),
    };

    Message {
        method: Method::from_token(method_name),
        method_name: method_name.to_string(),
        uri: uri.to_string(),
        query,
        version: parse_version(rest),
        headers: Vec::new(),
    }
}

fn parse_version(s: &str) -> Version {
    let s = s.trim_start_matches(is_white);
    let Some(numbers) = s
        .get(..5)
        .filter(|prefix| prefix.eq_ignore_ascii_case("HTTP/"))
        .map(|_| s[5..].trim_start_matches(is_white))
    else {
        return Version::default();
    };

    let Some(major) = leading_number(numbers) else {
        return Version::default();
    };
    let minor = numbers
        .split_once('.')
        .and_then(|(_, rest)| leading_number(rest))
        .unwrap_or(0);

    Version { major, minor }
}

fn leading_number(s: &str) -> Option<u32> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Parses a header line such as `Content-Type: text/html`.
pub fn parse_header(line: &str) -> Header {
    let line = line.trim_start_matches(is_white);
    let end = line
        .find(|c: char| c == ':' || is_white(c))
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(end);

    let rest = rest.trim_start_matches(is_white);
    let value = rest.strip_prefix(':').unwrap_or(rest);

    Header {
        name: canonical_header_name(name),
        value: value.trim().to_string(),
    }
}

/// Capitalizes the first letter and every letter after a `-`, lowercasing
/// the rest: `content-TYPE` becomes `Content-Type`.
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;

    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }

    out
}

/// Normalizes and parses a framed message.
pub fn parse_message(raw: &RawMessage) -> Result<Message, ParseError> {
    let lines = raw.logical_lines()?;
    let (request_line, header_lines) = lines
        .split_first()
        .ok_or(ParseError::MissingRequestLine)?;

    let mut message = parse_request_line(request_line);
    message.headers = header_lines.iter().map(|l| parse_header(l)).collect();

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let raw = RawMessage::new(Bytes::from_static(
            b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n",
        ));

        let parsed = parse_message(&raw).unwrap();

        assert_eq!(parsed.uri, "/");
        assert_eq!(parsed.header("Host").unwrap(), "example.com");
    }

    #[test]
    fn line_offsets_cover_buffer() {
        let raw = RawMessage::new(Bytes::from_static(b"GET /\r\nA: b\r\n\r\n"));
        assert_eq!(raw.lines, vec![0, 7, 13, 15]);
    }

    #[test]
    fn header_name_capitalization() {
        assert_eq!(canonical_header_name("content-TYPE"), "Content-Type");
        assert_eq!(canonical_header_name("x-forwarded-for"), "X-Forwarded-For");
        assert_eq!(canonical_header_name(""), "");
    }
}
