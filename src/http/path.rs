//! Request path canonicalization.
//!
//! Resource names are matched literally, so this is the only thing standing
//! between a request like `/a/../../etc/passwd` and the resource table.

/// Reduces a slash-separated path to canonical form.
///
/// The result has no empty segment, no `.` segment and no `..` segment
/// except for a run of leading ones. A `..` removes the segment before it
/// unless that segment is itself a leading `..`, which is kept. There is no
/// leading or trailing slash.
///
/// ```
/// # use pinhole::http::path::canonicalize;
/// assert_eq!(canonicalize("/a/./b//c/"), "a/b/c");
/// assert_eq!(canonicalize("a/../../b"), "../b");
/// ```
pub fn canonicalize(path: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    // segments below the floor are leading `..` and cannot be popped
    let mut floor = 0;

    for segment in path.split('/') {
        match segment {
            ".." if kept.len() > floor => {
                kept.pop();
            }
            "" | "." => {}
            _ => {
                kept.push(segment);
                if segment == ".." {
                    floor = kept.len();
                }
            }
        }
    }

    kept.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_empty_and_dot_segments() {
        assert_eq!(canonicalize("a/./b//c/"), "a/b/c");
        assert_eq!(canonicalize("/"), "");
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("./."), "");
    }

    #[test]
    fn dotdot_pops_previous_segment() {
        assert_eq!(canonicalize("a/../b"), "b");
        assert_eq!(canonicalize("/a/b/../../c"), "c");
        assert_eq!(canonicalize("a/b/.."), "a");
    }

    #[test]
    fn leading_dotdot_survives() {
        assert_eq!(canonicalize("../../a"), "../../a");
        assert_eq!(canonicalize("a/../../b"), "../b");
        assert_eq!(canonicalize("/../x/.."), "..");
    }

    #[test]
    fn query_marker_is_an_ordinary_character() {
        assert_eq!(canonicalize("/cgi-bin/search?"), "cgi-bin/search?");
    }
}
