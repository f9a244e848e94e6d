use pinhole::http::path::canonicalize;

/// Every slash-joined path of up to `depth` segments drawn from `alphabet`.
fn all_paths(alphabet: &[&str], depth: usize) -> Vec<String> {
    let mut paths = vec![String::new()];
    let mut frontier = vec![Vec::<&str>::new()];

    for _ in 0..depth {
        let mut next = Vec::new();
        for prefix in &frontier {
            for &seg in alphabet {
                let mut p = prefix.clone();
                p.push(seg);
                paths.push(p.join("/"));
                next.push(p);
            }
        }
        frontier = next;
    }

    paths
}

#[test]
fn test_canonical_examples() {
    assert_eq!(canonicalize("a/./b//c/"), "a/b/c");
    assert_eq!(canonicalize("a/../b"), "b");
    assert_eq!(canonicalize("../../a"), "../../a");
    assert_eq!(canonicalize("a/../../b"), "../b");
}

#[test]
fn test_request_paths_lose_leading_slash() {
    assert_eq!(canonicalize("/index.html"), "index.html");
    assert_eq!(canonicalize("//docs///guide/"), "docs/guide");
}

#[test]
fn test_traversal_cannot_climb_over_retained_segments() {
    assert_eq!(canonicalize("/a/b/../../../etc/passwd"), "../etc/passwd");
    assert_eq!(canonicalize("/./../a/.."), "..");
}

#[test]
fn test_canonicalize_is_idempotent() {
    for path in all_paths(&["a", "b", "", ".", ".."], 5) {
        let once = canonicalize(&path);
        assert_eq!(canonicalize(&once), once, "not idempotent for {path:?}");
    }
}

#[test]
fn test_canonical_segments_are_clean() {
    for path in all_paths(&["a", "", ".", ".."], 6) {
        let canon = canonicalize(&path);
        if canon.is_empty() {
            continue;
        }

        let segments: Vec<&str> = canon.split('/').collect();
        assert!(
            segments.iter().all(|s| !s.is_empty() && *s != "."),
            "empty or dot segment in {canon:?} from {path:?}"
        );

        // any `..` must belong to the leading run
        let leading = segments.iter().take_while(|s| **s == "..").count();
        assert!(
            segments[leading..].iter().all(|s| *s != ".."),
            "interior .. in {canon:?} from {path:?}"
        );
    }
}
