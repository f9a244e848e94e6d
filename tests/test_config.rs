use std::path::PathBuf;
use std::time::Duration;

use pinhole::config::{CONFIG_ENV, Config};
use pinhole::resource::Capability;

const SAMPLE: &str = r#"
root: /srv/http
log_file: /srv/http/log
visit_log:
  path: /srv/http/visits
  lock: /srv/http/visits.lock
environment:
  ROOT: /srv/http
  PATH: /bin:/usr/bin:/srv/http/bin
resources:
  - name: ""
    content_type: text/html
    kind: file
    path: index.html
  - name: index.html
    content_type: text/html
    kind: file
    path: index.html
  - name: motd
    content_type: text/plain
    kind: file
    path: /etc/motd
  - name: cgi-bin/search?
    content_type: text/html
    kind: program
    path: bin/search
    arg: data/index
"#;

#[test]
fn test_config_parses_resources_in_order() {
    let cfg = Config::from_yaml(SAMPLE).unwrap();

    assert_eq!(cfg.root, PathBuf::from("/srv/http"));
    assert_eq!(cfg.resources.len(), 4);

    let names: Vec<&str> = cfg.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["", "index.html", "motd", "cgi-bin/search?"]);

    let search = cfg.resources.resolve("cgi-bin/search?").unwrap();
    assert_eq!(
        search.capability,
        Capability::Program {
            path: PathBuf::from("bin/search"),
            arg: Some(PathBuf::from("data/index")),
        }
    );
}

#[test]
fn test_config_defaults() {
    let cfg = Config::from_yaml(SAMPLE).unwrap();

    assert_eq!(cfg.visit_log.max_attempts, 10);
    assert_eq!(cfg.visit_log.backoff_unit_ms, 1000);
    assert_eq!(cfg.program_timeout(), Duration::from_secs(30));
    assert_eq!(cfg.max_request_bytes, 64 * 1024);
    assert_eq!(cfg.listen_addr, None);
    assert_eq!(cfg.environment.get("ROOT").map(String::as_str), Some("/srv/http"));
}

#[test]
fn test_config_root_and_index_share_a_file() {
    let cfg = Config::from_yaml(SAMPLE).unwrap();

    let root = cfg.resources.resolve("").unwrap();
    let index = cfg.resources.resolve("index.html").unwrap();
    assert_eq!(root.capability, index.capability);
    assert_eq!(root.content_type, index.content_type);
}

#[test]
fn test_config_rejects_non_canonical_names() {
    let yaml = r#"
root: /srv/http
visit_log: { path: /tmp/v, lock: /tmp/v.lock }
resources:
  - { name: "/index.html", content_type: text/html, kind: file, path: index.html }
"#;

    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("not canonical"));
}

#[test]
fn test_config_rejects_unknown_capability() {
    let yaml = r#"
root: /srv/http
visit_log: { path: /tmp/v, lock: /tmp/v.lock }
resources:
  - { name: x, content_type: text/html, kind: socket, path: x }
"#;

    assert!(Config::from_yaml(yaml).is_err());
}

#[test]
fn test_config_load_from_env_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pinhole.yaml");
    std::fs::write(&path, SAMPLE).unwrap();

    unsafe {
        std::env::set_var(CONFIG_ENV, &path);
    }
    let cfg = Config::load();
    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }

    assert_eq!(cfg.unwrap().resources.len(), 4);
}

#[test]
fn test_config_missing_file_is_an_error() {
    let err = Config::from_file(std::path::Path::new("/nonexistent/pinhole.yaml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config"));
}
