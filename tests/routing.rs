//! Route discovery integration tests against scratch directory trees.

use std::path::Path;
use std::sync::Mutex;

use tempfile::TempDir;
use treeroute::{
    build_route_table, DiscoveryError, HandlerRegistry, NullObserver, RouterObserver, StubLoader,
    Verb,
};

mod common;

fn rs_exts() -> Vec<String> {
    vec!["rs".to_string()]
}

#[test]
fn missing_root_is_a_distinct_error() {
    let err = build_route_table(
        Path::new("/definitely/not/a/routes/dir"),
        &StubLoader,
        &NullObserver,
        &rs_exts(),
        1,
    )
    .unwrap_err();
    assert!(matches!(err, DiscoveryError::RootNotFound(_)));
}

#[test]
fn verb_file_at_root_binds_slash() {
    let dir = TempDir::new().unwrap();
    common::touch(dir.path(), "post.rs");

    let table = build_route_table(dir.path(), &StubLoader, &NullObserver, &rs_exts(), 1).unwrap();
    assert_eq!(table.len(), 1);
    let matched = table.match_path("/").unwrap();
    assert_eq!(matched.entry.pattern(), "/");
    assert!(matched.entry.handler(Verb::Post).is_some());
    assert!(matched.entry.handler(Verb::Get).is_none());
}

#[test]
fn dollar_directory_becomes_parameter_segment() {
    let dir = TempDir::new().unwrap();
    common::touch(dir.path(), "users/$id/get.rs");

    let table = build_route_table(dir.path(), &StubLoader, &NullObserver, &rs_exts(), 1).unwrap();
    let matched = table.match_path("/users/42").unwrap();
    assert_eq!(matched.entry.pattern(), "/users/:id");
    assert_eq!(matched.params.get("id").map(String::as_str), Some("42"));
}

#[test]
fn nested_dollar_directories_become_nested_parameters() {
    let dir = TempDir::new().unwrap();
    common::touch(dir.path(), "$a/$b/get.rs");

    let table = build_route_table(dir.path(), &StubLoader, &NullObserver, &rs_exts(), 1).unwrap();
    let matched = table.match_path("/one/two").unwrap();
    assert_eq!(matched.entry.pattern(), "/:a/:b");
    assert_eq!(matched.params.get("a").map(String::as_str), Some("one"));
    assert_eq!(matched.params.get("b").map(String::as_str), Some("two"));
}

#[test]
fn verbs_in_one_directory_share_an_entry() {
    let dir = TempDir::new().unwrap();
    common::touch(dir.path(), "things/get.rs");
    common::touch(dir.path(), "things/post.rs");
    common::touch(dir.path(), "things/delete.rs");

    let table = build_route_table(dir.path(), &StubLoader, &NullObserver, &rs_exts(), 1).unwrap();
    assert_eq!(table.len(), 1);
    let entry = &table.entries()[0];
    assert_eq!(entry.pattern(), "/things");
    assert!(entry.handler(Verb::Get).is_some());
    assert!(entry.handler(Verb::Post).is_some());
    assert!(entry.handler(Verb::Delete).is_some());
}

#[test]
fn non_verb_files_are_skipped_silently() {
    let dir = TempDir::new().unwrap();
    common::touch(dir.path(), "readme.md");
    common::touch(dir.path(), "helper.rs");
    common::touch(dir.path(), "GET.rs");
    common::touch(dir.path(), "get.txt");
    common::touch(dir.path(), "get");

    let table = build_route_table(dir.path(), &StubLoader, &NullObserver, &rs_exts(), 1).unwrap();
    assert!(table.is_empty());
}

#[test]
fn recognized_extensions_are_configurable() {
    let dir = TempDir::new().unwrap();
    common::touch(dir.path(), "post.ts");
    common::touch(dir.path(), "get.rs");

    let ts_only = vec!["ts".to_string()];
    let table = build_route_table(dir.path(), &StubLoader, &NullObserver, &ts_only, 1).unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.entries()[0].handler(Verb::Post).is_some());
    assert!(table.entries()[0].handler(Verb::Get).is_none());
}

#[test]
fn rebuilding_an_unchanged_tree_is_idempotent() {
    let dir = TempDir::new().unwrap();
    common::touch(dir.path(), "get.rs");
    common::touch(dir.path(), "authors/get.rs");
    common::touch(dir.path(), "authors/post.rs");
    common::touch(dir.path(), "authors/$authorId/get.rs");
    common::touch(dir.path(), "authors/$authorId/delete.rs");

    let first = build_route_table(dir.path(), &StubLoader, &NullObserver, &rs_exts(), 1).unwrap();
    let second = build_route_table(dir.path(), &StubLoader, &NullObserver, &rs_exts(), 2).unwrap();

    let shape = |table: &treeroute::RouteTable| {
        table
            .entries()
            .iter()
            .map(|entry| (entry.pattern().to_string(), entry.verbs().collect::<Vec<_>>()))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&first), shape(&second));
    assert_eq!(second.generation(), 2);
}

#[test]
fn unregistered_route_file_fails_the_build() {
    let dir = TempDir::new().unwrap();
    common::touch(dir.path(), "users/get.rs");

    let registry = HandlerRegistry::new();
    let err =
        build_route_table(dir.path(), &registry, &NullObserver, &rs_exts(), 1).unwrap_err();
    assert!(matches!(err, DiscoveryError::Load { .. }));
}

/// Collects discovery notifications for assertions.
struct Recorder(Mutex<Vec<(Verb, String)>>);

impl RouterObserver for Recorder {
    fn on_route_discovered(&self, verb: Verb, pattern: &str) {
        self.0.lock().unwrap().push((verb, pattern.to_string()));
    }
}

#[test]
fn observer_sees_every_binding() {
    let dir = TempDir::new().unwrap();
    common::touch(dir.path(), "get.rs");
    common::touch(dir.path(), "users/$id/get.rs");

    let recorder = Recorder(Mutex::new(Vec::new()));
    build_route_table(dir.path(), &StubLoader, &recorder, &rs_exts(), 1).unwrap();

    let mut seen = recorder.0.into_inner().unwrap();
    seen.sort_by(|a, b| a.1.cmp(&b.1));
    assert_eq!(
        seen,
        vec![
            (Verb::Get, "/".to_string()),
            (Verb::Get, "/users/:id".to_string()),
        ]
    );
}
