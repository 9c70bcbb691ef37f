//! Integration tests for loading compiled widget markup from disk.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use pizzaz_mcp::assets::load_artifacts;
use pizzaz_mcp::catalog::Catalog;
use pizzaz_mcp::error::CatalogError;
use pizzaz_mcp::mcp::Dispatcher;
use pizzaz_mcp::pizzeria::MockPizzerias;
use pizzaz_mcp::tools::default_widgets;
use pizzaz_mcp::widget::meta::EMBEDDED_WIDGET;
use serde_json::json;
use tempfile::tempdir;

fn write_artifact(dir: &Path, file_name: &str, markup: &str, age: Duration) {
    let path = dir.join(file_name);
    fs::write(&path, markup).expect("Failed to write artifact");
    let modified = SystemTime::now()
        .checked_sub(age)
        .expect("time before epoch");
    File::options()
        .write(true)
        .open(&path)
        .expect("Failed to reopen artifact")
        .set_modified(modified)
        .expect("Failed to set mtime");
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn test_loads_matching_files_only() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let dir = temp_dir.path();

    write_artifact(dir, "helloworld-1a2b.html", "<p>hello</p>", Duration::ZERO);
    write_artifact(dir, "pizza_list-00ff.html", "<ul></ul>", Duration::ZERO);
    write_artifact(dir, "pizza_list.html", "unhashed", Duration::ZERO);
    write_artifact(dir, "pizza_map-00ff.js", "script", Duration::ZERO);
    write_artifact(dir, "pizza_map-XYZW.html", "bad hash", Duration::ZERO);
    fs::create_dir(dir.join("nested")).expect("Failed to create subdir");
    write_artifact(&dir.join("nested"), "pizza_map-abcd.html", "nested", Duration::ZERO);

    let artifacts = load_artifacts(dir).expect("Failed to load");

    let mut names: Vec<&str> = artifacts.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(names, ["helloworld", "pizza_list"]);

    let hello = &artifacts["helloworld"];
    assert_eq!(hello.content_hash, "1a2b");
    assert_eq!(&*hello.markup, "<p>hello</p>");
}

#[test]
fn test_newest_build_wins() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let dir = temp_dir.path();

    write_artifact(dir, "pizza_map-aaaa.html", "old", Duration::from_secs(3600));
    write_artifact(dir, "pizza_map-bbbb.html", "new", Duration::from_secs(60));
    write_artifact(dir, "pizza_map-cccc.html", "older", Duration::from_secs(7200));

    let artifacts = load_artifacts(dir).expect("Failed to load");

    assert_eq!(artifacts.len(), 1);
    let map = &artifacts["pizza_map"];
    assert_eq!(map.content_hash, "bbbb");
    assert_eq!(&*map.markup, "new");
}

#[test]
fn test_empty_directory_loads_nothing() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let artifacts = load_artifacts(temp_dir.path()).expect("Failed to load");
    assert!(artifacts.is_empty());
}

#[test]
fn test_file_instead_of_directory() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("not-a-dir");
    fs::write(&path, "").expect("Failed to write");

    assert!(load_artifacts(&path).is_err());
}

// =============================================================================
// Startup
// =============================================================================

#[test]
fn test_partial_build_refuses_to_start() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let dir = temp_dir.path();
    write_artifact(dir, "helloworld-1a2b.html", "<p>hello</p>", Duration::ZERO);
    write_artifact(dir, "pizza_list-1a2b.html", "<ul></ul>", Duration::ZERO);

    let artifacts = load_artifacts(dir).expect("Failed to load");
    let err = Catalog::new(default_widgets(Arc::new(MockPizzerias)), artifacts).unwrap_err();
    assert!(matches!(err, CatalogError::MissingArtifact { ref identifier } if identifier == "pizza_map"));
}

#[tokio::test]
async fn test_disk_markup_reaches_call_result() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let dir = temp_dir.path();
    let map_markup = "<!doctype html>\n<div id=\"pizzaz-root\"></div>\n<script>/* bundle */</script>\n";
    write_artifact(dir, "helloworld-0001.html", "<p>hello</p>", Duration::ZERO);
    write_artifact(dir, "pizza_list-0002.html", "<ul></ul>", Duration::ZERO);
    write_artifact(dir, "pizza_map-0003.html", map_markup, Duration::ZERO);

    let artifacts = load_artifacts(dir).expect("Failed to load");
    let catalog = Catalog::new(default_widgets(Arc::new(MockPizzerias)), artifacts)
        .expect("Failed to build catalog");
    let dispatcher = Dispatcher::new(Arc::new(catalog));

    let result = dispatcher
        .call_tool("pizza_map", &json!({"pizzaTopping": "margherita"}))
        .await;
    let meta = result.meta.expect("meta");
    assert_eq!(meta[EMBEDDED_WIDGET]["resource"]["text"], map_markup);

    let read = dispatcher.read_resource("ui://widget/pizza_map.html");
    assert_eq!(read.contents[0].text, map_markup);
}
