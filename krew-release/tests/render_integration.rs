//! End-to-end rendering of the manifest fixtures.
//!
//! These tests verify the complete flow:
//! - template file -> parsed actions -> asset download -> checksum -> spliced block
//! - both download strategies, against a local server
//! - manifest updates from local and remote templates
//!
//! Run with: `cargo test --test render_integration`

mod common;

use std::time::Duration;

use krew_release::krew::{manifest_path, update_plugin_manifest};
use krew_release::release::ReleaseEvent;
use krew_release::source::{DownloadConfig, GithubDownloader, HttpDownloader, SourceError};
use krew_release::template::{render, render_template, ReleaseRequest, TemplateSource};

use common::{
    fixture, read_fixture, Reply, TestServer, PLUGIN_BINARY, WHOAMI_ASSET, WHOAMI_DOWNLOAD_PREFIX,
};

/// Template fixtures and the manifests they must render to.
const FIXTURES: &[(&str, &str)] = &[
    (
        "needs-6-space-indentation.yaml",
        "needs-6-space-indentation-expected.yaml",
    ),
    (
        "needs-4-space-indentation.yaml",
        "needs-4-space-indentation-expected.yaml",
    ),
    (
        "line-start-with-dash.yaml",
        "line-start-with-dash-expected.yaml",
    ),
];

// ============================================================================
// Helper Functions
// ============================================================================

fn config() -> DownloadConfig {
    DownloadConfig::default().with_timeout(Duration::from_secs(5))
}

fn request() -> ReleaseRequest {
    ReleaseRequest::new("v0.0.2")
}

/// Point the github.com download links in `text` at the local server.
fn localize(text: &str, server: &TestServer) -> String {
    text.replace(WHOAMI_DOWNLOAD_PREFIX, &server.url("/download"))
}

// ============================================================================
// Fixture Rendering
// ============================================================================

#[test]
fn test_render_fixtures_with_github_downloader() {
    let server = TestServer::start();
    server.serve_whoami_release("v0.0.2", WHOAMI_ASSET, PLUGIN_BINARY);
    let downloader = GithubDownloader::new(config().with_api_base_url(server.base_url())).unwrap();

    for (template, expected) in FIXTURES {
        let output = render_template(&downloader, &fixture(template), &request()).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            read_fixture(expected),
            "rendering {}",
            template
        );
    }
}

#[test]
fn test_render_fixtures_with_http_downloader() {
    let server = TestServer::start();
    server.route(
        &format!("/download/v0.0.2/{}", WHOAMI_ASSET),
        vec![Reply::ok(PLUGIN_BINARY)],
    );
    let downloader = HttpDownloader::new(config()).unwrap();

    for (template, expected) in FIXTURES {
        let text = localize(&read_fixture(template), &server);
        let output = render(&downloader, template, &text, &request()).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            localize(&read_fixture(expected), &server),
            "rendering {}",
            template
        );
    }

    assert_eq!(
        server.hits(&format!("/download/v0.0.2/{}", WHOAMI_ASSET)),
        FIXTURES.len()
    );
}

#[test]
fn test_render_is_idempotent_across_runs() {
    let server = TestServer::start();
    server.serve_whoami_release("v0.0.2", WHOAMI_ASSET, PLUGIN_BINARY);
    let downloader = GithubDownloader::new(config().with_api_base_url(server.base_url())).unwrap();

    let path = fixture("needs-4-space-indentation.yaml");
    let first = render_template(&downloader, &path, &request()).unwrap();
    let second = render_template(&downloader, &path, &request()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_render_fails_when_asset_missing() {
    let server = TestServer::start();
    let downloader = HttpDownloader::new(config().with_retries(1)).unwrap();

    let text = localize(&read_fixture("needs-4-space-indentation.yaml"), &server);
    let result = render(&downloader, "needs-4-space-indentation.yaml", &text, &request());

    assert!(matches!(result, Err(SourceError::DownloadFailed { .. })));
}

// ============================================================================
// Manifest Updates
// ============================================================================

#[test]
fn test_update_manifest_from_remote_template() {
    let server = TestServer::start();
    server.serve_whoami_release("v0.0.2", WHOAMI_ASSET, PLUGIN_BINARY);
    server.route(
        "/rajatjindal/kubectl-whoami/master/.krew.yaml",
        vec![Reply::ok(read_fixture("line-start-with-dash.yaml"))],
    );

    let index = tempfile::TempDir::new().unwrap();
    let dest = manifest_path(index.path(), "whoami");
    let event =
        ReleaseEvent::new("rajatjindal", "kubectl-whoami", "v0.0.2").with_assets([WHOAMI_ASSET]);
    assert!(event.should_publish());
    assert!(event.has_asset(WHOAMI_ASSET));

    update_plugin_manifest(
        &HttpDownloader::new(config()).unwrap(),
        &GithubDownloader::new(config().with_api_base_url(server.base_url())).unwrap(),
        &TemplateSource::Remote(server.url("/rajatjindal/kubectl-whoami/master/.krew.yaml")),
        &dest,
        &event.to_request("whoami"),
    )
    .unwrap();

    assert_eq!(
        std::fs::read_to_string(&dest).unwrap(),
        read_fixture("line-start-with-dash-expected.yaml")
    );
    assert_eq!(
        server.hits("/rajatjindal/kubectl-whoami/master/.krew.yaml"),
        1
    );
}

#[test]
fn test_update_manifest_remote_template_missing() {
    let server = TestServer::start();
    let index = tempfile::TempDir::new().unwrap();
    let dest = manifest_path(index.path(), "whoami");

    let result = update_plugin_manifest(
        &HttpDownloader::new(config().with_retries(1)).unwrap(),
        &HttpDownloader::new(config()).unwrap(),
        &TemplateSource::Remote(server.url("/o/r/master/.krew.yaml")),
        &dest,
        &request(),
    );

    assert!(matches!(result, Err(SourceError::DownloadFailed { .. })));
    assert!(!dest.exists());
}
