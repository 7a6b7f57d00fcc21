//! End-to-end tests for the `pkgviz` binary
//!
//! Package pages are served from an `httpmock` server on localhost so the
//! whole pipeline (config, fetch, extraction, rendering) runs without network
//! access. The renderer is replaced by `true`/`false` where a run must finish.

use httpmock::{Mock, MockServer};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const ROOT_PAGE: &str = r#"<html><body>
<span class="title">Newtonsoft.Json</span>
<span class="version-title">13.0.1</span>
<ul id="dependency-groups">
    <li>
        <h4><span>Dependencies</span></h4>
        <ul>
            <li><a href="/packages/SomeDependency">SomeDependency</a> <span>1.0.0</span></li>
            <li>Unlinked.Dependency <span>2.0.0</span></li>
        </ul>
    </li>
</ul>
</body></html>"#;

const CHILD_PAGE: &str = r#"<html><body>
<span class="title">SomeDependency</span>
<span class="version-title">1.0.0</span>
<ul id="dependency-groups">
    <li>
        <h4><span>net8.0</span></h4>
        <ul>
            <li><a href="/packages/Grandchild">Grandchild</a> <span>(>= 4.0.0)</span></li>
        </ul>
    </li>
</ul>
</body></html>"#;

/// Serve `body` at `path`. Unmocked paths answer 404.
fn page<'a>(server: &'a MockServer, path: &str, body: &str) -> Mock<'a> {
    server.mock(|when, then| {
        when.method("GET").path(path);
        then.status(200)
            .header("Content-Type", "text/html")
            .body(body);
    })
}

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("pkgviz.toml");
    fs::write(&path, body).unwrap();
    path
}

fn run_pkgviz(args: &[&Path], dir: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pkgviz"));
    cmd.args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    // the page server lives on localhost
    for var in [
        "HTTP_PROXY",
        "http_proxy",
        "HTTPS_PROXY",
        "https_proxy",
        "ALL_PROXY",
        "all_proxy",
    ] {
        cmd.env_remove(var);
    }
    cmd.output().expect("Failed to execute pkgviz")
}

#[test]
fn test_missing_argument_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_pkgviz(&[], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {}", stderr);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_pkgviz(&[Path::new("missing.toml")], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Configuration file not found"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_missing_key_fails_before_any_request() {
    let server = MockServer::start();
    let root = page(&server, "/packages/Newtonsoft.Json", ROOT_PAGE);
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &format!(
            "[Configuration]\nPackagePath = \"{}/packages/Newtonsoft.Json\"\n",
            server.base_url()
        ),
    );

    let output = run_pkgviz(&[config.as_path()], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MaxDepth"), "stderr: {}", stderr);
    assert_eq!(root.hits(), 0);
}

#[test]
fn test_root_page_not_found() {
    let server = MockServer::start();
    let gone = server.mock(|when, then| {
        when.method("GET").path("/packages/Gone");
        then.status(404).body("not found");
    });
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &format!(
            "[Configuration]\nPackagePath = \"{}/packages/Gone\"\nMaxDepth = 1\nJava = \"true\"\n",
            server.base_url()
        ),
    );

    let output = run_pkgviz(&[config.as_path()], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("HTTP 404"), "stderr: {}", stderr);
    assert!(!dir.path().join("dependencies.puml").exists());
    gone.assert();
}

#[cfg(unix)]
#[test]
fn test_full_run_writes_diagram() {
    let server = MockServer::start();
    let root = page(&server, "/packages/Newtonsoft.Json", ROOT_PAGE);
    let child = page(&server, "/packages/SomeDependency", CHILD_PAGE);
    let grandchild = page(&server, "/packages/Grandchild", CHILD_PAGE);
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &format!(
            "[Configuration]\nPlantUMLPath = \"plantuml.jar\"\nPackagePath = \"{}/packages/Newtonsoft.Json\"\nMaxDepth = 2\nJava = \"true\"\n",
            server.base_url()
        ),
    );

    let output = run_pkgviz(&[config.as_path()], dir.path());

    assert!(
        output.status.success(),
        "pkgviz failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Diagram created successfully!"));

    let uml = fs::read_to_string(dir.path().join("dependencies.puml")).unwrap();
    assert!(uml.contains("Newtonsoft.Json\\n13.0.1"));
    assert!(uml.contains("SomeDependency\\n1.0.0"));
    assert!(uml.contains("Unlinked.Dependency\\n2.0.0"));
    assert!(uml.contains("Grandchild\\n(>= 4.0.0)"));
    assert!(uml.contains("package \"net8.0\""));
    assert_eq!(uml.lines().filter(|l| l.contains("root -->")).count(), 3);

    // root + one hop; Grandchild is beyond the budget
    root.assert();
    child.assert();
    assert_eq!(grandchild.hits(), 0);
}

#[cfg(unix)]
#[test]
fn test_renderer_failure_is_reported() {
    let server = MockServer::start();
    let root = page(&server, "/packages/Newtonsoft.Json", ROOT_PAGE);
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &format!(
            "[Configuration]\nPackagePath = \"{}/packages/Newtonsoft.Json\"\nMaxDepth = 1\nJava = \"false\"\nOutput = \"out/graph.puml\"\n",
            server.base_url()
        ),
    );

    let output = run_pkgviz(&[config.as_path()], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exited with status 1"), "stderr: {}", stderr);
    // the diagram itself was still written
    assert!(dir.path().join("out").join("graph.puml").exists());
    root.assert();
}

#[cfg(unix)]
#[test]
fn test_ini_config_file() {
    let server = MockServer::start();
    let root = page(&server, "/packages/Newtonsoft.Json", ROOT_PAGE);
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.ini");
    fs::write(
        &config,
        format!(
            "[Configuration]\nplantumlpath = plantuml.jar\npackagepath = {}/packages/Newtonsoft.Json\nmaxdepth = 1\njava = true\n",
            server.base_url()
        ),
    )
    .unwrap();

    let output = run_pkgviz(&[config.as_path()], dir.path());

    assert!(
        output.status.success(),
        "pkgviz failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let uml = fs::read_to_string(dir.path().join("dependencies.puml")).unwrap();
    assert!(uml.contains("SomeDependency\\n1.0.0"));
    root.assert();
}
