//! Integration tests for the mirrorer
//!
//! These tests use wiremock to create mock HTTP servers and run full
//! mirrors end-to-end into temporary directories.

use site_mirror::config::MirrorConfig;
use site_mirror::{Mirror, MirrorReport, TaskOutcome};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Upper bound for any single test run
const RUN_TIMEOUT: Duration = Duration::from_secs(20);

/// Serves `body` at `route` exactly once with the given content type
async fn serve_once(server: &MockServer, route: &str, body: &str, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, content_type))
        .expect(1)
        .mount(server)
        .await;
}

/// Creates a test configuration writing under `output`
fn create_test_config(output: &Path) -> MirrorConfig {
    let mut config = MirrorConfig::default();
    config.mirror.output_dir = output.to_string_lossy().into_owned();
    config.mirror.request_timeout_secs = 5;
    config
}

/// Mirrors `seed` into `output`, failing the test if the run does not settle
async fn run_mirror(seed: &str, output: &Path) -> MirrorReport {
    let mirror = Mirror::new(create_test_config(output), seed).expect("Failed to create mirror");
    tokio::time::timeout(RUN_TIMEOUT, mirror.run())
        .await
        .expect("Mirror did not reach quiescence")
        .expect("Mirror run failed")
}

fn read(output: &Path, relative: &str) -> String {
    std::fs::read_to_string(output.join(relative))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
}

/// Lists every file under `root` as sorted forward-slash relative paths
fn list_files(root: &Path) -> Vec<String> {
    fn walk(dir: &Path, root: &Path, files: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, root, files);
            } else {
                let relative = path.strip_prefix(root).unwrap();
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                files.push(parts.join("/"));
            }
        }
    }

    let mut files = Vec::new();
    walk(root, root, &mut files);
    files.sort();
    files
}

#[tokio::test]
async fn test_full_mirror_small_site() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    serve_once(
        &server,
        "/",
        r#"<html><body><a href="/p">p</a><img src="pic.png"></body></html>"#,
        "text/html; charset=utf-8",
    )
    .await;
    serve_once(
        &server,
        "/p",
        r#"<html><head><link rel="stylesheet" href="/s.css"></head><body><a href="/">home</a></body></html>"#,
        "text/html",
    )
    .await;
    serve_once(
        &server,
        "/s.css",
        "body{background:url(/bg.png)}",
        "text/css",
    )
    .await;
    serve_once(&server, "/pic.png", "PNGDATA", "image/png").await;
    serve_once(&server, "/bg.png", "BGDATA", "image/png").await;

    let report = run_mirror(&format!("{}/", server.uri()), output.path()).await;

    assert_eq!(
        list_files(output.path()),
        vec!["bg.png", "index.html", "p.html", "pic.png", "s.css"]
    );

    let index = read(output.path(), "index.html");
    assert!(index.contains(r#"href="p.html""#), "index.html: {}", index);
    assert!(index.contains(r#"src="pic.png""#), "index.html: {}", index);

    let page = read(output.path(), "p.html");
    assert!(page.contains(r#"href="s.css""#), "p.html: {}", page);
    assert!(page.contains(r#"href="index.html""#), "p.html: {}", page);

    assert_eq!(read(output.path(), "s.css"), "body{background:url('bg.png')}");
    assert_eq!(read(output.path(), "pic.png"), "PNGDATA");

    assert!(report.is_complete());
    assert_eq!(report.stats.tasks_enqueued, 5);
    assert_eq!(report.stats.resources_saved, 5);
    assert_eq!(report.stats.pages, 2);
    assert_eq!(report.stats.stylesheets, 1);
    assert_eq!(report.stats.opaque, 2);
    assert!(report.resource_at("s.css").is_some());
}

#[tokio::test]
async fn test_link_cycle_terminates() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    serve_once(&server, "/a", r#"<a href="/b">b</a>"#, "text/html").await;
    serve_once(&server, "/b", r#"<a href="/a">a</a><a href="b">self</a>"#, "text/html").await;

    let report = run_mirror(&format!("{}/a", server.uri()), output.path()).await;

    assert_eq!(list_files(output.path()), vec!["a.html", "b.html"]);
    assert!(read(output.path(), "b.html").contains(r#"href="a.html""#));
    assert_eq!(report.stats.tasks_enqueued, 2);
}

#[tokio::test]
async fn test_shared_resources_fetched_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/section/{}">{}</a>"#, i, i))
        .collect();
    serve_once(&server, "/", &links, "text/html").await;

    for i in 0..10 {
        serve_once(
            &server,
            &format!("/section/{}", i),
            r#"<link rel="stylesheet" href="/shared.css"><img src="../logo.png"><a href="/">home</a>"#,
            "text/html",
        )
        .await;
    }
    serve_once(&server, "/shared.css", "h1{color:red}", "text/css").await;
    serve_once(&server, "/logo.png", "LOGO", "image/png").await;

    let report = run_mirror(&format!("{}/", server.uri()), output.path()).await;

    assert_eq!(report.stats.tasks_enqueued, 13);
    assert_eq!(report.stats.resources_saved, 13);

    let section = read(output.path(), "section/3.html");
    assert!(section.contains(r#"href="../shared.css""#), "section: {}", section);
    assert!(section.contains(r#"src="../logo.png""#), "section: {}", section);
    assert!(section.contains(r#"href="../index.html""#), "section: {}", section);
}

#[tokio::test]
async fn test_other_hosts_are_not_fetched() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let index = format!(
        r#"<a href="{0}/elsewhere">out</a><img src="{0}/remote.png"><a href="mailto:me@x.test">mail</a><a href="/local">in</a>"#,
        other.uri()
    );
    serve_once(&server, "/", &index, "text/html").await;
    serve_once(&server, "/local", "<p>local</p>", "text/html").await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("nope", "text/html"))
        .expect(0)
        .mount(&other)
        .await;

    let report = run_mirror(&format!("{}/", server.uri()), output.path()).await;

    assert_eq!(list_files(output.path()), vec!["index.html", "local.html"]);

    let saved = read(output.path(), "index.html");
    assert!(saved.contains(&format!("{}/elsewhere", other.uri())));
    assert!(saved.contains(&format!("{}/remote.png", other.uri())));
    assert!(saved.contains("mailto:me@x.test"));
    assert!(saved.contains(r#"href="local.html""#));
    assert_eq!(report.stats.tasks_enqueued, 2);
}

#[tokio::test]
async fn test_failed_resource_does_not_stop_run() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    serve_once(
        &server,
        "/",
        r#"<img src="/missing.png"><a href="/ok">ok</a>"#,
        "text/html",
    )
    .await;
    serve_once(&server, "/ok", "<p>fine</p>", "text/html").await;

    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let report = run_mirror(&format!("{}/", server.uri()), output.path()).await;

    assert_eq!(list_files(output.path()), vec!["index.html", "ok.html"]);
    assert!(!report.is_complete());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].url.ends_with("/missing.png"));
    assert_eq!(report.failures[0].outcome, TaskOutcome::NetworkFailed);
    assert_eq!(report.stats.network_failures, 1);
    assert_eq!(report.stats.resources_saved, 2);

    // The reference is still rewritten even though the target failed
    assert!(read(output.path(), "index.html").contains(r#"src="missing.png""#));
}

#[tokio::test]
async fn test_fragments_and_queries() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    serve_once(
        &server,
        "/",
        r#"<a href="/doc#intro">a</a><a href="/doc">b</a><a href="/list?page=1">1</a><a href="/list?page=2">2</a>"#,
        "text/html",
    )
    .await;
    serve_once(&server, "/doc", "<p>doc</p>", "text/html").await;

    for page in ["1", "2"] {
        Mock::given(method("GET"))
            .and(path("/list"))
            .and(query_param("page", page))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(format!("<p>page {}</p>", page), "text/html"),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let report = run_mirror(&format!("{}/", server.uri()), output.path()).await;

    assert_eq!(report.stats.tasks_enqueued, 4);

    let files = list_files(output.path());
    assert_eq!(files.len(), 4, "files: {:?}", files);
    assert!(files.contains(&"doc.html".to_string()));
    assert_eq!(files.iter().filter(|f| f.starts_with("list-")).count(), 2);

    let index = read(output.path(), "index.html");
    assert!(index.contains(r#"href="doc.html#intro""#), "index: {}", index);
    assert!(index.contains(r#"href="doc.html""#), "index: {}", index);
}

/// A route served by [`serve_raw`]: path, optional Content-Type, body
type RawRoute = (&'static str, Option<&'static str>, &'static str);

/// Serves fixed routes over plain HTTP/1.1 with exactly the given headers
///
/// Returns the base URL and the log of requested paths.
async fn serve_raw(routes: Vec<RawRoute>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                log.lock().unwrap().push(target.clone());

                let response = match routes.iter().find(|(route, _, _)| *route == target) {
                    Some((_, content_type, body)) => {
                        let mut head = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n",
                            body.len()
                        );
                        if let Some(content_type) = content_type {
                            head.push_str(&format!("Content-Type: {}\r\n", content_type));
                        }
                        format!("{}\r\n{}", head, body)
                    }
                    None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string(),
                };

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (base, requests)
}

#[tokio::test]
async fn test_missing_content_type_uses_discovery_hint() {
    let output = TempDir::new().unwrap();
    let (base, requests) = serve_raw(vec![
        ("/", Some("text/html"), r#"<a href="/bare">bare</a><img src="/blob">"#),
        // No Content-Type: a page link is still parsed as HTML
        ("/bare", None, r#"<a href="/deep">deep</a>"#),
        // No Content-Type: an asset is stored untouched
        ("/blob", None, r#"<a href="/never">x</a>"#),
        ("/deep", Some("text/html"), "<p>deep</p>"),
    ])
    .await;

    let report = run_mirror(&format!("{}/", base), output.path()).await;

    let mut requested = requests.lock().unwrap().clone();
    requested.sort();
    assert_eq!(requested, vec!["/", "/bare", "/blob", "/deep"]);

    assert_eq!(report.stats.pages, 3);
    assert_eq!(report.stats.opaque, 1);
    assert!(read(output.path(), "bare.html").contains(r#"href="deep.html""#));
    assert_eq!(read(output.path(), "blob.html"), r#"<a href="/never">x</a>"#);
}

#[tokio::test]
async fn test_latin1_page_is_mirrored_and_followed() {
    let output = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            &b"<p>Caf\xe9</p><a href=\"/menu\">menu</a>"[..],
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;
    serve_once(&server, "/menu", "<p>menu</p>", "text/html").await;

    let report = run_mirror(&format!("{}/", server.uri()), output.path()).await;

    assert!(report.is_complete());
    assert_eq!(list_files(output.path()), vec!["index.html", "menu.html"]);

    let index = std::fs::read(output.path().join("index.html")).unwrap();
    assert!(index.windows(4).any(|w| w == b"Caf\xe9"));
    assert!(String::from_utf8_lossy(&index).contains(r#"href="menu.html""#));
}
