//! End-to-end scenarios over real HTTP.
//!
//! A minimal local server hands out the Apache-style pages under `fixtures/`
//! (a request for `dir/` is answered with `dir/index.html`, anything missing
//! is a 404). The controller talks to it through the production
//! `HttpTransport`, and the last tests drive the built binary the same way.

use autoindex_viewer::config::TransportConfig;
use autoindex_viewer::controller::{GalleryController, LoadOutcome, NavOutcome};
use autoindex_viewer::listing::IndexParser;
use autoindex_viewer::transport::{HttpTransport, NetworkError};
use std::io::{Read as _, Write as _};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

// ===========================================================================
// Minimal HTTP server over fixtures/
// ===========================================================================

struct TestServer {
    port: u16,
    _stop: std::sync::mpsc::Sender<()>,
}

impl TestServer {
    fn start(root: PathBuf) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = std::sync::mpsc::channel::<()>();

        thread::spawn(move || {
            listener.set_nonblocking(true).unwrap();
            loop {
                if rx.try_recv().is_ok() {
                    break;
                }
                match listener.accept() {
                    Ok((stream, _)) => {
                        let root = root.clone();
                        thread::spawn(move || serve_request(stream, &root));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Self { port, _stop: tx }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }
}

fn serve_request(mut stream: std::net::TcpStream, root: &std::path::Path) {
    // Accepted sockets may inherit non-blocking mode from the listener.
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 4096];
    let n = match stream.read(&mut buf) {
        Ok(n) if n > 0 => n,
        _ => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request.split_whitespace().nth(1).unwrap_or("/");
    let path = path.split('?').next().unwrap_or("/");
    let rel = path.trim_start_matches('/');
    let file_path = if rel.is_empty() || rel.ends_with('/') {
        root.join(rel).join("index.html")
    } else {
        root.join(rel)
    };

    let (status, body) = if file_path.is_file() && !rel.contains("..") {
        ("200 OK", std::fs::read(&file_path).unwrap_or_default())
    } else {
        ("404 Not Found", b"Not Found".to_vec())
    };

    let header = format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&body);
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn start_server() -> TestServer {
    TestServer::start(fixtures_dir())
}

fn controller() -> GalleryController<HttpTransport> {
    let transport = HttpTransport::new(&TransportConfig::default()).unwrap();
    GalleryController::new(transport, IndexParser::default())
}

fn shown(c: &GalleryController<HttpTransport>) -> Option<String> {
    c.view().and_then(|v| v.displayed_filename)
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn flat_listing_navigates_between_images() {
    let server = start_server();
    let mut c = controller();

    assert_eq!(c.submit(&server.url("/mock-images/"), false), LoadOutcome::Loaded);
    assert_eq!(shown(&c).as_deref(), Some("image1.jpg"));
    assert_eq!(
        c.view().unwrap().displayed_url,
        Some(server.url("/mock-images/image1.jpg"))
    );

    assert_eq!(c.request_next_image(), NavOutcome::Moved);
    let view = c.view().unwrap();
    assert_eq!(view.displayed_filename.as_deref(), Some("image2.png"));
    assert!(!view.has_next_image);
    assert!(view.has_prev_image);
}

#[test]
fn listing_without_images_reports_empty() {
    let server = start_server();
    let mut c = controller();
    assert_eq!(
        c.submit(&server.url("/mock-no-images/"), false),
        LoadOutcome::EmptyNoImages
    );
}

#[test]
fn missing_listing_reports_fetch_error() {
    let server = start_server();
    let mut c = controller();
    let outcome = c.submit(&server.url("/unreachable-url/"), false);
    assert!(matches!(
        outcome,
        LoadOutcome::FetchError(NetworkError::Status { status: 404, .. })
    ));
    assert!(outcome.message().unwrap().starts_with("Error loading images"));
}

#[test]
fn subdirectories_are_galleries() {
    let server = start_server();
    let mut c = controller();

    assert_eq!(c.submit(&server.url("/nested/"), true), LoadOutcome::Loaded);
    let state = c.state().unwrap();
    assert_eq!(state.subdirectories(), ["subdir1", "subdir2"]);
    assert_eq!(shown(&c).as_deref(), Some("s1-a.jpg"));
    assert_eq!(
        c.view().unwrap().displayed_url,
        Some(server.url("/nested/subdir1/s1-a.jpg"))
    );

    assert_eq!(c.request_next_subdir(), NavOutcome::Load(LoadOutcome::Loaded));
    assert_eq!(shown(&c).as_deref(), Some("s2-a.jpg"));

    assert_eq!(c.request_prev_subdir(), NavOutcome::Load(LoadOutcome::Loaded));
    assert_eq!(shown(&c).as_deref(), Some("s1-a.jpg"));
}

#[test]
fn seek_subdirectory_by_name() {
    let server = start_server();
    let mut c = controller();
    c.submit(&server.url("/nested/"), true);

    assert_eq!(
        c.request_seek_subdir("subdir2"),
        NavOutcome::Load(LoadOutcome::Loaded)
    );
    let view = c.view().unwrap();
    assert_eq!(view.displayed_subdir_name.as_deref(), Some("subdir2"));
    assert_eq!(view.displayed_filename.as_deref(), Some("s2-a.jpg"));
    assert_eq!(view.subdir_position, Some((2, 2)));
}

#[test]
fn flat_mode_ignores_subdirectories() {
    let server = start_server();
    let mut c = controller();
    assert_eq!(c.submit(&server.url("/nested"), false), LoadOutcome::Loaded);
    assert_eq!(c.state().unwrap().current_images(), ["top.jpg"]);
    assert!(c.state().unwrap().subdirectories().is_empty());
}

#[test]
fn encoded_names_are_decoded_and_re_encoded() {
    let server = start_server();
    let mut c = controller();
    assert_eq!(c.submit(&server.url("/encoded/"), false), LoadOutcome::Loaded);
    assert_eq!(
        c.state().unwrap().current_images(),
        ["sunset beach.JPG", "café.webp"]
    );
    assert_eq!(
        c.view().unwrap().displayed_url,
        Some(server.url("/encoded/sunset%20beach.JPG"))
    );
}

// ===========================================================================
// Binary
// ===========================================================================

fn viewer() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_autoindex-viewer"));
    cmd.current_dir(fixtures_dir());
    cmd
}

#[test]
fn list_prints_listing_as_json() {
    let server = start_server();
    let out = viewer()
        .args(["list", &server.url("/nested/"), "--subdirs", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let listing: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(listing["images"], serde_json::json!(["top.jpg"]));
    assert_eq!(
        listing["subdirectories"],
        serde_json::json!(["subdir1", "subdir2"])
    );
}

#[test]
fn list_honours_config_file() {
    let server = start_server();
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("viewer.toml");
    std::fs::write(&config, "[parser]\nimage_extensions = [\"png\"]\n").unwrap();

    let out = viewer()
        .args(["list", &server.url("/mock-images/"), "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let listing: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(listing["images"], serde_json::json!(["image2.png"]));
}

#[test]
fn browse_reads_commands_from_stdin() {
    let server = start_server();
    let mut child = viewer()
        .args(["browse", &server.url("/mock-images/"), "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"n\nbogus\n?\nn\nq\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());

    // Every line is a JSON report, including unknown commands and help.
    let reports: Vec<serde_json::Value> = String::from_utf8(out.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), 5);
    assert_eq!(reports[0]["view"]["displayed_filename"], "image1.jpg");
    assert_eq!(reports[1]["view"]["displayed_filename"], "image2.png");
    assert_eq!(reports[1]["view"]["has_next_image"], false);
    assert_eq!(reports[2]["feedback"], "Unknown command: bogus");
    assert_eq!(reports[2]["view"]["displayed_filename"], "image2.png");
    assert!(reports[3]["feedback"].as_str().unwrap().starts_with("Commands:"));
    assert_eq!(reports[4]["view"]["displayed_filename"], "image2.png");
    assert!(reports[4]["feedback"].is_string());
}

#[test]
fn list_uses_subdirectory_default_from_config() {
    let server = start_server();
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("viewer.toml");
    std::fs::write(&config, "[viewer]\nsubdirs = true\n").unwrap();

    let out = viewer()
        .args(["list", &server.url("/nested/"), "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let listing: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(
        listing["subdirectories"],
        serde_json::json!(["subdir1", "subdir2"])
    );
}
