//! Drives the production transports against a loopback HTTP server.

mod stub_server;

use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use rusty_s3::Credentials;
use stub_server::{Reply, StubServer};
use unjar::Locator;
use unjar::config::TransferConfig;
use unjar::transport::{
    HttpTransport, ObjectStoreTransport, Transport, TransportError, Transports,
};

const USER_AGENT: &str = "unjar-tests";

struct Scratch {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Scratch {
    fn upload(&self, contents: &str) -> Utf8PathBuf {
        let path = self.root.join("upload.zip");
        fs::write(&path, contents).expect("write upload");
        path
    }
}

#[fixture]
fn scratch() -> Scratch {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir");
    Scratch { _dir: dir, root }
}

fn agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(5)))
        .build();
    ureq::Agent::new_with_config(config)
}

fn http() -> HttpTransport {
    HttpTransport::new(agent(), USER_AGENT.to_owned())
}

fn object_store(server: &StubServer) -> ObjectStoreTransport {
    ObjectStoreTransport::new(agent(), USER_AGENT.to_owned(), server.base())
        .expect("loopback endpoint is valid")
}

fn locator(text: &str) -> Locator {
    Locator::parse(text).expect("locator parses")
}

#[rstest]
fn http_fetch_streams_the_body_into_dest(scratch: Scratch) {
    let server = StubServer::start(vec![Reply::Body(b"archive bytes".to_vec())]);
    let dest = scratch.root.join("site.zip");

    http()
        .fetch(&locator(&server.url("/dist/site.zip")), &dest)
        .expect("fetch succeeds");

    assert_eq!(fs::read(&dest).expect("read download"), b"archive bytes");
    let request = server.single_request();
    assert_eq!(request.method, "GET");
    assert_eq!(request.target, "/dist/site.zip");
    assert_eq!(request.header("user-agent"), Some(USER_AGENT));
}

#[rstest]
fn http_fetch_maps_404_to_not_found(scratch: Scratch) {
    let server = StubServer::start(vec![Reply::Status(404)]);
    let dest = scratch.root.join("missing.zip");
    let source = server.url("/dist/missing.zip");

    let err = http()
        .fetch(&locator(&source), &dest)
        .expect_err("404 is an error");

    assert!(
        matches!(&err, TransportError::NotFound { url } if *url == source),
        "{err:?}"
    );
    assert!(!dest.exists());
}

#[rstest]
fn truncated_download_leaves_no_partial_file(scratch: Scratch) {
    let server = StubServer::start(vec![Reply::Truncated {
        declared: 4096,
        body: b"only the start".to_vec(),
    }]);
    let dest = scratch.root.join("site.zip");

    http()
        .fetch(&locator(&server.url("/dist/site.zip")), &dest)
        .expect_err("short body is an error");

    assert!(!dest.exists(), "partial download removed");
}

#[rstest]
fn http_push_posts_a_sized_binary_body(scratch: Scratch) {
    let server = StubServer::start(vec![Reply::Status(201)]);
    let source = scratch.upload("packed archive");

    http()
        .push(&source, &locator(&server.url("/upload/site.zip")))
        .expect("upload succeeds");

    let request = server.single_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/upload/site.zip");
    assert_eq!(request.header("content-type"), Some("application/binary"));
    assert_eq!(request.header("content-length"), Some("14"));
    assert_eq!(request.body, b"packed archive");
}

#[rstest]
fn http_push_reports_server_errors(scratch: Scratch) {
    let server = StubServer::start(vec![Reply::Status(500)]);
    let source = scratch.upload("packed archive");

    let err = http()
        .push(&source, &locator(&server.url("/upload/site.zip")))
        .expect_err("500 is an error");

    assert!(
        matches!(&err, TransportError::Http { reason, .. } if reason.contains("500")),
        "{err:?}"
    );
}

#[rstest]
fn object_store_push_puts_path_style(scratch: Scratch) {
    let server = StubServer::start(vec![Reply::Status(200)]);
    let source = scratch.upload("packed archive");

    object_store(&server)
        .push(&source, &locator("s3://bucket/releases/v1/site.zip"))
        .expect("upload succeeds");

    let request = server.single_request();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.target, "/bucket/releases/v1/site.zip");
    assert_eq!(request.header("content-length"), Some("14"));
    assert_eq!(request.header("transfer-encoding"), None);
    assert_eq!(request.body, b"packed archive");
}

#[rstest]
fn object_store_fetch_maps_404_to_not_found(scratch: Scratch) {
    let server = StubServer::start(vec![Reply::Status(404)]);
    let dest = scratch.root.join("site.zip");

    let err = object_store(&server)
        .fetch(&locator("s3://bucket/site.zip"), &dest)
        .expect_err("404 is an error");

    assert!(
        matches!(&err, TransportError::NotFound { url } if url.ends_with("/bucket/site.zip")),
        "{err:?}"
    );
    assert!(!dest.exists());
}

#[rstest]
fn signed_requests_carry_a_signature_that_errors_do_not(scratch: Scratch) {
    let server = StubServer::start(vec![Reply::Body(b"object".to_vec()), Reply::Status(403)]);
    let transport = object_store(&server)
        .with_credentials(Credentials::new("AKIDEXAMPLE", "secret"), "eu-west-1");
    let dest = scratch.root.join("site.zip");

    transport
        .fetch(&locator("s3://bucket/site.zip"), &dest)
        .expect("signed fetch succeeds");
    let err = transport
        .push(&scratch.upload("x"), &locator("s3://bucket/site.zip"))
        .expect_err("403 is an error");

    assert_eq!(fs::read(&dest).expect("read download"), b"object");
    let requests = server.requests();
    let [get, put] = requests.as_slice() else {
        panic!("expected two requests, got {requests:?}");
    };
    for (request, method) in [(get, "GET"), (put, "PUT")] {
        assert_eq!(request.method, method);
        assert_eq!(request.path(), "/bucket/site.zip");
        let query = request.query().expect("presigned query");
        assert!(query.contains("X-Amz-Signature="), "{query}");
    }
    assert!(!err.to_string().contains("X-Amz-Signature"), "{err}");
}

#[rstest]
fn router_sends_object_store_locators_to_the_configured_endpoint(scratch: Scratch) {
    let server = StubServer::start(vec![Reply::Body(b"object".to_vec())]);
    let mut config = TransferConfig::default();
    config.object_store.endpoint = server.base().to_owned();
    config.http.user_agent = USER_AGENT.to_owned();
    let transports = Transports::with_credentials(&config, None).expect("valid config");
    let dest = scratch.root.join("bundle.zip");

    transports
        .fetch(&locator("s3://releases/app/bundle.zip"), &dest)
        .expect("routed fetch succeeds");

    let request = server.single_request();
    assert_eq!(request.target, "/releases/app/bundle.zip");
    assert_eq!(request.header("user-agent"), Some(USER_AGENT));
    assert_eq!(fs::read(&dest).expect("read download"), b"object");
}

#[test]
fn router_rejects_an_unusable_configuration() {
    let mut config = TransferConfig::default();
    config.object_store.endpoint = "ftp://mirror.example.test".to_owned();

    let err = Transports::with_credentials(&config, None).expect_err("ftp endpoint");

    assert!(matches!(err, TransportError::Config(_)), "{err:?}");
}
