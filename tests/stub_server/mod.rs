//! Minimal HTTP/1.1 server for driving the real transports in tests.
//!
//! Each scripted [`Reply`] answers one connection, in order. Requests are
//! recorded before the reply is written, so once a client call returns its
//! request is visible through [`StubServer::requests`].

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A scripted response.
pub enum Reply {
    /// `200 OK` with the given body.
    Body(Vec<u8>),
    /// An empty response with the given status code.
    Status(u16),
    /// A `200 OK` that declares `declared` bytes, sends `body`, and hangs up.
    Truncated {
        /// The advertised `Content-Length`.
        declared: usize,
        /// The bytes actually sent.
        body: Vec<u8>,
    },
}

/// A request as the server saw it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the request path without its query.
    pub fn path(&self) -> &str {
        self.target.split_once('?').map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Returns the query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }
}

/// A server answering a fixed script of replies on a loopback port.
pub struct StubServer {
    base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    /// Binds a loopback port and serves `replies` in a background thread.
    pub fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for reply in replies {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                if serve(stream, &reply, &recorded).is_err() {
                    return;
                }
            }
        });
        Self { base, requests }
    }

    /// Returns the server's base URL, without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns an absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Returns the requests received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Returns the only request received, failing otherwise.
    pub fn single_request(&self) -> Recorded {
        let requests = self.requests();
        let [request] = requests.as_slice() else {
            panic!("expected one request, got {requests:?}");
        };
        request.clone()
    }
}

fn serve(stream: TcpStream, reply: &Reply, recorded: &Mutex<Vec<Recorded>>) -> io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let request = read_request(&mut reader)?;
    recorded.lock().expect("requests lock").push(request);

    let mut stream = stream;
    match reply {
        Reply::Body(body) => {
            write_head(&mut stream, "200 OK", body.len())?;
            stream.write_all(body)?;
        }
        Reply::Status(code) => write_head(&mut stream, &format!("{code} Stub"), 0)?,
        Reply::Truncated { declared, body } => {
            write_head(&mut stream, "200 OK", *declared)?;
            stream.write_all(body)?;
        }
    }
    stream.flush()?;
    stream.shutdown(Shutdown::Both)
}

fn write_head(stream: &mut TcpStream, status: &str, len: usize) -> io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {status}\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n"
    )
}

fn read_request(reader: &mut impl BufRead) -> io::Result<Recorded> {
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default().to_owned();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_owned(), value.trim().to_owned()));
        }
    }

    let mut request = Recorded {
        method,
        target,
        headers,
        body: Vec::new(),
    };
    if let Some(len) = request.header("content-length").and_then(|v| v.parse().ok()) {
        let mut body = vec![0; len];
        reader.read_exact(&mut body)?;
        request.body = body;
    } else if request
        .header("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
    {
        request.body = read_chunked(reader)?;
    }
    Ok(request)
}

fn read_chunked(reader: &mut impl BufRead) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line)?;
        let digits = size_line.trim().split(';').next().unwrap_or_default();
        let size = usize::from_str_radix(digits, 16)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let mut chunk = vec![0; size + 2];
        reader.read_exact(&mut chunk)?;
        if size == 0 {
            return Ok(body);
        }
        chunk.truncate(size);
        body.extend_from_slice(&chunk);
    }
}
