// Minimal HTTP stub standing in for the GitHub API during end-to-end tests.
// One connection per request (Connection: close); routing is left to the
// handler closure, which sees the percent-decoded request target.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

pub struct StubResponse {
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: String,
}

pub fn json(status: u16, body: serde_json::Value) -> StubResponse {
  StubResponse {
    status,
    headers: vec![],
    body: body.to_string(),
  }
}

pub fn spawn_github_stub<F>(handler: F) -> SocketAddr
where
  F: Fn(&str) -> StubResponse + Send + 'static,
{
  let listener = TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = listener.local_addr().unwrap();

  thread::spawn(move || {
    for stream in listener.incoming() {
      let Ok(mut stream) = stream else { continue };
      serve_one(&mut stream, &handler);
    }
  });

  addr
}

fn serve_one<F>(stream: &mut TcpStream, handler: &F)
where
  F: Fn(&str) -> StubResponse,
{
  let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
  let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

  let mut buf = [0u8; 8192];
  let n = stream.read(&mut buf).unwrap_or(0);
  let request = String::from_utf8_lossy(&buf[..n]).into_owned();

  let target = request
    .lines()
    .next()
    .and_then(|line| line.split_whitespace().nth(1))
    .unwrap_or("/")
    .to_string();

  let resp = handler(&percent_decode(&target));

  let mut head = format!(
    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
    resp.status,
    reason(resp.status),
    resp.body.len()
  );
  for (k, v) in &resp.headers {
    head.push_str(&format!("{}: {}\r\n", k, v));
  }

  let _ = stream.write_all(format!("{}\r\n{}", head, resp.body).as_bytes());
}

fn reason(status: u16) -> &'static str {
  match status {
    200 => "OK",
    403 => "Forbidden",
    404 => "Not Found",
    429 => "Too Many Requests",
    _ => "Stub",
  }
}

// Decoded after splitting on delimiters server-side is unnecessary here: the
// canned queries never carry encoded '&' or '='.
fn percent_decode(s: &str) -> String {
  let bytes = s.as_bytes();
  let mut out = Vec::with_capacity(bytes.len());
  let mut i = 0;

  while i < bytes.len() {
    if bytes[i] == b'%' && i + 2 < bytes.len() {
      if let Ok(b) = u8::from_str_radix(&s[i + 1..i + 3], 16) {
        out.push(b);
        i += 3;
        continue;
      }
    }
    out.push(bytes[i]);
    i += 1;
  }

  String::from_utf8_lossy(&out).into_owned()
}

#[allow(dead_code)]
pub fn query_param(target: &str, key: &str) -> Option<String> {
  let (_, query) = target.split_once('?')?;

  query
    .split('&')
    .filter_map(|pair| pair.split_once('='))
    .find(|(k, _)| *k == key)
    .map(|(_, v)| v.to_string())
}
