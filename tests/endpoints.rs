use hgql_bench::bench::{Endpoint, EndpointError, NativeEndpoint, QueryPair, RunOptions, Runner, SparqlEndpoint};
use hgql_bench::query::{Dialect, Shape, render};
use pretty_assertions::assert_eq;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// Request line, lower case headers and body of a received request.
#[derive(Debug)]
struct Request {
    line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// Answer `count` requests with the given status and body, one connection each.
fn serve(count: usize, status: u16, body: &'static str) -> (String, Receiver<Request>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for stream in listener.incoming().take(count) {
            let mut stream = stream.unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let mut headers = Vec::new();
            loop {
                let mut h = String::new();
                reader.read_line(&mut h).unwrap();
                let h = h.trim_end();
                if h.is_empty() {
                    break;
                }
                let (k, v) = h.split_once(':').unwrap();
                headers.push((k.trim().to_ascii_lowercase(), v.trim().to_owned()));
            }
            let len = headers.iter().find(|(k, _)| k == "content-length").map_or(0, |(_, v)| v.parse().unwrap());
            let mut buf = vec![0; len];
            reader.read_exact(&mut buf).unwrap();
            tx.send(Request { line: line.trim_end().to_owned(), headers, body: String::from_utf8(buf).unwrap() })
                .unwrap();
            write!(
                stream,
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        }
    });
    (format!("http://{addr}"), rx)
}

const TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn native_post() {
    let (base, rx) = serve(1, 200, r#"{"data":{"ex_Person":[]}}"#);
    let endpoint = NativeEndpoint::new(&format!("{base}/graphql"), TIMEOUT).unwrap();
    let query = render(Dialect::Hgql2, Shape::Nested, 2);
    assert_eq!(endpoint.execute(&query).unwrap(), 25);

    let req = rx.recv().unwrap();
    assert_eq!(req.line, "POST /graphql HTTP/1.1");
    assert_eq!(req.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(body, serde_json::json!({ "query": query, "variables": {} }));
}

#[test]
fn sparql_get() {
    let (base, rx) = serve(1, 200, r#"{"head":{"vars":[]},"results":{"bindings":[]}}"#);
    let params = vec![("format".to_owned(), "application/sparql-results+json".to_owned())];
    let endpoint = SparqlEndpoint::new(&format!("{base}/dataset/sparql"), TIMEOUT, params).unwrap();
    let query = render(Dialect::Sparql, Shape::Nested, 1);
    assert!(endpoint.execute(&query).unwrap() > 0);

    let req = rx.recv().unwrap();
    let target = req.line.strip_prefix("GET ").unwrap().strip_suffix(" HTTP/1.1").unwrap();
    let url = url::Url::parse(&format!("{base}{target}")).unwrap();
    assert_eq!(url.path(), "/dataset/sparql");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("query".to_owned(), query),
            ("format".to_owned(), "application/sparql-results+json".to_owned())
        ]
    );
    assert_eq!(req.header("accept"), Some("application/sparql-results+json"));
    assert!(req.body.is_empty());
}

#[test]
fn error_status() {
    let (base, _rx) = serve(1, 500, "Query timeout");
    let endpoint = NativeEndpoint::new(&base, TIMEOUT).unwrap();
    match endpoint.execute("{ ex_Person { _id } }") {
        Err(EndpointError::Status { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Query timeout");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn refused() {
    // bind and drop to get a port nobody listens on
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let endpoint = SparqlEndpoint::new(&format!("http://{addr}/sparql"), TIMEOUT, Vec::new()).unwrap();
    assert!(matches!(endpoint.execute("ASK {}"), Err(EndpointError::Http { .. })));
}

#[test]
fn run_over_http() {
    let iterations = 3;
    let (sparql_base, sparql_rx) = serve(iterations, 200, "{}");
    let (native_base, native_rx) = serve(iterations, 200, r#"{"data":{}}"#);
    let runner = Runner::new(
        SparqlEndpoint::new(&sparql_base, TIMEOUT, Vec::new()).unwrap(),
        NativeEndpoint::new(&native_base, TIMEOUT).unwrap(),
        RunOptions { iterations, delay: Duration::from_millis(5) },
    );
    let pair = QueryPair::new("depth_1", "{ ex_Person { _id } }", "SELECT ?s WHERE { ?s ?p ?o }");
    let result = runner.run_pair(&pair).unwrap();
    assert_eq!(result.sparql.latencies.len(), iterations);
    assert_eq!(result.native.latencies.len(), iterations);
    assert_eq!(result.sparql.response_bytes, 2);
    assert_eq!(result.native.response_bytes, 11);
    assert!(result.difference >= 0.0);
    assert_eq!(sparql_rx.iter().take(iterations).count(), iterations);
    assert_eq!(native_rx.iter().take(iterations).count(), iterations);
}
