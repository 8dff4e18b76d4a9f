/*
 * sequence.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Integration tests for the sequence producer, driven over a scripted
 * in-memory transport. Each `notified()` replays the next planned state
 * change, so ordering, cancellation, and terminal behavior are exercised
 * deterministically without a network.
 */

use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};

use rivolo_core::{
    connect_with, read_body_with, read_head_with, read_headers_with, Event, HeaderValue, NotReady,
    ReadyState, Reducible, Reduction, Request, TransferError, Transport,
};

/// One planned state change.
enum Step {
    /// A notification with nothing new to observe.
    Nothing,
    /// The raw header block becomes readable.
    Headers(&'static str),
    /// The cumulative response text grows.
    Append(&'static str),
    /// Transfer completes successfully.
    Done,
    /// Transfer completes with a transport error.
    Fail(&'static str),
}

/// Everything the transport was asked to do, shared with the test body.
#[derive(Default)]
struct Probe {
    opens: Vec<(String, String, Option<String>, Option<String>)>,
    headers_set: Vec<(String, String)>,
    sent: Option<String>,
    with_credentials: bool,
    aborts: usize,
}

struct Scripted {
    script: VecDeque<Step>,
    status: u16,
    raw: Option<String>,
    text: String,
    text_readable: bool,
    ready: ReadyState,
    error: Option<TransferError>,
    probe: Arc<Mutex<Probe>>,
}

impl Scripted {
    fn new(script: Vec<Step>) -> (Self, Arc<Mutex<Probe>>) {
        let probe = Arc::new(Mutex::new(Probe::default()));
        (
            Self {
                script: script.into(),
                status: 200,
                raw: None,
                text: String::new(),
                text_readable: false,
                ready: ReadyState::Unsent,
                error: None,
                probe: probe.clone(),
            },
            probe,
        )
    }

    fn apply_next(&mut self) {
        match self.script.pop_front() {
            Some(Step::Nothing) => {}
            Some(Step::Headers(raw)) => {
                self.raw = Some(raw.to_string());
                self.text_readable = true;
                self.ready = ReadyState::HeadersReceived;
            }
            Some(Step::Append(fragment)) => {
                self.text.push_str(fragment);
                self.ready = ReadyState::Loading;
            }
            Some(Step::Done) => self.ready = ReadyState::Done,
            Some(Step::Fail(message)) => {
                self.error = Some(TransferError::new(message));
                self.ready = ReadyState::Done;
            }
            // exhausted scripts finish the transfer so no test can hang
            None => self.ready = ReadyState::Done,
        }
    }
}

impl Transport for Scripted {
    fn open(
        &mut self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        password: Option<&str>,
    ) -> io::Result<()> {
        self.probe.lock().unwrap().opens.push((
            method.to_string(),
            uri.to_string(),
            user.map(str::to_string),
            password.map(str::to_string),
        ));
        self.ready = ReadyState::Opened;
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) {
        self.probe
            .lock()
            .unwrap()
            .headers_set
            .push((name.to_string(), value.to_string()));
    }

    fn set_with_credentials(&mut self, with_credentials: bool) {
        self.probe.lock().unwrap().with_credentials = with_credentials;
    }

    fn send(&mut self, body: &str) -> io::Result<()> {
        self.probe.lock().unwrap().sent = Some(body.to_string());
        Ok(())
    }

    fn abort(&mut self) {
        self.probe.lock().unwrap().aborts += 1;
        self.ready = ReadyState::Done;
    }

    fn notified(&mut self) -> impl Future<Output = ()> {
        self.apply_next();
        std::future::ready(())
    }

    fn ready_state(&self) -> ReadyState {
        self.ready
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn raw_headers(&self) -> Result<String, NotReady> {
        self.raw.clone().ok_or(NotReady)
    }

    fn response_text(&self) -> Result<&str, NotReady> {
        if self.text_readable {
            Ok(&self.text)
        } else {
            Err(NotReady)
        }
    }

    fn take_error(&mut self) -> Option<TransferError> {
        self.error.take()
    }
}

fn collect(state: Vec<Event>, event: Event) -> Reduction<Vec<Event>> {
    let mut state = state;
    state.push(event);
    Reduction::Continue(state)
}

#[tokio::test]
async fn head_then_chunks_then_success_terminal() {
    let (transport, _) = Scripted::new(vec![
        Step::Nothing,
        Step::Headers("content-type: text/plain\r\n"),
        Step::Append("hel"),
        Step::Append("lo"),
        Step::Done,
    ]);

    let events = connect_with("http://localhost:8082/get", transport)
        .reduce(Vec::new(), collect)
        .await
        .unwrap();

    assert_eq!(events.len(), 3);
    assert!(events[0].is_head());
    let body: String = events
        .iter()
        .skip(1)
        .filter_map(|e| e.clone().into_chunk())
        .collect();
    assert_eq!(body, "hello");
}

#[tokio::test]
async fn repeated_response_header_becomes_a_list() {
    let (transport, _) = Scripted::new(vec![
        Step::Headers("bling: blong\r\nbling: blong\r\nfoo: bar\r\n"),
        Step::Done,
    ]);

    let events = connect_with("http://localhost:8082/head", transport)
        .reduce(Vec::new(), collect)
        .await
        .unwrap();

    let head = events[0].clone().into_head().unwrap();
    assert_eq!(head.status_code, 200);
    assert_eq!(
        head.headers.get("bling"),
        Some(&HeaderValue::Multiple(vec![
            "blong".to_string(),
            "blong".to_string()
        ]))
    );
    assert_eq!(
        head.headers.get("foo"),
        Some(&HeaderValue::Single("bar".to_string()))
    );
}

#[tokio::test]
async fn transport_failure_is_the_terminal_value() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (transport, _) = Scripted::new(vec![
        Step::Headers(""),
        Step::Append("partial"),
        Step::Fail("connection reset"),
    ]);

    let recorder = seen.clone();
    let outcome = connect_with("http://localhost:8082/get", transport)
        .reduce((), move |_, event| {
            recorder.lock().unwrap().push(event);
            Reduction::Continue(())
        })
        .await;

    assert_eq!(outcome, Err(TransferError::new("connection reset")));
    // events before the failure were still delivered, in order
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].is_head());
    assert_eq!(seen[1], Event::Chunk("partial".to_string()));
}

#[tokio::test]
async fn failure_before_headers_yields_no_events() {
    let (transport, _) = Scripted::new(vec![Step::Nothing, Step::Fail("refused")]);

    let outcome = connect_with("http://localhost:8082/get", transport)
        .reduce(Vec::new(), collect)
        .await;

    assert_eq!(outcome, Err(TransferError::new("refused")));
}

#[tokio::test]
async fn cancelling_after_the_head_aborts_once_and_ends_cleanly() {
    let (transport, probe) = Scripted::new(vec![
        Step::Headers("foo: bar\r\n"),
        Step::Append("never delivered"),
        Step::Done,
    ]);

    let chunks_seen = Arc::new(Mutex::new(0usize));
    let counter = chunks_seen.clone();
    let outcome = connect_with("http://localhost:8082/get", transport)
        .reduce((), move |_, event| {
            if let Event::Chunk(_) = event {
                *counter.lock().unwrap() += 1;
            }
            Reduction::Reduced(())
        })
        .await;

    assert_eq!(outcome, Ok(()));
    assert_eq!(*chunks_seen.lock().unwrap(), 0);
    assert_eq!(probe.lock().unwrap().aborts, 1);
}

#[tokio::test]
async fn read_head_sees_only_the_first_event() {
    let (transport, probe) = Scripted::new(vec![
        Step::Headers("foo: bar\r\n"),
        Step::Append("body"),
        Step::Done,
    ]);

    let events = read_head_with("http://localhost:8082/head", transport)
        .reduce(Vec::new(), collect)
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert!(events[0].is_head());
    assert_eq!(probe.lock().unwrap().aborts, 1);
}

#[tokio::test]
async fn read_headers_narrows_to_the_header_map() {
    let (transport, _) = Scripted::new(vec![
        Step::Headers("foo: bar\r\ncontent-type: text/plain\r\n"),
        Step::Done,
    ]);

    let maps = read_headers_with("http://localhost:8082/head", transport)
        .reduce(Vec::new(), |mut acc: Vec<_>, headers| {
            acc.push(headers);
            Reduction::Continue(acc)
        })
        .await
        .unwrap();

    assert_eq!(maps.len(), 1);
    assert_eq!(
        maps[0].get("foo"),
        Some(&HeaderValue::Single("bar".to_string()))
    );
}

#[tokio::test]
async fn read_body_skips_the_head() {
    let (transport, _) = Scripted::new(vec![
        Step::Headers("content-type: text/plain\r\n"),
        Step::Append("boop"),
        Step::Done,
    ]);

    let body = read_body_with("http://localhost:8082/get", transport)
        .reduce(String::new(), |mut acc, chunk| {
            acc.push_str(&chunk);
            Reduction::Continue(acc)
        })
        .await
        .unwrap();

    assert_eq!(body, "boop");
}

#[tokio::test]
async fn post_echo_delivers_a_single_chunk() {
    let (transport, probe) = Scripted::new(vec![
        Step::Headers("content-type: text/plain\r\n"),
        Step::Append("101"),
        Step::Done,
    ]);

    let mut request = Request::with_uri("http://localhost:8082/post");
    request.method("post").body("100");

    let chunks = read_body_with(request, transport)
        .reduce(Vec::new(), |mut acc: Vec<String>, chunk| {
            acc.push(chunk);
            Reduction::Continue(acc)
        })
        .await
        .unwrap();

    assert_eq!(chunks, vec!["101".to_string()]);
    let probe = probe.lock().unwrap();
    assert_eq!(probe.sent.as_deref(), Some("100"));
    assert_eq!(probe.opens[0].0, "POST");
}

#[tokio::test]
async fn streamed_json_chunks_arrive_in_order() {
    let (transport, _) = Scripted::new(vec![
        Step::Headers("content-type: application/json\r\n"),
        Step::Append("{\"index\":1,\"data\":\"hello\"}"),
        Step::Nothing,
        Step::Append("{\"index\":2,\"data\":\"world\"}"),
        Step::Append("{\"index\":3,\"data\":\"bye\"}"),
        Step::Done,
    ]);

    let values = read_body_with("http://localhost:8082/stream", transport)
        .reduce(Vec::new(), |mut acc: Vec<serde_json::Value>, chunk| {
            acc.push(serde_json::from_str(&chunk).unwrap());
            Reduction::Continue(acc)
        })
        .await
        .unwrap();

    assert_eq!(values.len(), 3);
    assert_eq!(values[0]["index"], 1);
    assert_eq!(values[0]["data"], "hello");
    assert_eq!(values[1]["data"], "world");
    assert_eq!(values[2]["data"], "bye");
}

#[tokio::test]
async fn denylisted_request_headers_never_reach_the_transport() {
    let (transport, probe) = Scripted::new(vec![Step::Headers(""), Step::Done]);

    let mut request = Request::with_uri("http://localhost:8082/head");
    request
        .header("bling", "blong")
        .header("cookie", "secret=1")
        .header("Host", "evil.example")
        .header_values("x-tag", vec!["a".to_string(), "b".to_string()]);

    connect_with(request, transport)
        .reduce(Vec::new(), collect)
        .await
        .unwrap();

    let probe = probe.lock().unwrap();
    let names: Vec<&str> = probe.headers_set.iter().map(|(n, _)| n.as_str()).collect();
    assert!(names.contains(&"bling"));
    assert!(!names.iter().any(|n| n.eq_ignore_ascii_case("cookie")));
    assert!(!names.iter().any(|n| n.eq_ignore_ascii_case("host")));
    // list values are applied as repeated entries in order
    let tags: Vec<&str> = probe
        .headers_set
        .iter()
        .filter(|(n, _)| n == "x-tag")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(tags, vec!["a", "b"]);
}

#[tokio::test]
async fn credentials_are_presented_at_open_time() {
    let (transport, probe) = Scripted::new(vec![Step::Headers(""), Step::Done]);

    let mut request = Request::with_uri("http://localhost:8082/private");
    request.credentials("user", "pass");

    connect_with(request, transport)
        .reduce(Vec::new(), collect)
        .await
        .unwrap();

    let probe = probe.lock().unwrap();
    assert_eq!(probe.opens[0].2.as_deref(), Some("user"));
    assert_eq!(probe.opens[0].3.as_deref(), Some("pass"));
    assert!(probe.with_credentials);
}

#[tokio::test]
async fn the_sequence_is_lazy_until_reduced() {
    let (transport, probe) = Scripted::new(vec![Step::Headers(""), Step::Done]);

    let response = connect_with("http://localhost:8082/get", transport);
    assert!(probe.lock().unwrap().opens.is_empty());
    assert!(probe.lock().unwrap().sent.is_none());

    response.reduce(Vec::new(), collect).await.unwrap();
    let probe = probe.lock().unwrap();
    assert_eq!(probe.opens.len(), 1);
    assert_eq!(probe.sent.as_deref(), Some(""));
}
