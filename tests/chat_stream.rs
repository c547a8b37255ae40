//! End-to-end tests of the chat session against a mock streaming endpoint.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use custodian::chat::{CONNECTION_ERROR, ChatSession, PRIZE_MESSAGE};
use custodian::editor::{Key, KeyOutcome, LineEditor};
use custodian::render::AnsiScreen;
use custodian::ChatClient;

fn delta(text: &str) -> String {
    let chunk = json!({"choices": [{"delta": {"content": text}}]});
    format!("data: {chunk}\n\n")
}

async fn serve_sse(body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;
    server
}

fn session_for(server: &MockServer) -> ChatSession<ChatClient> {
    let client = ChatClient::new(Some(server.uri())).unwrap();
    ChatSession::new(client)
}

#[tokio::test]
async fn streams_deltas_then_prompt() {
    let body = format!("{}{}data: [DONE]\n\n", delta("Hel"), delta("lo"));
    let server = serve_sse(body).await;
    let mut session = session_for(&server);
    let mut screen = AnsiScreen::new(Vec::new());

    let outcome = session.send("hi", &mut screen).await;

    assert!(outcome.is_ok());
    assert!(outcome.completed);
    assert_eq!(screen.contents(), "Hello\r\n> ");
    assert!(!session.is_busy());
}

#[tokio::test]
async fn request_carries_history_and_stream_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "messages": [{"role": "user", "content": "hello there"}],
            "stream": true
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("data: [DONE]\n\n", "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let mut session = session_for(&server);
    let mut screen = AnsiScreen::new(Vec::new());

    let outcome = session.send("hello there", &mut screen).await;
    assert!(outcome.is_ok());
    assert_eq!(screen.contents(), "\r\n> ");
}

#[tokio::test]
async fn later_requests_resend_user_history() {
    let server = serve_sse("data: [DONE]\n\n".to_string()).await;
    let mut session = session_for(&server);
    let mut screen = AnsiScreen::new(Vec::new());

    session.send("one", &mut screen).await;
    session.send("two", &mut screen).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(
        second["messages"],
        json!([
            {"role": "user", "content": "one"},
            {"role": "user", "content": "two"}
        ])
    );
}

#[tokio::test]
async fn access_granted_unlocks_prize() {
    let body = "data: ACCESS GRANTED: welcome, operator\n\ndata: [DONE]\n\n".to_string();
    let server = serve_sse(body).await;
    let mut session = session_for(&server);
    let mut screen = AnsiScreen::new(Vec::new());

    let outcome = session.send("let me in", &mut screen).await;

    assert!(outcome.access_granted);
    let expected = format!(
        "\r\n\x1b[1;32mACCESS GRANTED: welcome, operator\x1b[0m\r\n\r\n{}\r\n\r\n> ",
        PRIZE_MESSAGE
    );
    assert_eq!(screen.contents(), expected);
}

#[tokio::test]
async fn http_error_shows_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let mut session = session_for(&server);
    let mut screen = AnsiScreen::new(Vec::new());

    let outcome = session.send("hi", &mut screen).await;

    let err = outcome.error.expect("request should fail");
    assert!(err.is_api());
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(
        screen.contents(),
        format!("\x1b[1;31m{CONNECTION_ERROR}\x1b[0m\r\n> ")
    );
    assert!(!session.is_busy());
}

#[tokio::test]
async fn refused_connection_shows_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ChatClient::new(Some(format!("http://{addr}"))).unwrap();
    let mut session = ChatSession::new(client);
    let mut screen = AnsiScreen::new(Vec::new());

    let outcome = session.send("hi", &mut screen).await;

    assert!(outcome.error.expect("request should fail").is_transport());
    assert_eq!(screen.contents().matches(CONNECTION_ERROR).count(), 1);
    assert!(screen.contents().ends_with("\r\n> "));
    assert!(!session.is_busy());
}

#[tokio::test]
async fn typed_line_round_trips_through_editor() {
    let body = format!("{}data: [DONE]\n\n", delta("pong"));
    let server = serve_sse(body).await;
    let mut session = session_for(&server);
    let mut editor = LineEditor::new(session.lock());
    let mut screen = AnsiScreen::new(Vec::new());

    let keys = [
        Key::Char('p'),
        Key::Char('i'),
        Key::Char('x'),
        Key::Backspace,
        Key::Char('n'),
        Key::Char('g'),
    ];
    for key in keys {
        editor.handle_key(key, &mut screen);
    }
    let KeyOutcome::Submitted(line) = editor.handle_key(Key::Enter, &mut screen) else {
        panic!("enter should submit");
    };
    assert_eq!(line, "ping");
    screen.take();

    session.send(&line, &mut screen).await;
    assert_eq!(screen.contents(), "pong\r\n> ");
    assert_eq!(editor.handle_key(Key::Char('a'), &mut screen), KeyOutcome::Edited);
}

#[tokio::test]
async fn partial_trailing_block_is_dropped() {
    let body = format!("{}data: {{\"choices\":[{{\"delta\":{{\"content\":\"lost\"", delta("kept"));
    let server = serve_sse(body).await;
    let mut session = session_for(&server);
    let mut screen = AnsiScreen::new(Vec::new());

    let outcome = session.send("hi", &mut screen).await;

    assert!(outcome.is_ok());
    assert!(!outcome.completed);
    assert_eq!(screen.contents(), "kept\r\n> ");
}
