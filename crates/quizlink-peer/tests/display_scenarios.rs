//! End-to-end transactions between a `DisplayClient` and a display loop
//! over loopback TCP.

use std::io::Write;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use quizlink_frame::{FrameError, FrameReader, FrameWriter, Value};
use quizlink_peer::{
    call, run_loop, DisplayClient, DisplayListener, Headless, LoopConfig, LoopExit, PeerError,
    PlayingField, Request, Screen, ScreenHandler, Scoreboard, Status,
};
use quizlink_transport::TcpLink;

fn loop_config() -> LoopConfig {
    LoopConfig {
        poll_timeout: Duration::ZERO,
        frame_interval: Some(Duration::from_millis(2)),
        linger: Duration::from_millis(50),
    }
}

/// Start a display on a free port; the thread returns the loop exit and
/// the final screen.
fn spawn_display() -> (String, thread::JoinHandle<(LoopExit, ScreenHandler)>) {
    let listener = DisplayListener::bind("127.0.0.1:0").expect("display should bind");
    let addr = listener.local_addr().to_string();
    let handle = thread::spawn(move || {
        let mut session = listener.accept().expect("display should accept");
        let mut handler = ScreenHandler::new();
        let exit = run_loop(&mut session, &mut handler, &mut Headless, &loop_config())
            .expect("display loop should finish cleanly");
        (exit, handler)
    });
    (addr, handle)
}

#[test]
fn showintro_returns_ok() {
    let (addr, display) = spawn_display();
    let mut client = DisplayClient::new(addr);
    client.connect().expect("client should connect");

    assert_eq!(client.show_intro().expect("showintro"), Status::OK);
    assert_eq!(client.stop().expect("stop"), Status::OK);
    assert!(!client.is_connected());

    let (exit, handler) = display.join().expect("display thread should finish");
    assert_eq!(exit, LoopExit::Stopped);
    assert_eq!(handler.screen(), &Screen::Intro);
}

#[test]
fn showquestion_splits_lines_and_pads_countdown() {
    let (addr, display) = spawn_display();
    let mut client = DisplayClient::new(addr);
    client.connect().expect("client should connect");

    let status = client
        .show_question("Wie heißt die Hauptstadt#von Albanien?", 60)
        .expect("showquestion");
    assert_eq!(status, Status::OK);
    client.stop().expect("stop");

    let (_, handler) = display.join().expect("display thread should finish");
    assert_eq!(
        handler.screen(),
        &Screen::Question {
            lines: vec![
                "Wie heißt die Hauptstadt".to_string(),
                "von Albanien?".to_string()
            ],
            countdown: Some("060".to_string()),
        }
    );
}

#[test]
fn stop_ends_the_loop_and_closes_the_connection() {
    let (addr, display) = spawn_display();
    let stream = TcpLink::connect(addr.as_str()).expect("client should connect");
    let mut reader = FrameReader::new(stream.try_clone().expect("clone should succeed"));
    let mut writer = FrameWriter::new(stream);

    let response = call(
        &mut reader,
        &mut writer,
        &Request::new("stop", Vec::new()).into_value(),
    )
    .expect("stop call");
    assert_eq!(response, Value::result_code(0));

    let (exit, handler) = display.join().expect("display thread should finish");
    assert_eq!(exit, LoopExit::Stopped);
    assert!(quizlink_peer::RequestHandler::stop_requested(&handler));

    let err = reader.read_value().expect_err("connection should be closed");
    assert!(matches!(err, FrameError::ConnectionClosed | FrameError::Io(_)));
}

#[test]
fn structured_payloads_reach_the_screen() {
    let (addr, display) = spawn_display();
    let mut client = DisplayClient::new(addr);
    client.connect().expect("client should connect");

    let mut field = PlayingField::with_default_values(["Sport", "Film"]);
    field.answer("Film", 100, "Rot");
    assert_eq!(client.show_playing_field(&field).expect("field"), Status::OK);

    let scores = Scoreboard::new([("Rot", 100), ("Blau", 140)]);
    assert_eq!(client.show_result(&scores).expect("result"), Status::OK);
    client.stop().expect("stop");

    let (_, handler) = display.join().expect("display thread should finish");
    assert_eq!(
        handler.screen().lines(),
        vec!["ENDSTAND", "", "Team Blau: 140", "Team Rot: 100"]
    );
    assert_eq!(handler.revision(), 2);
}

#[test]
fn rejected_requests_keep_the_session() {
    let (addr, display) = spawn_display();
    let mut client = DisplayClient::new(addr);
    client.connect().expect("client should connect");

    assert_eq!(
        client.make_call("showfireworks", Vec::new()).expect("unknown"),
        Status::ERROR
    );
    assert_eq!(
        client
            .make_call("showresult", vec![Value::bytes(&b"\x80\x04}q\x00."[..])])
            .expect("pickle blob"),
        Status::ERROR
    );
    assert_eq!(
        client
            .call(&Value::from("showintro"))
            .expect("bare string request"),
        Value::result_code(42)
    );
    assert_eq!(client.show_thanks().expect("thanks"), Status::OK);
    client.stop().expect("stop");

    let (exit, handler) = display.join().expect("display thread should finish");
    assert_eq!(exit, LoopExit::Stopped);
    assert_eq!(handler.screen(), &Screen::Thanks);
}

#[test]
fn client_disconnect_ends_the_loop() {
    let (addr, display) = spawn_display();
    let mut client = DisplayClient::new(addr);
    client.connect().expect("client should connect");
    client.show_intro().expect("showintro");
    client.disconnect();

    let (exit, _) = display.join().expect("display thread should finish");
    assert_eq!(exit, LoopExit::Disconnected);

    let err = client.show_intro().expect_err("client is disconnected");
    assert!(matches!(err, PeerError::NotConnected));
}

#[test]
fn partial_header_blocks_serve_one() {
    let listener = DisplayListener::bind("127.0.0.1:0").expect("display should bind");
    let addr = listener.local_addr();
    let (done_tx, done_rx) = mpsc::channel();

    let display = thread::spawn(move || {
        let mut session = listener.accept().expect("display should accept");
        let result = session.serve_one(&mut ScreenHandler::new());
        let _ = done_tx.send(result.is_err());
    });

    let mut stream = TcpLink::connect(addr).expect("client should connect");
    // Header of Sequence[String("showintro")] only.
    stream.write_all(&[0x03, 0x00, 0x0C]).expect("write header");

    assert!(
        done_rx.recv_timeout(Duration::from_millis(200)).is_err(),
        "serve_one should block waiting for the content"
    );

    stream.shutdown().expect("shutdown");
    let failed = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("serve_one should return once the client hangs up");
    assert!(failed);
    display.join().expect("display thread should finish");
}
