//! Serves real sockets on the loopback interface.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use dcf77_web::history::RingLog;
use dcf77_web::http::connection::{ConnectionState, ContentWriter, HttpServer, Timeouts};
use dcf77_web::page::{IndexPage, LocalClock};
use dcf77_web::receiver;
use dcf77_web::server::{Listener, MonotonicClock, TcpAcceptor};

/// Enough telegrams that the page outgrows the loopback socket buffers.
static LARGE_HISTORY: RingLog<60000> = RingLog::new();

/// Ticks until one connection has been served and the slot is free again.
/// Returns the longest single tick.
async fn serve_one<L, W>(server: &mut HttpServer<L, W, MonotonicClock>) -> Duration
where
    L: Listener,
    W: ContentWriter,
{
    let mut busy = false;
    let mut worst = Duration::ZERO;
    for _ in 0..5000 {
        let started = Instant::now();
        server.tick();
        worst = worst.max(started.elapsed());

        match server.state() {
            ConnectionState::Idle if busy => return worst,
            ConnectionState::Idle => {}
            _ => busy = true,
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("connection was not served");
}

async fn exchange(request: &[u8], history: &RingLog<32>) -> String {
    let acceptor = TcpAcceptor::bind("127.0.0.1:0").await.unwrap();
    let addr = acceptor.local_addr();
    let mut server = HttpServer::new(
        acceptor,
        IndexPage::new(history, LocalClock),
        MonotonicClock::new(),
        Timeouts::default(),
    );
    server.begin();

    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(request).unwrap();
    serve_one(&mut server).await;

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    server.end();
    response
}

#[tokio::test]
async fn test_serves_history_page() {
    let history: RingLog<32> = RingLog::new();
    for _ in 0..3 {
        receiver::record_now(&history);
    }

    let response = exchange(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n", &history).await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/html; charset=utf-8\r\n"));
    assert!(response.contains("Connection: close\r\n\r\n"));
    assert_eq!(response.matches("<button").count(), 3);
    assert!(response.ends_with("</html>\r\n"));
}

#[tokio::test]
async fn test_rejects_other_methods() {
    let history: RingLog<32> = RingLog::new();

    let response = exchange(b"DELETE / HTTP/1.1\r\n\r\n", &history).await;

    assert_eq!(
        response,
        "HTTP/1.1 405 Method not allowed\r\nConnection: close\r\n\r\n"
    );
}

#[tokio::test]
async fn test_client_that_never_reads_does_not_stall_ticks() {
    for i in 0..60000 {
        LARGE_HISTORY.append(i);
    }

    let acceptor = TcpAcceptor::bind("127.0.0.1:0").await.unwrap();
    let addr = acceptor.local_addr();
    let mut server = HttpServer::new(
        acceptor,
        IndexPage::new(&LARGE_HISTORY, LocalClock),
        MonotonicClock::new(),
        Timeouts::default(),
    );
    server.begin();

    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();

    // The watchdog frees the slot; no tick along the way may block.
    let worst = serve_one(&mut server).await;
    assert!(worst < Duration::from_millis(200), "tick took {worst:?}");

    let started = Instant::now();
    server.end();
    assert!(started.elapsed() < Duration::from_millis(200));
    drop(stream);
}
