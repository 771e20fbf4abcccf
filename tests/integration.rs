use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use rax_gopher_server::error::GopherServerError;
use rax_gopher_server::server::bind_listener;
use rax_gopher_server::{Server, ServerConfig};

const WAIT: Duration = Duration::from_secs(5);

// Helper to start a server on an ephemeral port serving `root`
fn start_test_server(
    root: &Path,
    max_connections: usize,
) -> (Arc<Server>, SocketAddr, JoinHandle<Result<(), GopherServerError>>) {
    let config = ServerConfig {
        bind_address: "127.0.0.1".into(),
        port: 0,
        max_connections,
        recv_timeout_secs: 5,
        document_root: root.to_string_lossy().to_string(),
        ..ServerConfig::default()
    };

    let listener = bind_listener(&config).unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Arc::new(Server::new(config));
    let task = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.serve(listener).await })
    };
    (server, addr, task)
}

// Helper to send a raw request and read the whole response
async fn send_request(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    read_response(&mut stream).await
}

async fn read_response(stream: &mut TcpStream) -> Vec<u8> {
    let mut response = Vec::new();
    timeout(WAIT, stream.read_to_end(&mut response))
        .await
        .expect("response timed out")
        .unwrap();
    response
}

async fn stop(server: Arc<Server>, task: JoinHandle<Result<(), GopherServerError>>) {
    server.shutdown();
    timeout(WAIT, task)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_file_selector_returns_raw_bytes() {
    let root = tempfile::tempdir().unwrap();
    let content: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();
    fs::write(root.path().join("foo.txt"), &content).unwrap();

    let (server, addr, task) = start_test_server(root.path(), 4);
    let response = send_request(addr, b"/foo.txt\r\n").await;
    assert_eq!(response, content);
    assert!(!response.ends_with(b".\r\n"));

    stop(server, task).await;
}

#[tokio::test]
async fn test_directory_without_gophermap_is_listed() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("docs")).unwrap();
    fs::write(root.path().join("docs/a.txt"), "a").unwrap();

    let (server, addr, task) = start_test_server(root.path(), 4);
    let response = send_request(addr, b"/docs\r\n").await;
    assert_eq!(
        String::from_utf8(response).unwrap(),
        concat!(
            "i[/docs]:\t\tnull.host\t0\r\n",
            "i\t\tnull.host\t0\r\n",
            "0a.txt \t/docs/a.txt\tlocalhost\t70\r\n",
            ".\r\n",
        )
    );

    stop(server, task).await;
}

#[tokio::test]
async fn test_gophermap_stops_at_dot() {
    let root = tempfile::tempdir().unwrap();
    fs::write(
        root.path().join("gophermap"),
        "iHello\n1Sub\t/sub\n.\n1Never\t/x\n",
    )
    .unwrap();

    let (server, addr, task) = start_test_server(root.path(), 4);
    let response = String::from_utf8(send_request(addr, b"\r\n").await).unwrap();
    assert_eq!(
        response,
        concat!(
            "iiHello\t\tnull.host\t0\r\n",
            "1Sub\t/sub\tlocalhost\t70\r\n",
            ".\r\n",
        )
    );
    assert!(!response.contains("Never"));

    stop(server, task).await;
}

#[tokio::test]
async fn test_oversized_selector_gets_error_item() {
    let root = tempfile::tempdir().unwrap();
    let (server, addr, task) = start_test_server(root.path(), 4);

    let response = send_request(addr, &[b'a'; 255]).await;
    assert_eq!(
        String::from_utf8(response).unwrap(),
        "3Selector string longer than 255 characters\t\tnull.host\t0\r\n"
    );

    stop(server, task).await;
}

#[tokio::test]
async fn test_missing_selector_is_not_found() {
    let root = tempfile::tempdir().unwrap();
    let (server, addr, task) = start_test_server(root.path(), 4);

    let response = send_request(addr, b"/nothing/here\r\n").await;
    assert_eq!(
        String::from_utf8(response).unwrap(),
        "3Selector not found.\t\tnull.host\t0\r\n.\r\n"
    );

    stop(server, task).await;
}

#[tokio::test]
async fn test_busy_slot_is_reused_after_release() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("f"), "payload").unwrap();
    let (server, addr, task) = start_test_server(root.path(), 1);

    // Occupies the only slot without sending a selector yet.
    let mut first = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Waits in the backlog until the first connection is done.
    let mut second = TcpStream::connect(addr).await.unwrap();
    second.write_all(b"/f\r\n").await.unwrap();
    let mut probe = [0u8; 1];
    assert!(
        timeout(Duration::from_millis(300), second.read(&mut probe))
            .await
            .is_err(),
        "second client served while the only slot was busy"
    );

    first.write_all(b"/f\r\n").await.unwrap();
    assert_eq!(read_response(&mut first).await, b"payload");
    assert_eq!(read_response(&mut second).await, b"payload");

    stop(server, task).await;
}

#[tokio::test]
async fn test_shutdown_closes_open_connections() {
    let root = tempfile::tempdir().unwrap();
    let (server, addr, task) = start_test_server(root.path(), 2);

    let mut idle = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(server.is_running());

    stop(Arc::clone(&server), task).await;
    assert!(!server.is_running());

    // The handler was dropped mid-read, closing the socket under the client.
    let mut buf = Vec::new();
    let read = timeout(WAIT, idle.read_to_end(&mut buf)).await.unwrap();
    assert!(read.is_err() || buf.is_empty());

    // The listening socket is gone as well.
    assert!(TcpStream::connect(addr).await.is_err());
}
