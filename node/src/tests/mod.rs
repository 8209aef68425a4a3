//! Multi-node scenario tests, spinning up real [`crate::Node`] instances on
//! loopback ports — no mocked transport.

use std::time::Duration;

use pretty_assertions::assert_eq;
use types::{NodeAddress, Status};

use crate::Node;

async fn ring_of(n: usize) -> Vec<Node> {
    let bootstrap_node = Node::new("127.0.0.1", 0, None).await.unwrap();
    let bootstrap_addr = NodeAddress::new(
        bootstrap_node.node_id(),
        "127.0.0.1",
        bootstrap_node.local_addr().port(),
    );

    let mut nodes = vec![bootstrap_node];
    for _ in 1..n {
        let node = Node::new("127.0.0.1", 0, Some(bootstrap_addr.clone()))
            .await
            .unwrap();
        nodes.push(node);
    }
    nodes
}

#[tokio::test]
async fn five_node_ring_converges_and_cross_node_lookups_succeed() {
    let nodes = ring_of(5).await;
    // Give JOIN gossip a moment to propagate beyond the direct bootstrap
    // relationship before anyone stores anything.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let pairs = [
        ("apple", "red"),
        ("banana", "yellow"),
        ("cherry", "dark red"),
        ("date", "brown"),
        ("kiwi", "green"),
    ];

    for (i, (key, value)) in pairs.iter().enumerate() {
        let storer = &nodes[i % nodes.len()];
        let resp = storer.store(*key, serde_json::json!(value)).await;
        assert!(resp.is_success(), "store of {key} failed: {resp:?}");
    }

    tokio::time::sleep(Duration::from_millis(500)).await;

    for (i, (key, value)) in pairs.iter().enumerate() {
        let reader = &nodes[(i + 2) % nodes.len()];
        let resp = reader.lookup(*key).await;
        assert!(resp.is_success(), "lookup of {key} failed: {resp:?}");
        assert_eq!(resp.value, Some(serde_json::json!(value)));
    }

    for node in &nodes {
        node.shutdown();
    }
}

#[tokio::test]
async fn missing_key_reports_not_found_from_its_root() {
    let nodes = ring_of(5).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let resp = nodes[0].lookup("kumquat").await;
    assert_eq!(resp.status, Status::Error);
    assert_eq!(resp.message.as_deref(), Some("Key not found"));

    for node in &nodes {
        node.shutdown();
    }
}

#[tokio::test]
async fn unknown_message_type_on_a_raw_socket_gets_a_clean_error() {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;

    let nodes = ring_of(1).await;
    let addr = nodes[0].local_addr();

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(br#"{"type":"PING"}"#).await.unwrap();
    stream.write_all(b"\n").await.unwrap();

    let (read_half, _write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();

    let resp: types::Response = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(resp.status, Status::Error);
    assert_eq!(resp.message.as_deref(), Some("Unknown message type"));

    nodes[0].shutdown();
}
