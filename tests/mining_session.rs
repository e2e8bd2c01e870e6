// tests/mining_session.rs
//! End-to-end: a worker pair against a local node that serves templates
//! over TCP and collects solved blocks.

use marabu_miner_rs::miner::nonce::{self, PREFIX_LEN};
use marabu_miner_rs::miner::target::digest_hex;
use marabu_miner_rs::miner::{WorkerContext, run_worker};
use marabu_miner_rs::{
    Algorithm, Blake2s, Block, DecodePolicy, MinerError, MinerSettings, NodeConfig,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

fn context(address: String) -> WorkerContext {
    WorkerContext {
        id: 0,
        node: NodeConfig {
            reconnect_attempts: 0,
            ..NodeConfig::new(address)
        },
        settings: MinerSettings::default(),
        on_decode_error: DecodePolicy::Skip,
        events: crossbeam_channel::unbounded().0,
    }
}

/// Genesis, rewound a few counter steps before its known solution
fn rewound_genesis(steps: u64) -> Block {
    let genesis = Block::genesis();
    let (prefix, solution) = nonce::split(&genesis.nonce).unwrap();
    Block {
        nonce: nonce::compose(prefix, solution - steps).unwrap(),
        ..genesis
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_mines_and_submits_over_tcp() {
    let node = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = node.local_addr().unwrap().to_string();
    let worker = tokio::spawn(run_worker(context(address)));

    let (socket, _) = node.accept().await.unwrap();
    let (read_half, mut write_half) = socket.into_split();

    // a stale template followed by the real one in the same write: only the
    // last should be mined
    let mut stale = rewound_genesis(0);
    stale.nonce = nonce::compose(&"f".repeat(PREFIX_LEN), 0).unwrap();
    let mut batch = stale.encode().unwrap();
    batch.push(b'\n');
    batch.extend(rewound_genesis(50).encode().unwrap());
    batch.push(b'\n');
    write_half.write_all(&batch).await.unwrap();

    let mut lines = BufReader::new(read_half).lines();
    let submitted = tokio::time::timeout(Duration::from_secs(30), lines.next_line())
        .await
        .expect("no submission within 30s")
        .unwrap()
        .expect("connection closed without a submission");

    let block = Block::decode(submitted.as_bytes()).unwrap();
    assert_eq!(block, Block::genesis());
    assert_eq!(
        digest_hex(&Blake2s::new().digest(submitted.as_bytes())),
        "0000000052a0e645eca917ae1c196e0d0a4fb756747f29ef52594d68484bb5e2"
    );

    // node goes away: the pair ends with a transport error, no retries left
    drop(lines);
    drop(write_half);
    let result = tokio::time::timeout(Duration::from_secs(10), worker)
        .await
        .expect("worker did not stop")
        .unwrap();
    assert!(matches!(result, Err(MinerError::ConnectionError(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_reconnects_after_node_restart() {
    let node = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = node.local_addr().unwrap().to_string();
    let ctx = WorkerContext {
        node: NodeConfig {
            reconnect_attempts: 1,
            reconnect_backoff_ms: 10,
            ..NodeConfig::new(address)
        },
        ..context(String::new())
    };
    let worker = tokio::spawn(run_worker(ctx));

    // first connection dies immediately
    let (first, _) = node.accept().await.unwrap();
    drop(first);

    // second connection gets a template and must yield a solution
    let (socket, _) = tokio::time::timeout(Duration::from_secs(10), node.accept())
        .await
        .expect("worker did not reconnect")
        .unwrap();
    let (read_half, mut write_half) = socket.into_split();
    let mut template = rewound_genesis(5).encode().unwrap();
    template.push(b'\n');
    write_half.write_all(&template).await.unwrap();

    let mut lines = BufReader::new(read_half).lines();
    let submitted = tokio::time::timeout(Duration::from_secs(30), lines.next_line())
        .await
        .expect("no submission after reconnect")
        .unwrap()
        .unwrap();
    assert_eq!(Block::decode(submitted.as_bytes()).unwrap(), Block::genesis());

    drop(lines);
    drop(write_half);
    let _ = tokio::time::timeout(Duration::from_secs(10), worker).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reconnect_budget_is_per_outage() {
    let node = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = node.local_addr().unwrap().to_string();
    let ctx = WorkerContext {
        node: NodeConfig {
            reconnect_attempts: 1,
            reconnect_backoff_ms: 10,
            ..NodeConfig::new(address)
        },
        ..context(String::new())
    };
    let worker = tokio::spawn(run_worker(ctx));

    // three healthy sessions, each ended by the node: one reconnect apiece
    for session in 0..3 {
        let (socket, _) = tokio::time::timeout(Duration::from_secs(10), node.accept())
            .await
            .unwrap_or_else(|_| panic!("no connection for session {}", session))
            .unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut template = rewound_genesis(5).encode().unwrap();
        template.push(b'\n');
        write_half.write_all(&template).await.unwrap();

        let mut lines = BufReader::new(read_half).lines();
        let submitted = tokio::time::timeout(Duration::from_secs(30), lines.next_line())
            .await
            .expect("no submission in session")
            .unwrap()
            .unwrap();
        assert_eq!(Block::decode(submitted.as_bytes()).unwrap(), Block::genesis());
        assert!(!worker.is_finished());
    }

    // node goes away for good: the single retry fails and the worker stops
    drop(node);
    let result = tokio::time::timeout(Duration::from_secs(10), worker)
        .await
        .expect("worker did not stop")
        .unwrap();
    assert!(matches!(result, Err(MinerError::ConnectionError(_))));
}
