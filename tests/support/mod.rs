// Shared one-time server bootstrap for integration tests.
#![allow(dead_code)]

use glam::Vec2;
use realm_server::domain::{EnemySpawn, LevelData};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

// Base address published once the server thread has bound its port.
static SERVER_ADDR: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

pub const SPAWN: Vec2 = Vec2::new(0.0, 0.0);

/// Small arena: players spawn at the origin, one enemy far out of aggro range.
pub fn test_level() -> LevelData {
    LevelData {
        player_spawn: SPAWN,
        enemy_spawns: vec![EnemySpawn {
            pos: Vec2::new(5000.0, 5000.0),
            name: "Sentinel".to_string(),
            level: 1,
        }],
    }
}

// Ensure the test server is running and return its `host:port`.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);
        // Own OS thread and runtime so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                realm_server::run(listener, test_level())
                    .await
                    .expect("server failed");
            });
        });
        wait_for_readiness(published);
    });

    SERVER_ADDR
        .get()
        .expect("server addr should be initialized")
        .as_str()
}

pub fn ws_url() -> String {
    format!("ws://{}/ws", ensure_server())
}

fn wait_for_readiness(published: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_ADDR.set(addr.clone());

    // Retry briefly to avoid racing server bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
