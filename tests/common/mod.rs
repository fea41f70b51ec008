//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use host_redirect::config::ServerConfig;
use host_redirect::lifecycle::Service;
use host_redirect::RoutingTable;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const RULES_301: &str = "- from: old.example.com\n  to: https://new.example.com\n  status: 301\n";
pub const RULES_308: &str = "- from: old.example.com\n  to: https://newer.example.com\n  status: 308\n";

/// A running service bound to an ephemeral port.
pub struct TestService {
    pub addr: SocketAddr,
    pub table: Arc<RoutingTable>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Send the termination signal and wait for the service to exit.
    pub async fn stop(mut self) -> std::io::Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("service did not stop")
            .expect("service task panicked")
    }
}

/// Write `content` as `config.yaml` inside `dir`.
pub fn write_rules(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

/// Replace the rule file the way editors do: write a sibling, then rename.
#[allow(dead_code)]
pub fn replace_rules(path: &Path, content: &str) {
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, content).unwrap();
    std::fs::rename(&tmp, path).unwrap();
}

pub async fn start_service(rules_path: PathBuf) -> TestService {
    let config = ServerConfig {
        rules_path,
        bind_address: "127.0.0.1:0".to_string(),
        debounce_ms: 50,
        shutdown_grace_secs: 5,
        ..ServerConfig::default()
    };

    let service = Service::start(config).await.expect("service should start");
    let addr = service.local_addr().unwrap();
    let table = service.table();

    let (stop, stopped) = oneshot::channel();
    let handle = tokio::spawn(service.run_until(async move {
        let _ = stopped.await;
    }));

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestService {
        addr,
        table,
        stop: Some(stop),
        handle,
    }
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll until the table reaches `version`.
#[allow(dead_code)]
pub async fn wait_for_version(table: &RoutingTable, version: u64) {
    for _ in 0..500 {
        if table.version() >= version {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("routing table never reached version {version} (at {})", table.version());
}
