//! テスト用のモック上流サーバ
//!
//! 1接続だけ受けて固定レスポンスを返し、受け取ったリクエストヘッダ部を返す。

use std::net::SocketAddr;
use std::path::Path;

use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::Config;

pub struct MockUpstream {
    addr: SocketAddr,
    handle: JoinHandle<String>,
}

impl MockUpstream {
    pub async fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();
        // 表にないコードで黙って 200 を返さないよう、起動前に検証する
        let status = StatusCode::from_u16(status).expect("invalid status code");
        let reason = status
            .canonical_reason()
            .unwrap_or_else(|| panic!("no reason phrase for {status}"));

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status.as_u16(),
                reason,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request).into_owned()
        });

        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/v2/", self.addr)
    }

    /// Wait for the single request and return its head.
    pub async fn request(self) -> String {
        self.handle.await.unwrap()
    }

    /// A base URL on a port nothing listens on.
    pub async fn closed_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/v2/", addr)
    }
}

pub fn test_config(base_url: &str, output_path: impl AsRef<Path>) -> Config {
    let output = output_path.as_ref().to_string_lossy().into_owned();
    let base = base_url.to_string();
    Config::from_lookup(move |key| match key {
        "EBIRD_API_KEY" => Some("test-token".to_string()),
        "EBIRD_API_BASE" => Some(base.clone()),
        "EBIRD_OUTPUT_PATH" => Some(output.clone()),
        "EBIRD_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .unwrap()
}
