//! Common test utilities

use std::net::SocketAddr;

use chrono::{DateTime, TimeZone, Utc};
use zenclass::server::{ReportServer, ServerConfig};
use zenclass::storage::SharedRecordStore;

/// UTC timestamp at noon on the given day
pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// Serve `store` on an ephemeral loopback port
pub async fn spawn_app(store: SharedRecordStore) -> SocketAddr {
    let config = ServerConfig::builder()
        .bind_address_str("127.0.0.1:0")
        .unwrap()
        .enable_request_logging(false)
        .build()
        .unwrap();
    let server = ReportServer::new(config, store).expect("server");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        server
            .serve(listener, std::future::pending())
            .await
            .expect("serve app")
    });
    addr
}

/// GET `path` and return status code and raw body
pub async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    let response = reqwest::get(format!("http://{addr}{path}"))
        .await
        .expect("request");
    let status = response.status().as_u16();
    let body = response.text().await.expect("body");
    (status, body)
}

/// GET `path` and parse the body as JSON
#[allow(dead_code)]
pub async fn get_json(addr: SocketAddr, path: &str) -> (u16, serde_json::Value) {
    let (status, body) = get(addr, path).await;
    let json = serde_json::from_str(&body).expect("json body");
    (status, json)
}
