//! Mock wallet backend for testing
//!
//! A tiny HTTP server on a random local port that answers like the wallet
//! REST backend, so [`HttpWalletApi`](super::http::HttpWalletApi) can be
//! exercised end to end:
//! - POST /api/auth/login returns { user } or 401
//! - POST /api/auth/signup returns { user }
//! - GET /api/balances/get_balance/{id} returns { success, data: { balance } }
//! - POST /api/balances/add_funds and /api/balances/withdraw return
//!   { success, data: { current_balance, transaction_id } }
//! - GET /api/transactions returns a bare list, oldest first

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};

pub const MOCK_PHONE: &str = "9876543210";
pub const MOCK_PASSWORD: &str = "abc123";

/// Behaviour knobs for the mock server
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Starting balance of the single mock account
    pub balance: Decimal,
    /// Answer every request with HTTP 500
    pub fail_all: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            balance: Decimal::new(5000, 0),
            fail_all: false,
            delay_ms: 0,
        }
    }
}

struct MockState {
    config: MockConfig,
    balance: Mutex<Decimal>,
    requests: AtomicUsize,
}

pub struct MockWalletServer {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<MockState>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockWalletServer {
    /// Start on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        listener.set_nonblocking(true)?;

        let running = Arc::new(AtomicBool::new(true));
        let state = Arc::new(MockState {
            balance: Mutex::new(config.balance),
            config,
            requests: AtomicUsize::new(0),
        });

        let running_clone = running.clone();
        let state_clone = state.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let state = state_clone.clone();
                        thread::spawn(move || handle_connection(stream, &state));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    /// Base URL including the `/api` prefix
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    /// Requests answered so far
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn balance(&self) -> Decimal {
        *self.state.balance.lock().unwrap()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockWalletServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read the request head plus a `Content-Length` body
fn read_request(stream: &mut TcpStream) -> Option<(String, String, String)> {
    stream.set_nonblocking(false).ok()?;
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let head_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while data.len() < head_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let mut parts = head.lines().next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();
    let body = String::from_utf8_lossy(&data[head_end..]).to_string();
    Some((method, path, body))
}

fn handle_connection(mut stream: TcpStream, state: &MockState) {
    let Some((method, path, body)) = read_request(&mut stream) else {
        return;
    };
    state.requests.fetch_add(1, Ordering::SeqCst);

    if state.config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(state.config.delay_ms));
    }

    if state.config.fail_all {
        send_json(&mut stream, 500, &json!({"success": false, "message": "Internal server error"}));
        return;
    }

    let body: JsonValue = serde_json::from_str(&body).unwrap_or(JsonValue::Null);
    let path = path.split('?').next().unwrap_or("").to_string();

    match (method.as_str(), path.as_str()) {
        ("POST", "/api/auth/login") => {
            if body["phone_number"] == MOCK_PHONE && body["password"] == MOCK_PASSWORD {
                let balance = *state.balance.lock().unwrap();
                send_json(
                    &mut stream,
                    200,
                    &json!({"user": {
                        "id": 1,
                        "name": "Test User",
                        "phone_number": MOCK_PHONE,
                        "balance": balance.to_string(),
                        "email": "test@example.com"
                    }}),
                );
            } else {
                send_json(&mut stream, 401, &json!({"message": "Invalid credentials"}));
            }
        }
        ("POST", "/api/auth/signup") => {
            send_json(
                &mut stream,
                201,
                &json!({"user": {
                    "id": 2,
                    "name": body["name"],
                    "phone_number": body["phone_number"],
                    "balance": 0
                }}),
            );
        }
        ("GET", p) if p.starts_with("/api/balances/get_balance/") => {
            let balance = *state.balance.lock().unwrap();
            send_json(
                &mut stream,
                200,
                &json!({"success": true, "data": {"balance": balance.to_string()}}),
            );
        }
        ("POST", "/api/balances/add_funds") => {
            let amount = amount_of(&body);
            let mut balance = state.balance.lock().unwrap();
            *balance += amount;
            send_json(
                &mut stream,
                200,
                &json!({"success": true, "data": {
                    "current_balance": balance.to_string(),
                    "transaction_id": body["transaction_id"]
                }}),
            );
        }
        ("POST", "/api/balances/withdraw") => {
            let amount = amount_of(&body);
            let mut balance = state.balance.lock().unwrap();
            if amount > *balance {
                send_json(
                    &mut stream,
                    400,
                    &json!({"success": false, "message": "Insufficient balance"}),
                );
            } else {
                *balance -= amount;
                send_json(
                    &mut stream,
                    200,
                    &json!({"success": true, "data": {
                        "current_balance": balance.to_string(),
                        "transaction_id": 77
                    }}),
                );
            }
        }
        ("GET", "/api/transactions") => {
            send_json(
                &mut stream,
                200,
                &json!([
                    {"id": 1, "type": "withdrawal", "amount": 250, "description": "ATM", "date": "2025-03-28"},
                    {"id": 2, "type": "deposit", "amount": 1000, "description": "Salary", "date": "2025-04-01"}
                ]),
            );
        }
        _ => send_json(&mut stream, 404, &json!({"message": "Endpoint not found"})),
    }
}

fn amount_of(body: &JsonValue) -> Decimal {
    match &body["amount"] {
        JsonValue::Number(n) => Decimal::from_str(&n.to_string()).unwrap_or_default(),
        JsonValue::String(s) => Decimal::from_str(s).unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

fn send_json(stream: &mut TcpStream, status: u16, body: &JsonValue) {
    let status_text = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let body = body.to_string();
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::{HttpWalletApi, DEFAULT_TIMEOUT};
    use crate::adapters::network::ManualNetworkStatus;
    use crate::domain::result::Error;
    use crate::domain::TransactionType;
    use crate::ports::{AddFundsRequest, LoginRequest, WalletApi, WithdrawRequest};

    fn client(server: &MockWalletServer) -> HttpWalletApi {
        HttpWalletApi::new(
            &server.base_url(),
            DEFAULT_TIMEOUT,
            Arc::new(ManualNetworkStatus::default()),
        )
        .unwrap()
    }

    fn login_request(password: &str) -> LoginRequest {
        LoginRequest {
            phone_number: MOCK_PHONE.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let server = MockWalletServer::start(MockConfig::default()).unwrap();
        let user = client(&server).login(&login_request(MOCK_PASSWORD)).await.unwrap();

        assert_eq!(user.id, "1");
        assert_eq!(user.phone_number, MOCK_PHONE);
        assert_eq!(user.balance, Some(Decimal::new(5000, 0)));
        assert_eq!(user.extra["email"], "test@example.com");
    }

    #[tokio::test]
    async fn test_login_rejected_uses_server_message() {
        let server = MockWalletServer::start(MockConfig::default()).unwrap();
        let err = client(&server).login(&login_request("wrong")).await.unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_balance_and_funds() {
        let server = MockWalletServer::start(MockConfig::default()).unwrap();
        let api = client(&server);

        assert_eq!(api.get_balance("1").await.unwrap(), Decimal::new(5000, 0));

        let update = api
            .add_funds(&AddFundsRequest {
                user_id: "1".to_string(),
                amount: Decimal::new(500, 0),
                transaction_id: "TXN1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(update.current_balance, Some(Decimal::new(5500, 0)));
        assert_eq!(update.transaction_id.as_deref(), Some("TXN1"));

        let update = api
            .withdraw(&WithdrawRequest {
                user_id: "1".to_string(),
                amount: Decimal::new(1500, 0),
            })
            .await
            .unwrap();
        assert_eq!(update.current_balance, Some(Decimal::new(4000, 0)));
        assert_eq!(update.transaction_id.as_deref(), Some("77"));
        assert_eq!(server.balance(), Decimal::new(4000, 0));
    }

    #[tokio::test]
    async fn test_withdraw_failure_envelope() {
        let server = MockWalletServer::start(MockConfig {
            balance: Decimal::new(100, 0),
            ..Default::default()
        })
        .unwrap();

        let err = client(&server)
            .withdraw(&WithdrawRequest {
                user_id: "1".to_string(),
                amount: Decimal::new(500, 0),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient balance");
    }

    #[tokio::test]
    async fn test_transactions_accept_wire_aliases() {
        let server = MockWalletServer::start(MockConfig::default()).unwrap();
        let records = client(&server).get_transactions().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].uuid.as_deref(), Some("1"));
        assert_eq!(records[0].kind, TransactionType::Debit);
        assert_eq!(records[1].kind, TransactionType::Credit);
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockWalletServer::start(MockConfig {
            fail_all: true,
            ..Default::default()
        })
        .unwrap();

        let err = client(&server).get_balance("1").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: Some(500), .. }));
        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = HttpWalletApi::new(
            &format!("http://127.0.0.1:{}/api", port),
            DEFAULT_TIMEOUT,
            Arc::new(ManualNetworkStatus::default()),
        )
        .unwrap();

        let err = api.get_transactions().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
