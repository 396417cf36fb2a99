// =============================================================================
// Shared fixtures: a fake Pinata API, a live pinning proxy, and a scripted
// browser wallet. Every server binds 127.0.0.1:0 so tests run in parallel.
// =============================================================================

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use mint_client::{Eip1193, ProviderError};
use pinning_proxy::{create_router, AppState, Config};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const JWT: &str = "test-pinata-jwt";
pub const CID_IMG: &str = "CID_IMG";
pub const CID_META: &str = "CID_META";
pub const ACCOUNT: &str = "0x7e5a9b6f4bb9efc27f83e18f29e4326480668f87";
pub const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
pub const TX_HASH: &str = "0x9fc76417374aa880d4449a1f7f31ec597f00b1f6f3dd2d66f4c9c6c445836d8b";

// =============================================================================
// Fake Pinata
// =============================================================================

/// A file received by `pinFileToIPFS`.
#[derive(Debug, Clone)]
pub struct PinnedFile {
    pub file_name: String,
    pub size: usize,
    pub metadata: Option<Value>,
}

/// Everything the fake Pinata received.
#[derive(Debug, Default)]
pub struct PinataLog {
    pub files: Vec<PinnedFile>,
    pub json: Vec<Value>,
    pub auth: Vec<String>,
}

/// How the fake Pinata answers.
#[derive(Debug, Clone, Default)]
pub enum Upstream {
    #[default]
    Succeed,
    FailFile(StatusCode, Value),
    FailJson(StatusCode, Value),
}

#[derive(Clone)]
struct PinataState {
    log: Arc<Mutex<PinataLog>>,
    behavior: Upstream,
}

pub struct FakePinata {
    pub url: String,
    pub log: Arc<Mutex<PinataLog>>,
}

impl FakePinata {
    pub fn files(&self) -> Vec<PinnedFile> {
        self.log.lock().unwrap().files.clone()
    }

    pub fn json(&self) -> Vec<Value> {
        self.log.lock().unwrap().json.clone()
    }

    pub fn auth(&self) -> Vec<String> {
        self.log.lock().unwrap().auth.clone()
    }
}

fn record_auth(state: &PinataState, headers: &HeaderMap) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.log.lock().unwrap().auth.push(auth);
}

fn pinned(cid: &str, size: usize) -> Json<Value> {
    Json(json!({
        "IpfsHash": cid,
        "PinSize": size,
        "Timestamp": "2026-10-19T12:00:00.000Z"
    }))
}

async fn pin_file_to_ipfs(
    State(state): State<PinataState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);

    let mut file: Option<PinnedFile> = None;
    let mut metadata: Option<Value> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
                file = Some(PinnedFile {
                    file_name,
                    size,
                    metadata: None,
                });
            }
            Some("pinataMetadata") => {
                let text = field.text().await.unwrap_or_default();
                metadata = serde_json::from_str(&text).ok();
            }
            _ => {}
        }
    }

    if let Upstream::FailFile(status, body) = &state.behavior {
        return (*status, Json(body.clone()));
    }

    let Some(mut file) = file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"reason": "INVALID_REQUEST", "details": "file is required"}})),
        );
    };
    file.metadata = metadata;
    let size = file.size;
    state.log.lock().unwrap().files.push(file);
    (StatusCode::OK, pinned(CID_IMG, size))
}

async fn pin_json_to_ipfs(
    State(state): State<PinataState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);

    if let Upstream::FailJson(status, error) = &state.behavior {
        return (*status, Json(error.clone()));
    }

    let size = body.to_string().len();
    state.log.lock().unwrap().json.push(body);
    (StatusCode::OK, pinned(CID_META, size))
}

async fn test_authentication(headers: HeaderMap) -> StatusCode {
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(auth) if auth == format!("Bearer {JWT}") => StatusCode::OK,
        _ => StatusCode::UNAUTHORIZED,
    }
}

pub async fn spawn_fake_pinata(behavior: Upstream) -> Result<FakePinata> {
    let log = Arc::new(Mutex::new(PinataLog::default()));
    let state = PinataState {
        log: log.clone(),
        behavior,
    };

    let app = Router::new()
        .route("/pinning/pinFileToIPFS", post(pin_file_to_ipfs))
        .route("/pinning/pinJSONToIPFS", post(pin_json_to_ipfs))
        .route("/data/testAuthentication", get(test_authentication))
        .layer(DefaultBodyLimit::disable())
        .with_state(state);

    let url = serve(app).await?;
    Ok(FakePinata { url, log })
}

// =============================================================================
// Pinning proxy
// =============================================================================

pub struct Proxy {
    pub url: String,
    pub upload_dir: PathBuf,
}

/// Fresh staging directory per proxy.
pub fn scratch_dir() -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    std::env::temp_dir().join(format!(
        "minter-it-{}-{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ))
}

pub async fn spawn_proxy(pinata_url: &str, max_file_bytes: usize) -> Result<Proxy> {
    let upload_dir = scratch_dir();
    let config = Config {
        pinata_api_url: pinata_url.to_string(),
        pinata_jwt: JWT.into(),
        max_file_bytes,
        upload_dir: upload_dir.to_string_lossy().into_owned(),
        request_timeout_secs: 5,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config)?);
    let url = serve(create_router(state)).await?;
    Ok(Proxy { url, upload_dir })
}

/// Files left behind in a staging directory.
pub fn staged_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

async fn serve(app: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

// =============================================================================
// Scripted wallet
// =============================================================================

/// In-memory EIP-1193 provider on Sepolia holding 1 ETH.
#[derive(Debug, Default)]
pub struct ScriptedWallet {
    pub calls: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<Value>>,
    pub reject_signature: bool,
}

impl ScriptedWallet {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().unwrap().clone()
    }
}

impl Eip1193 for ScriptedWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls.lock().unwrap().push(method.to_string());
        match method {
            "eth_requestAccounts" => Ok(json!([ACCOUNT])),
            "eth_chainId" => Ok(json!("0xaa36a7")),
            "eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
            "eth_sendTransaction" if self.reject_signature => Err(ProviderError::new(
                ProviderError::USER_REJECTED,
                "MetaMask Tx Signature: User denied transaction signature.",
            )),
            "eth_sendTransaction" => {
                self.sent.lock().unwrap().push(params[0].clone());
                Ok(json!(TX_HASH))
            }
            "eth_getTransactionReceipt" => Ok(json!({
                "transactionHash": TX_HASH,
                "blockNumber": "0x5a",
                "status": "0x1",
                "logs": [{
                    "address": CONTRACT,
                    "topics": [
                        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                        format!("0x{:064x}", 0),
                        format!("0x{:0>64}", ACCOUNT.trim_start_matches("0x")),
                        format!("0x{:064x}", 1),
                    ],
                    "data": "0x"
                }]
            })),
            other => Err(ProviderError::new(4200, format!("unsupported method {other}"))),
        }
    }
}

// =============================================================================
// JSON-RPC node
// =============================================================================

/// Serve a [`ScriptedWallet`] as a JSON-RPC endpoint.
pub async fn spawn_rpc_node(wallet: Arc<ScriptedWallet>) -> Result<String> {
    async fn handle(State(wallet): State<Arc<ScriptedWallet>>, Json(req): Json<Value>) -> Json<Value> {
        let method = req["method"].as_str().unwrap_or_default();
        let reply = match wallet.request(method, req["params"].clone()).await {
            Ok(result) => json!({"jsonrpc": "2.0", "id": req["id"], "result": result}),
            Err(e) => json!({
                "jsonrpc": "2.0",
                "id": req["id"],
                "error": {"code": e.code, "message": e.message}
            }),
        };
        Json(reply)
    }

    serve(Router::new().route("/", post(handle)).with_state(wallet)).await
}
