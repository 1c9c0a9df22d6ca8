//! In-memory stub of the Freshservice asset API.
//!
//! Serves the same routes the client uses:
//! - `POST   /assets`             : create, assigns `id` and `display_id`
//! - `GET    /assets/{display_id}`: read
//! - `PUT    /assets/{display_id}`: replace the writable fields
//! - `DELETE /assets/{display_id}`: remove
//! - `GET    /asset_types/`       : listing, honours `per_page`
//! - `GET    /asset_types/{id}`   : single asset type
//!
//! Requests without a Basic `Authorization` header get a 401. Canned
//! responses registered through [`Store::add_canned`] take precedence over the
//! in-memory store, and every request is recorded for later inspection.
//!
//! The [`TestServer`] helper starts a stub on a random port for integration testing.

use fresh_client::model::{AssetEnvelope, AssetTypeEnvelope, AssetTypeListing};
use fresh_client::{Asset, AssetType};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{debug, info, warn};

/// A fixed reply for one method and URL (path plus query string).
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// A request as the stub received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    description: &'a str,
}

/// Asset types the stub serves unless told otherwise.
pub fn default_asset_types() -> Vec<AssetType> {
    let stamp = "2019-02-14T10:08:02Z".to_owned();
    [
        (1, "Services", 0),
        (2, "Cloud", 0),
        (3, "Hardware", 0),
        (4, "Software", 0),
        (5, "VMware VCenter VM", 2),
    ]
    .into_iter()
    .map(|(id, name, parent)| AssetType {
        id,
        name: name.to_owned(),
        parent_asset_type_id: parent,
        visible: true,
        description: String::new(),
        created_at: stamp.clone(),
        updated_at: stamp.clone(),
    })
    .collect()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// In-memory state of the stub.
pub struct Store {
    assets: RwLock<BTreeMap<i64, Asset>>,
    asset_types: RwLock<Vec<AssetType>>,
    next_display_id: Mutex<i64>,
    canned: RwLock<Vec<CannedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(default_asset_types())
    }
}

impl Store {
    pub fn new(asset_types: Vec<AssetType>) -> Self {
        Self {
            assets: RwLock::new(BTreeMap::new()),
            asset_types: RwLock::new(asset_types),
            next_display_id: Mutex::new(1),
            canned: RwLock::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Register a canned reply. Later registrations for the same method and
    /// URL win.
    pub fn add_canned(&self, method: &str, url: &str, status: u16, body: &str) {
        let mut canned = self.canned.write().expect("canned lock poisoned");
        canned.retain(|c| !(c.method == method && c.url == url));
        canned.push(CannedResponse {
            method: method.to_owned(),
            url: url.to_owned(),
            status,
            body: body.to_owned(),
        });
    }

    pub fn clear_canned(&self) {
        self.canned.write().expect("canned lock poisoned").clear();
    }

    fn find_canned(&self, method: &str, url: &str) -> Option<CannedResponse> {
        let canned = self.canned.read().expect("canned lock poisoned");
        canned
            .iter()
            .find(|c| c.method == method && c.url == url)
            .cloned()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    fn record(&self, request: RecordedRequest) {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request);
    }

    pub fn asset(&self, display_id: i64) -> Option<Asset> {
        let assets = self.assets.read().expect("asset lock poisoned");
        assets.get(&display_id).cloned()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.read().expect("asset lock poisoned").len()
    }

    /// Insert a new asset, assigning ids and timestamps. Returns the stored copy.
    pub fn insert_asset(&self, mut asset: Asset) -> Asset {
        let display_id = {
            let mut next = self.next_display_id.lock().expect("id lock poisoned");
            let id = *next;
            *next += 1;
            id
        };
        let stamp = now();
        asset.display_id = display_id;
        asset.id = 1000 + display_id;
        asset.created_at.clone_from(&stamp);
        asset.updated_at = stamp;
        if asset.author_type.is_empty() {
            asset.author_type = "User".to_owned();
        }
        let mut assets = self.assets.write().expect("asset lock poisoned");
        assets.insert(display_id, asset.clone());
        asset
    }

    /// Replace the writable fields of an existing asset. Server-owned fields
    /// are kept from the stored record.
    pub fn replace_asset(&self, display_id: i64, incoming: Asset) -> Option<Asset> {
        let mut assets = self.assets.write().expect("asset lock poisoned");
        let current = assets.get_mut(&display_id)?;
        let replaced = Asset {
            id: current.id,
            display_id: current.display_id,
            created_at: current.created_at.clone(),
            updated_at: now(),
            author_type: current.author_type.clone(),
            agent_id: current.agent_id,
            ..incoming
        };
        *current = replaced.clone();
        Some(replaced)
    }

    pub fn remove_asset(&self, display_id: i64) -> Option<Asset> {
        self.assets
            .write()
            .expect("asset lock poisoned")
            .remove(&display_id)
    }

    pub fn asset_types(&self) -> Vec<AssetType> {
        self.asset_types
            .read()
            .expect("asset type lock poisoned")
            .clone()
    }
}

/// Split `/asset_types/?per_page=600` into path and query.
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

fn query_param<'a>(query: Option<&'a str>, key: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// The routes the stub understands.
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    Assets,
    Asset(i64),
    AssetTypes,
    AssetType(i64),
    Health,
}

pub fn parse_route(path: &str) -> Option<Route> {
    let trimmed = path.trim_end_matches('/');
    match trimmed {
        "/assets" => return Some(Route::Assets),
        "/asset_types" => return Some(Route::AssetTypes),
        "/health" => return Some(Route::Health),
        _ => {}
    }
    if let Some(id) = trimmed.strip_prefix("/assets/") {
        return id.parse().ok().map(Route::Asset);
    }
    if let Some(id) = trimmed.strip_prefix("/asset_types/") {
        return id.parse().ok().map(Route::AssetType);
    }
    None
}

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid header")
}

fn respond_json(req: tiny_http::Request, code: u16, json: impl Into<Vec<u8>>) {
    let _ = req.respond(
        Response::from_data(json.into())
            .with_status_code(StatusCode(code))
            .with_header(json_header()),
    );
}

fn respond_err(req: tiny_http::Request, code: u16, msg: &str) {
    let body = serde_json::to_vec(&ErrorBody { description: msg }).unwrap_or_default();
    respond_json(req, code, body);
}

fn respond_value(req: tiny_http::Request, code: u16, value: &impl Serialize) {
    match serde_json::to_vec(value) {
        Ok(body) => respond_json(req, code, body),
        Err(e) => respond_err(req, 500, &format!("encode error: {e}")),
    }
}

fn read_body(req: &mut tiny_http::Request) -> Option<String> {
    let mut body = String::new();
    if req.as_reader().read_to_string(&mut body).is_ok() {
        Some(body)
    } else {
        None
    }
}

fn decode_asset_body(body: &str) -> Result<Asset, String> {
    let envelope: AssetEnvelope<Asset> =
        serde_json::from_str(body).map_err(|e| format!("invalid asset body: {e}"))?;
    let asset = envelope.asset;
    if asset.name.trim().is_empty() {
        return Err("name is required".to_owned());
    }
    if asset.asset_type_id == 0 {
        return Err("asset_type_id is required".to_owned());
    }
    Ok(asset)
}

fn handle_assets(store: &Store, req: tiny_http::Request, method: &Method, body: &str) {
    if *method != Method::Post {
        respond_err(req, 405, "method not allowed");
        return;
    }
    match decode_asset_body(body) {
        Ok(asset) => {
            let created = store.insert_asset(asset);
            info!("created asset {} ({})", created.display_id, created.name);
            respond_value(req, 201, &AssetEnvelope { asset: created });
        }
        Err(msg) => respond_err(req, 400, &msg),
    }
}

fn handle_asset(store: &Store, req: tiny_http::Request, method: &Method, id: i64, body: &str) {
    match *method {
        Method::Get => match store.asset(id) {
            Some(asset) => respond_value(req, 200, &AssetEnvelope { asset }),
            None => respond_err(req, 404, "asset not found"),
        },
        Method::Put => {
            let incoming = match decode_asset_body(body) {
                Ok(asset) => asset,
                Err(msg) => {
                    respond_err(req, 400, &msg);
                    return;
                }
            };
            match store.replace_asset(id, incoming) {
                Some(asset) => {
                    info!("updated asset {id}");
                    respond_value(req, 200, &AssetEnvelope { asset });
                }
                None => respond_err(req, 404, "asset not found"),
            }
        }
        Method::Delete => {
            if store.remove_asset(id).is_some() {
                info!("deleted asset {id}");
                let _ = req.respond(Response::empty(204));
            } else {
                respond_err(req, 404, "asset not found");
            }
        }
        _ => respond_err(req, 405, "method not allowed"),
    }
}

fn handle_asset_types(store: &Store, req: tiny_http::Request, method: &Method, query: Option<&str>) {
    if *method != Method::Get {
        respond_err(req, 405, "method not allowed");
        return;
    }
    // The real API defaults to 30 per page.
    let per_page = query_param(query, "per_page")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(30);
    let asset_types = store.asset_types().into_iter().take(per_page).collect();
    respond_value(req, 200, &AssetTypeListing { asset_types });
}

fn handle_asset_type(store: &Store, req: tiny_http::Request, method: &Method, id: i64) {
    if *method != Method::Get {
        respond_err(req, 405, "method not allowed");
        return;
    }
    match store.asset_types().into_iter().find(|t| t.id == id) {
        Some(asset_type) => respond_value(req, 200, &AssetTypeEnvelope { asset_type }),
        None => respond_err(req, 404, "asset type not found"),
    }
}

/// Handle a single HTTP request, dispatching to the appropriate route handler.
pub fn handle_request(store: &Store, mut req: tiny_http::Request) {
    let method = req.method().clone();
    let url = req.url().to_owned();
    debug!("{method} {url}");

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.field.as_str().as_str().to_ascii_lowercase(),
                h.value.as_str().to_owned(),
            )
        })
        .collect();
    let Some(body) = read_body(&mut req) else {
        respond_err(req, 400, "unreadable body");
        return;
    };
    let authorized = headers
        .get("authorization")
        .is_some_and(|v| v.starts_with("Basic "));
    store.record(RecordedRequest {
        method: method.as_str().to_owned(),
        url: url.clone(),
        headers,
        body: body.clone(),
    });

    if let Some(canned) = store.find_canned(method.as_str(), &url) {
        debug!("canned {} for {method} {url}", canned.status);
        respond_json(req, canned.status, canned.body);
        return;
    }

    let (path, query) = split_url(&url);
    match parse_route(path) {
        Some(Route::Health) => respond_json(req, 200, r#"{"status":"ok"}"#),
        Some(_) if !authorized => {
            warn!("{method} {url}: missing credentials");
            respond_err(req, 401, "authentication required");
        }
        Some(Route::Assets) => handle_assets(store, req, &method, &body),
        Some(Route::Asset(id)) => handle_asset(store, req, &method, id, &body),
        Some(Route::AssetTypes) => handle_asset_types(store, req, &method, query),
        Some(Route::AssetType(id)) => handle_asset_type(store, req, &method, id),
        None => respond_err(req, 404, "not found"),
    }
}

/// Start the server loop, blocking the current thread.
pub fn run_server(store: &Arc<Store>, addr: &str) -> Result<(), String> {
    let server = Server::http(addr).map_err(|e| format!("failed to bind {addr}: {e}"))?;
    for request in server.incoming_requests() {
        handle_request(store, request);
    }
    Ok(())
}

/// A test helper that starts a stub on a random port in a background thread.
///
/// The server listens on `127.0.0.1:{port}`. Drop the `TestServer` to stop it.
pub struct TestServer {
    pub url: String,
    pub port: u16,
    store: Arc<Store>,
    server: Arc<Server>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl TestServer {
    /// Start a stub seeded with [`default_asset_types`].
    pub fn start() -> Self {
        Self::start_with(Store::default())
    }

    pub fn start_with(store: Store) -> Self {
        let server =
            Arc::new(Server::http("127.0.0.1:0").expect("failed to bind test HTTP server"));
        let port = server.server_addr().to_ip().expect("not an IP addr").port();
        let url = format!("http://127.0.0.1:{port}");

        let store = Arc::new(store);
        let srv = Arc::clone(&server);
        let st = Arc::clone(&store);
        let handle = std::thread::spawn(move || {
            for request in srv.incoming_requests() {
                handle_request(&st, request);
            }
        });

        Self {
            url,
            port,
            store,
            server,
            handle: Some(handle),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Shorthand for [`Store::add_canned`].
    pub fn canned(&self, method: &str, url: &str, status: u16, body: &str) {
        self.store.add_canned(method, url, status, body);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.store.requests()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
