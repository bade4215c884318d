//! Fake swap-matching backend served by actix-web on an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use permuta_client::{ApiClient, ClientConfig, Session};
use serde_json::{Value, json};

pub type Shared = web::Data<Mutex<BackendState>>;

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub institution: Option<i64>,
    pub desired: Vec<i64>,
    pub nearby: bool,
}

#[derive(Debug, Clone)]
pub struct StoredRequest {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub user: i64,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub accounts: Vec<Account>,
    pub tokens: HashMap<String, i64>,
    pub requests: Vec<StoredRequest>,
    pub photos: HashMap<i64, Vec<u8>>,
    pub request_ids: Vec<String>,
    pub put_bodies: Vec<Value>,
    pub uploads: Vec<Upload>,
    pub hits: usize,
}

impl BackendState {
    fn observe(&mut self, req: &HttpRequest) {
        self.hits += 1;
        if let Some(id) = req
            .headers()
            .get("X-Request-ID")
            .and_then(|v| v.to_str().ok())
        {
            self.request_ids.push(id.to_string());
        }
    }

    /// Caller's user id, or the 401 to send back
    fn authenticate(&mut self, req: &HttpRequest) -> Result<i64, HttpResponse> {
        self.observe(req);
        req.headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.get(token).copied())
            .ok_or_else(|| {
                HttpResponse::Unauthorized().json(json!({ "message": "Token inválido" }))
            })
    }

    fn account(&self, id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn summary(&self, id: i64) -> Value {
        match self.account(id) {
            Some(a) => json!({
                "id": a.id,
                "nome": a.name,
                "email": a.email,
                "cargo": a.role,
                "instituicao": a.institution.map(|i| json!({ "nome": format!("Escola {i}") })),
            }),
            None => Value::Null,
        }
    }

    fn request_json(&self, r: &StoredRequest) -> Value {
        json!({
            "id": r.id,
            "usuarioSolicitante": self.summary(r.from),
            "usuarioAlvo": self.summary(r.to),
            "usuarioId_solicitante": r.from,
            "usuarioId_alvo": r.to,
            "status": r.status,
        })
    }
}

pub struct Backend {
    pub state: Shared,
    pub base_url: String,
}

impl Backend {
    pub async fn start() -> Self {
        let state: Shared = web::Data::new(Mutex::new(BackendState::default()));
        let data = state.clone();

        let server = HttpServer::new(move || App::new().app_data(data.clone()).configure(routes))
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .expect("bind fake backend");
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        Self {
            state,
            base_url: format!("http://{addr}"),
        }
    }

    pub fn client(&self, session: Session) -> ApiClient {
        let config = ClientConfig {
            base_url: self.base_url.clone(),
            ..Default::default()
        };
        ApiClient::new(config, session, None).expect("client")
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    /// Seed an account directly and return a session already logged into it
    pub fn seed_user(&self, id: i64, name: &str, email: &str) -> Session {
        let token = format!("token-{id}");
        self.with(|s| {
            s.accounts.push(Account {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password: "segredo123".to_string(),
                role: Some("Professor".to_string()),
                institution: Some(1),
                desired: Vec::new(),
                nearby: false,
            });
            s.tokens.insert(token.clone(), id);
        });
        let session = Session::in_memory();
        session.establish(&token).unwrap();
        session
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/autorizacoes/login", web::post().to(login))
        .route("/autorizacoes/register", web::post().to(register))
        .route("/autorizacoes/me", web::get().to(me))
        .route("/instituicoes", web::get().to(institutions))
        .route("/usuarios", web::get().to(list_users))
        .route("/usuarios/{id}", web::put().to(update_user))
        .route("/usuarios/{id}/foto", web::get().to(photo))
        .route("/usuarios/{id}/upload", web::post().to(upload))
        .route("/solicitacoes", web::post().to(send_request))
        .route("/solicitacoes/contatos/{id}", web::get().to(contacts))
        .route("/solicitacoes/{id}", web::get().to(pending))
        .route("/solicitacoes/{id}", web::put().to(resolve))
        .route("/notificacoes/count", web::get().to(notification_count));
}

async fn login(req: HttpRequest, state: Shared, body: web::Json<Value>) -> HttpResponse {
    let mut s = state.lock().unwrap();
    s.observe(&req);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["senha"].as_str().unwrap_or_default();

    let Some(account) = s
        .accounts
        .iter()
        .find(|a| a.email == email && a.password == password)
        .cloned()
    else {
        return HttpResponse::Unauthorized().json(json!({ "message": "Credenciais inválidas" }));
    };
    let token = format!("token-{}", account.id);
    s.tokens.insert(token.clone(), account.id);
    HttpResponse::Ok().json(json!({
        "access_token": token,
        "id": account.id,
        "nome": account.name,
    }))
}

async fn register(req: HttpRequest, state: Shared, body: web::Json<Value>) -> HttpResponse {
    let mut s = state.lock().unwrap();
    s.observe(&req);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if s.accounts.iter().any(|a| a.email == email) {
        return HttpResponse::BadRequest()
            .json(json!({ "message": ["email já cadastrado", "tente outro"] }));
    }
    let id = s.accounts.len() as i64 + 1;
    s.accounts.push(Account {
        id,
        name: body["nome"].as_str().unwrap_or_default().to_string(),
        email,
        password: body["senha"].as_str().unwrap_or_default().to_string(),
        role: body["cargo"].as_str().map(str::to_string),
        institution: None,
        desired: Vec::new(),
        nearby: false,
    });
    HttpResponse::Created().json(s.summary(id))
}

async fn me(req: HttpRequest, state: Shared) -> HttpResponse {
    let mut s = state.lock().unwrap();
    let id = match s.authenticate(&req) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Some(a) = s.account(id) else {
        return HttpResponse::NotFound().finish();
    };
    HttpResponse::Ok().json(json!({
        "id": a.id,
        "nome": a.name,
        "email": a.email,
        "cargo": a.role,
        "instituicaoId": a.institution,
        "instituicoesDestino": a.desired,
        "aceitaProximas": a.nearby,
        "createdAt": "2024-03-05T12:00:00Z",
    }))
}

async fn institutions(req: HttpRequest, state: Shared) -> HttpResponse {
    let mut s = state.lock().unwrap();
    if let Err(resp) = s.authenticate(&req) {
        return resp;
    }
    HttpResponse::Ok().json(json!([
        { "id": 1, "nome": "Escola 1" },
        { "id": 2, "nome": "Escola 2" },
        { "id": 3, "nome": "Escola 3" },
    ]))
}

async fn list_users(req: HttpRequest, state: Shared) -> HttpResponse {
    let mut s = state.lock().unwrap();
    if let Err(resp) = s.authenticate(&req) {
        return resp;
    }
    let users: Vec<Value> = s.accounts.iter().map(|a| s.summary(a.id)).collect();
    HttpResponse::Ok().json(users)
}

async fn update_user(
    req: HttpRequest,
    state: Shared,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut s = state.lock().unwrap();
    if let Err(resp) = s.authenticate(&req) {
        return resp;
    }
    let id = path.into_inner();
    let body = body.into_inner();
    s.put_bodies.push(body.clone());

    let Some(account) = s.accounts.iter_mut().find(|a| a.id == id) else {
        return HttpResponse::NotFound().finish();
    };
    if let Some(name) = body["nome"].as_str() {
        account.name = name.to_string();
    }
    if let Some(email) = body["email"].as_str() {
        account.email = email.to_string();
    }
    if let Some(password) = body["senha"].as_str() {
        account.password = password.to_string();
    }
    if let Some(role) = body["cargo"].as_str() {
        account.role = Some(role.to_string());
    }
    if let Some(institution) = body["instituicaoId"].as_i64() {
        account.institution = Some(institution);
    }
    if let Some(desired) = body["instituicoesDestino"].as_array() {
        account.desired = desired.iter().filter_map(Value::as_i64).collect();
    }
    if let Some(nearby) = body["aceitaProximas"].as_bool() {
        account.nearby = nearby;
    }
    HttpResponse::Ok().json(json!({ "ok": true }))
}

async fn photo(req: HttpRequest, state: Shared, path: web::Path<i64>) -> HttpResponse {
    let mut s = state.lock().unwrap();
    if let Err(resp) = s.authenticate(&req) {
        return resp;
    }
    match s.photos.get(&path.into_inner()) {
        Some(bytes) => HttpResponse::Ok()
            .content_type("image/png")
            .body(bytes.clone()),
        None => HttpResponse::NotFound().json(json!({ "message": "Foto não encontrada" })),
    }
}

async fn upload(
    req: HttpRequest,
    state: Shared,
    path: web::Path<i64>,
    body: web::Bytes,
) -> HttpResponse {
    let mut s = state.lock().unwrap();
    if let Err(resp) = s.authenticate(&req) {
        return resp;
    }
    let user = path.into_inner();
    let content_type = req
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    s.uploads.push(Upload {
        user,
        content_type,
        body: body.to_vec(),
    });
    s.photos.insert(user, b"uploaded-image".to_vec());
    HttpResponse::Ok().json(json!({ "ok": true }))
}

async fn send_request(req: HttpRequest, state: Shared, body: web::Json<Value>) -> HttpResponse {
    let mut s = state.lock().unwrap();
    if let Err(resp) = s.authenticate(&req) {
        return resp;
    }
    let id = s.requests.len() as i64 + 1;
    let request = StoredRequest {
        id,
        from: body["usuarioId_solicitante"].as_i64().unwrap_or_default(),
        to: body["usuarioId_alvo"].as_i64().unwrap_or_default(),
        status: "Pendente".to_string(),
    };
    let created = s.request_json(&request);
    s.requests.push(request);
    HttpResponse::Created().json(created)
}

async fn pending(req: HttpRequest, state: Shared, path: web::Path<i64>) -> HttpResponse {
    let mut s = state.lock().unwrap();
    if let Err(resp) = s.authenticate(&req) {
        return resp;
    }
    let user = path.into_inner();
    let rows: Vec<Value> = s
        .requests
        .iter()
        .filter(|r| r.to == user && r.status == "Pendente")
        .map(|r| s.request_json(r))
        .collect();
    HttpResponse::Ok().json(rows)
}

async fn resolve(
    req: HttpRequest,
    state: Shared,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut s = state.lock().unwrap();
    if let Err(resp) = s.authenticate(&req) {
        return resp;
    }
    let id = path.into_inner();
    let status = body["status"].as_str().unwrap_or_default().to_string();
    match s.requests.iter_mut().find(|r| r.id == id) {
        Some(request) => {
            request.status = status;
            HttpResponse::Ok().json(json!({ "ok": true }))
        }
        None => HttpResponse::NotFound().json(json!({ "message": "Solicitação não encontrada" })),
    }
}

async fn contacts(req: HttpRequest, state: Shared, path: web::Path<i64>) -> HttpResponse {
    let mut s = state.lock().unwrap();
    if let Err(resp) = s.authenticate(&req) {
        return resp;
    }
    let user = path.into_inner();
    let rows: Vec<Value> = s
        .requests
        .iter()
        .filter(|r| r.status == "Aceita" && (r.from == user || r.to == user))
        .map(|r| s.request_json(r))
        .collect();
    HttpResponse::Ok().json(rows)
}

async fn notification_count(req: HttpRequest, state: Shared) -> HttpResponse {
    let mut s = state.lock().unwrap();
    let user = match s.authenticate(&req) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let count = s
        .requests
        .iter()
        .filter(|r| r.to == user && r.status == "Pendente")
        .count();
    HttpResponse::Ok().json(json!({ "count": count }))
}
