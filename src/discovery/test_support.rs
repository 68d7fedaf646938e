//! 테스트용 인메모리 레지스트리
//!
//! `127.0.0.1:0`에 바인딩한 actix-web 서버로 Eureka REST API의 일부를 흉내냅니다.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{App, HttpResponse, HttpServer, web};
use serde_json::{Value, json};

#[derive(Default)]
struct RegistryState {
    instances: Mutex<BTreeMap<(String, String), Value>>,
    renewals: AtomicUsize,
    deregistrations: AtomicUsize,
    reject_registrations: AtomicBool,
}

pub struct FakeRegistry {
    addr: SocketAddr,
    state: Arc<RegistryState>,
}

impl FakeRegistry {
    pub async fn start() -> Self {
        let state = Arc::new(RegistryState::default());
        let data = web::Data::from(state.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/eureka/apps/{app}", web::post().to(register))
                .route("/eureka/apps/{app}", web::get().to(list))
                .route("/eureka/apps/{app}/{id}", web::put().to(renew))
                .route("/eureka/apps/{app}/{id}", web::delete().to(deregister))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .expect("fake registry bind");

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        Self { addr, state }
    }

    /// 연결이 거부되는 주소
    pub fn unreachable_url() -> String {
        "http://127.0.0.1:1/eureka/".to_string()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/eureka/", self.addr)
    }

    pub fn contains(&self, app: &str, instance_id: &str) -> bool {
        self.state
            .instances
            .lock()
            .unwrap()
            .contains_key(&(app.to_string(), instance_id.to_string()))
    }

    pub fn registered_count(&self) -> usize {
        self.state.instances.lock().unwrap().len()
    }

    pub fn renewals(&self) -> usize {
        self.state.renewals.load(Ordering::SeqCst)
    }

    pub fn deregistrations(&self) -> usize {
        self.state.deregistrations.load(Ordering::SeqCst)
    }

    pub fn reject_registrations(&self, reject: bool) {
        self.state.reject_registrations.store(reject, Ordering::SeqCst);
    }

    /// lease 만료를 흉내내기 위해 레코드를 직접 지웁니다.
    pub fn evict_all(&self) {
        self.state.instances.lock().unwrap().clear();
    }
}

async fn register(
    state: web::Data<RegistryState>,
    app: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    if state.reject_registrations.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().body("registry is read-only");
    }

    let instance = body.into_inner()["instance"].clone();
    let Some(id) = instance["instanceId"].as_str().map(str::to_string) else {
        return HttpResponse::BadRequest().finish();
    };

    state
        .instances
        .lock()
        .unwrap()
        .insert((app.into_inner(), id), instance);
    HttpResponse::NoContent().finish()
}

async fn renew(state: web::Data<RegistryState>, path: web::Path<(String, String)>) -> HttpResponse {
    if state.instances.lock().unwrap().contains_key(&path.into_inner()) {
        state.renewals.fetch_add(1, Ordering::SeqCst);
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::NotFound().finish()
    }
}

async fn deregister(state: web::Data<RegistryState>, path: web::Path<(String, String)>) -> HttpResponse {
    state.deregistrations.fetch_add(1, Ordering::SeqCst);
    match state.instances.lock().unwrap().remove(&path.into_inner()) {
        Some(_) => HttpResponse::Ok().finish(),
        None => HttpResponse::NotFound().finish(),
    }
}

async fn list(state: web::Data<RegistryState>, app: web::Path<String>) -> HttpResponse {
    let app = app.into_inner();
    let instances: Vec<Value> = state
        .instances
        .lock()
        .unwrap()
        .iter()
        .filter(|((name, _), _)| *name == app)
        .map(|(_, instance)| instance.clone())
        .collect();

    if instances.is_empty() {
        HttpResponse::NotFound().finish()
    } else {
        HttpResponse::Ok().json(json!({
            "application": { "name": app, "instance": instances }
        }))
    }
}
