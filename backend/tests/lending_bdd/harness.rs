//! Server harness and shared world for the lending scenarios.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Dropping the `WorldFixture` stops the
//! server even when a step panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use awc::Client;
use library_backend::Trace;
use library_backend::domain::TRACE_ID_HEADER;
use library_backend::inbound::http::api_scope;
use library_backend::inbound::http::state::HttpState;
use library_backend::test_support::MutableClock;
use library_backend::test_support::library::demo_http_state;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

pub(crate) struct LendingWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) clock: Arc<MutableClock>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
    pub(crate) race_statuses: Vec<u16>,
}

pub(crate) type SharedWorld = Rc<RefCell<LendingWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

/// Drive `operation` on the world's runtime. The future must not borrow the
/// world because it stays borrowed for the duration of the call.
pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

pub(crate) struct CapturedResponse {
    pub(crate) status: u16,
    pub(crate) trace_id: Option<String>,
    pub(crate) body: Value,
}

pub(crate) async fn post_lending(
    base_url: &str,
    path: &str,
    member: &str,
    book: &str,
) -> CapturedResponse {
    let mut response = Client::default()
        .post(format!("{base_url}{path}"))
        .send_json(&json!({"member_id": member, "book_id": book}))
        .await
        .expect("lending request");
    let status = response.status().as_u16();
    let trace_id = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response.body().await.expect("body");
    CapturedResponse {
        status,
        trace_id,
        body: serde_json::from_slice(&body).expect("json body"),
    }
}

pub(crate) async fn get_json(base_url: &str, path: &str) -> Value {
    let mut response = Client::default()
        .get(format!("{base_url}{path}"))
        .send()
        .await
        .expect("listing request");
    assert_eq!(response.status().as_u16(), 200, "listing {path} failed");
    let body = response.body().await.expect("body");
    serde_json::from_slice(&body).expect("json body")
}

pub(crate) fn record_response(world: &SharedWorld, captured: CapturedResponse) {
    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(captured.status);
    ctx.last_trace_id = captured.trace_id;
    ctx.last_body = Some(captured.body);
}

async fn spawn_lending_server(state: HttpState) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Trace)
            .service(api_scope())
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let clock = Arc::new(MutableClock::at_library_opening());
    let state = demo_http_state(clock.clone());

    let (base_url, server) = local
        .block_on(&runtime, spawn_lending_server(state))
        .expect("server should start");

    WorldFixture {
        world: Rc::new(RefCell::new(LendingWorld {
            runtime,
            local,
            base_url,
            server,
            clock,
            last_status: None,
            last_body: None,
            last_trace_id: None,
            race_statuses: Vec::new(),
        })),
    }
}
