// tests/http_scenarios.rs
//
// End-to-end request flows against the in-memory backing, local publishing and
// a deterministic PDF engine.

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web as actix_data, App};
use gestion_api::{web, AppConfig, AppState};
use gestion_core::document::{DocumentGenerator, PdfEngine, PlanillaDocument};
use gestion_core::models::{Role, User};
use gestion_core::persistence::Persistence;
use gestion_core::publisher::{DocumentPublisher, LocalFileStore};
use gestion_core::seed::DEMO_USERS;
use gestion_core::tokens::TokenService;
use gestion_core::CoreResult;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

const PUBLIC_BASE: &str = "http://api.test";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

struct TextPdf;

impl PdfEngine for TextPdf {
  fn render(&self, document: &PlanillaDocument) -> CoreResult<Vec<u8>> {
    let mut out = b"%PDF-1.4\n".to_vec();
    for line in document.lines() {
      out.extend_from_slice(line.text.as_bytes());
      out.push(b'\n');
    }
    Ok(out)
  }
}

/// Middleware may reject with an error instead of a response.
fn status_of<B>(result: Result<actix_web::dev::ServiceResponse<B>, actix_web::Error>) -> StatusCode {
  match result {
    Ok(resp) => resp.status(),
    Err(err) => err.error_response().status(),
  }
}

struct Fixture {
  state: AppState,
  dir: TempDir,
}

impl Fixture {
  fn new() -> Self {
    Self::with_vars(&[])
  }

  fn with_vars(extra: &[(&'static str, &str)]) -> Self {
    Lazy::force(&TRACING_INIT);
    let dir = TempDir::new().unwrap();
    let mut vars: HashMap<&str, String> = [
      ("JWT_SECRET", "test-secret".to_string()),
      ("FILE_STORAGE_DIR", dir.path().join("pdfs").display().to_string()),
      ("PUBLIC_DIR", dir.path().join("public").display().to_string()),
      ("API_PUBLIC_BASE", PUBLIC_BASE.to_string()),
    ]
    .into_iter()
    .collect();
    vars.extend(extra.iter().map(|(k, v)| (*k, v.to_string())));
    let config = AppConfig::from_source(|name| vars.get(name).cloned()).unwrap();

    let tokens = Arc::new(TokenService::new(&config.jwt_secret));
    let local = LocalFileStore::new(config.file_storage_dir.clone(), config.api_public_base.clone(), tokens.clone());
    let state = AppState::assemble(
      config,
      Persistence::memory().unwrap(),
      tokens,
      DocumentGenerator::new(Arc::new(TextPdf)),
      DocumentPublisher::new(local, None),
    );
    Self { state, dir }
  }

  fn bearer(&self, role: Role) -> (header::HeaderName, String) {
    let demo = DEMO_USERS.iter().find(|u| u.role == role).unwrap();
    let user = User {
      id: demo.id.to_string(),
      email: demo.email.to_string(),
      name: demo.name.to_string(),
      role,
      password_hash: String::new(),
    };
    let pair = self.state.tokens().issue_pair(&user).unwrap();
    (header::AUTHORIZATION, format!("Bearer {}", pair.access_token))
  }
}

macro_rules! app {
  ($fixture:expr) => {
    test::init_service(
      App::new()
        .app_data(actix_data::Data::new($fixture.state.clone()))
        .configure(web::configure),
    )
    .await
  };
}

#[actix_web::test]
async fn health_reports_memory_mode() {
  let fixture = Fixture::new();
  let app = app!(fixture);
  let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({"ok": true, "service": "gestion-financiera-api-v2", "dbEnabled": false}));
}

#[actix_web::test]
async fn login_token_identifies_user_and_refresh_token_does_not() {
  let fixture = Fixture::new();
  let app = app!(fixture);

  let login = test::TestRequest::post()
    .uri("/api/v1/auth/login")
    .set_json(json!({"email": "operador@hardsoft.local", "password": "123456"}))
    .to_request();
  let resp = test::call_service(&app, login).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["user"], json!({"id": "u2", "email": "operador@hardsoft.local", "role": "operador", "name": "Operador Demo"}));
  let access = body["access_token"].as_str().unwrap().to_string();
  let refresh = body["refresh_token"].as_str().unwrap().to_string();

  let me = test::TestRequest::get()
    .uri("/api/v1/me")
    .insert_header((header::AUTHORIZATION, format!("Bearer {}", access)))
    .to_request();
  let resp = test::call_service(&app, me).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["user"]["sub"], "u2");
  assert_eq!(body["user"]["role"], "operador");

  for token in [refresh.as_str(), "garbage"] {
    let req = test::TestRequest::get()
      .uri("/api/v1/me")
      .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/planillas").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "No autenticado");

  let refreshed = test::TestRequest::post()
    .uri("/api/v1/auth/refresh")
    .set_json(json!({"refresh_token": refresh}))
    .to_request();
  let resp = test::call_service(&app, refreshed).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let logout = test::TestRequest::post().uri("/api/v1/auth/logout").to_request();
  assert_eq!(test::call_service(&app, logout).await.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn login_failures() {
  let fixture = Fixture::new();
  let app = app!(fixture);

  let wrong = test::TestRequest::post()
    .uri("/api/v1/auth/login")
    .set_json(json!({"email": "admin@hardsoft.local", "password": "nope"}))
    .to_request();
  let resp = test::call_service(&app, wrong).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Credenciales inválidas");

  let malformed = test::TestRequest::post()
    .uri("/api/v1/auth/login")
    .set_json(json!({"email": "admin"}))
    .to_request();
  assert_eq!(test::call_service(&app, malformed).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn planilla_lifecycle_respects_roles() {
  let fixture = Fixture::new();
  let app = app!(fixture);
  let payload = json!({"cliente": "Acme", "proyecto": "X", "monto_bruto_usd": 100.5});

  let create = test::TestRequest::post()
    .uri("/api/v1/planillas")
    .insert_header(fixture.bearer(Role::Operador))
    .set_json(&payload)
    .to_request();
  let resp = test::call_service(&app, create).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  assert_eq!(created["correlativo"], "0002");
  assert_eq!(created["monto_bruto_usd"], json!(100.5));
  let id = created["id"].as_str().unwrap().to_string();

  let denied = test::TestRequest::post()
    .uri("/api/v1/planillas")
    .insert_header(fixture.bearer(Role::Consulta))
    .set_json(&payload)
    .to_request();
  let resp = test::call_service(&app, denied).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Sin permisos para escribir");

  let delete_as_operador = test::TestRequest::delete()
    .uri(&format!("/api/v1/planillas/{}", id))
    .insert_header(fixture.bearer(Role::Operador))
    .to_request();
  assert_eq!(test::call_service(&app, delete_as_operador).await.status(), StatusCode::FORBIDDEN);

  let delete_as_admin = test::TestRequest::delete()
    .uri(&format!("/api/v1/planillas/{}", id))
    .insert_header(fixture.bearer(Role::AdminGerente))
    .to_request();
  assert_eq!(test::call_service(&app, delete_as_admin).await.status(), StatusCode::NO_CONTENT);

  let get = test::TestRequest::get()
    .uri(&format!("/api/v1/planillas/{}", id))
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  assert_eq!(test::call_service(&app, get).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn updates_are_partial_and_missing_ids_404() {
  let fixture = Fixture::new();
  let app = app!(fixture);

  let update = test::TestRequest::put()
    .uri("/api/v1/planillas/pln_001")
    .insert_header(fixture.bearer(Role::Operador))
    .set_json(json!({"proyecto": "Fase 2"}))
    .to_request();
  let resp = test::call_service(&app, update).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["proyecto"], "Fase 2");
  assert_eq!(body["cliente"], "Fundación Pacífico C.A.");
  assert_eq!(body["monto_bruto_usd"], json!(1680.56));

  let missing = test::TestRequest::put()
    .uri("/api/v1/planillas/pln_404")
    .insert_header(fixture.bearer(Role::Operador))
    .set_json(json!({"proyecto": "Fase 2"}))
    .to_request();
  assert_eq!(test::call_service(&app, missing).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn invalid_bodies_and_queries_are_422() {
  let fixture = Fixture::new();
  let app = app!(fixture);

  let negative = test::TestRequest::post()
    .uri("/api/v1/planillas")
    .insert_header(fixture.bearer(Role::Operador))
    .set_json(json!({"cliente": "Acme", "proyecto": "X", "monto_bruto_usd": -5}))
    .to_request();
  let resp = test::call_service(&app, negative).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Payload inválido");

  let malformed = test::TestRequest::post()
    .uri("/api/v1/planillas")
    .insert_header(fixture.bearer(Role::Operador))
    .insert_header((header::CONTENT_TYPE, "application/json"))
    .set_payload("{not json")
    .to_request();
  assert_eq!(test::call_service(&app, malformed).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let wrong_type = test::TestRequest::post()
    .uri("/api/v1/tasas")
    .insert_header(fixture.bearer(Role::Operador))
    .set_json(json!({"bcv": "mucho", "paralela": 1}))
    .to_request();
  assert_eq!(test::call_service(&app, wrong_type).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let bad_page = test::TestRequest::get()
    .uri("/api/v1/planillas?page=0")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  assert_eq!(test::call_service(&app, bad_page).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let bad_limit = test::TestRequest::get()
    .uri("/api/v1/planillas?limit=abc")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  assert_eq!(test::call_service(&app, bad_limit).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let far_page = test::TestRequest::get()
    .uri("/api/v1/planillas?page=9223372036854775807")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  assert_eq!(test::call_service(&app, far_page).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn read_only_callers_get_403_before_body_validation() {
  let fixture = Fixture::new();
  let app = app!(fixture);

  let malformed = test::TestRequest::post()
    .uri("/api/v1/planillas")
    .insert_header(fixture.bearer(Role::Consulta))
    .insert_header((header::CONTENT_TYPE, "application/json"))
    .set_payload("{not json")
    .to_request();
  let resp = test::call_service(&app, malformed).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Sin permisos para escribir");

  let wrong_type = test::TestRequest::put()
    .uri("/api/v1/tasas/rate_001")
    .insert_header(fixture.bearer(Role::Consulta))
    .set_json(json!({"bcv": "mucho"}))
    .to_request();
  assert_eq!(test::call_service(&app, wrong_type).await.status(), StatusCode::FORBIDDEN);

  let update = test::TestRequest::put()
    .uri("/api/v1/planillas/pln_001")
    .insert_header(fixture.bearer(Role::Consulta))
    .set_payload("")
    .to_request();
  assert_eq!(test::call_service(&app, update).await.status(), StatusCode::FORBIDDEN);

  // Writers still see the validation failure.
  let writer = test::TestRequest::put()
    .uri("/api/v1/tasas/rate_001")
    .insert_header(fixture.bearer(Role::Operador))
    .set_json(json!({"bcv": "mucho"}))
    .to_request();
  assert_eq!(test::call_service(&app, writer).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn cors_allows_only_configured_origins() {
  let fixture = Fixture::with_vars(&[("CORS_ORIGINS", "https://panel.example")]);
  let app = test::init_service(
    App::new()
      .app_data(actix_data::Data::new(fixture.state.clone()))
      .wrap(web::cors(&fixture.state.config.cors_origins))
      .configure(web::configure),
  )
  .await;

  let preflight = test::TestRequest::default()
    .method(actix_web::http::Method::OPTIONS)
    .uri("/api/v1/planillas")
    .insert_header((header::ORIGIN, "https://panel.example"))
    .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
    .to_request();
  let resp = test::call_service(&app, preflight).await;
  assert!(resp.status().is_success());
  assert_eq!(
    resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
    "https://panel.example"
  );

  let foreign = test::TestRequest::default()
    .method(actix_web::http::Method::OPTIONS)
    .uri("/api/v1/planillas")
    .insert_header((header::ORIGIN, "https://elsewhere.example"))
    .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
    .to_request();
  match test::try_call_service(&app, foreign).await {
    Ok(resp) => assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none()),
    Err(err) => assert!(err.error_response().status().is_client_error()),
  }

  // Same-origin and non-browser clients send no Origin.
  let plain = test::TestRequest::get().uri("/health").to_request();
  assert_eq!(test::call_service(&app, plain).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn any_origin_by_default() {
  let fixture = Fixture::new();
  let app = test::init_service(
    App::new()
      .app_data(actix_data::Data::new(fixture.state.clone()))
      .wrap(web::cors(&fixture.state.config.cors_origins))
      .configure(web::configure),
  )
  .await;
  let req = test::TestRequest::get()
    .uri("/health")
    .insert_header((header::ORIGIN, "https://anywhere.example"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_some());
}

#[actix_web::test]
async fn clients_over_the_request_budget_get_429() {
  let fixture = Fixture::with_vars(&[("RATE_LIMIT_MAX", "2"), ("RATE_LIMIT_WINDOW", "1 hour")]);
  let limit = fixture.state.config.rate_limit;
  let governor_config = GovernorConfigBuilder::default()
    .period(limit.replenish_period())
    .burst_size(limit.max)
    .finish()
    .unwrap();
  let app = test::init_service(
    App::new()
      .app_data(actix_data::Data::new(fixture.state.clone()))
      .wrap(Governor::new(&governor_config))
      .configure(web::configure),
  )
  .await;

  let from = |ip: &str| {
    test::TestRequest::get()
      .uri("/health")
      .peer_addr(format!("{}:40000", ip).parse().unwrap())
      .to_request()
  };
  let mut statuses = Vec::new();
  // Budgets are per client address: the last request comes from another one.
  for ip in ["198.51.100.7", "198.51.100.7", "198.51.100.7", "198.51.100.8"] {
    statuses.push(status_of(test::try_call_service(&app, from(ip)).await));
  }
  assert_eq!(
    statuses,
    vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS, StatusCode::OK]
  );
}

#[actix_web::test]
async fn listing_filters_and_paginates() {
  let fixture = Fixture::new();
  let app = app!(fixture);
  for cliente in ["ACME Corp", "Globex"] {
    let req = test::TestRequest::post()
      .uri("/api/v1/planillas")
      .insert_header(fixture.bearer(Role::AdminGerente))
      .set_json(json!({"cliente": cliente, "proyecto": "P", "monto_bruto_usd": 1}))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
  }

  let req = test::TestRequest::get()
    .uri("/api/v1/planillas?cliente=acme")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["total"], 1);
  assert_eq!(body["items"][0]["cliente"], "ACME Corp");
  assert_eq!(body["page"], 1);
  assert_eq!(body["limit"], 20);

  let req = test::TestRequest::get()
    .uri("/api/v1/planillas?page=2&limit=2")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["total"], 3);
  assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn tasas_crud_for_writers() {
  let fixture = Fixture::new();
  let app = app!(fixture);

  let create = test::TestRequest::post()
    .uri("/api/v1/tasas")
    .insert_header(fixture.bearer(Role::Operador))
    .set_json(json!({"bcv": 36.5, "paralela": 38.9}))
    .to_request();
  let resp = test::call_service(&app, create).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  assert_eq!(created["fuente"], "manual");
  assert_eq!(created["bcv"], json!(36.5));
  let id = created["id"].as_str().unwrap().to_string();

  let list = test::TestRequest::get()
    .uri("/api/v1/tasas")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, list).await;
  assert_eq!(body["total"], 2);

  let update = test::TestRequest::put()
    .uri(&format!("/api/v1/tasas/{}", id))
    .insert_header(fixture.bearer(Role::Operador))
    .set_json(json!({"paralela": 39.25}))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, update).await;
  assert_eq!(body["paralela"], json!(39.25));
  assert_eq!(body["bcv"], json!(36.5));

  let delete = test::TestRequest::delete()
    .uri(&format!("/api/v1/tasas/{}", id))
    .insert_header(fixture.bearer(Role::Operador))
    .to_request();
  assert_eq!(test::call_service(&app, delete).await.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn auditoria_requires_reader_role() {
  let fixture = Fixture::new();
  let app = app!(fixture);

  let denied = test::TestRequest::get()
    .uri("/api/v1/auditoria")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  let resp = test::call_service(&app, denied).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Sin permisos para ver auditoría");

  let allowed = test::TestRequest::get()
    .uri("/api/v1/auditoria?recurso=planilla&limit=50")
    .insert_header(fixture.bearer(Role::Operador))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, allowed).await;
  assert_eq!(body, json!({"items": [], "total": 0}));

  // In-memory mode has no audit trail, so the filters are never parsed.
  let unparsed = test::TestRequest::get()
    .uri("/api/v1/auditoria?from=31-12-2026")
    .insert_header(fixture.bearer(Role::AdminGerente))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, unparsed).await;
  assert_eq!(body, json!({"items": [], "total": 0}));

  let bad_limit = test::TestRequest::get()
    .uri("/api/v1/auditoria?limit=many")
    .insert_header(fixture.bearer(Role::AdminGerente))
    .to_request();
  assert_eq!(test::call_service(&app, bad_limit).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn pdf_download_and_local_publish_round_trip() {
  let fixture = Fixture::new();
  let app = app!(fixture);

  let download = test::TestRequest::get()
    .uri("/api/v1/planillas/0001/pdf")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  let resp = test::call_service(&app, download).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
  assert_eq!(
    resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
    "inline; filename=planilla_0001.pdf"
  );
  let rendered = test::read_body(resp).await;
  assert!(rendered.starts_with(b"%PDF"));

  let denied = test::TestRequest::post()
    .uri("/api/v1/planillas/0001/pdf/publish")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  assert_eq!(test::call_service(&app, denied).await.status(), StatusCode::FORBIDDEN);

  let publish = test::TestRequest::post()
    .uri("/api/v1/planillas/pln_001/pdf/publish")
    .insert_header(fixture.bearer(Role::Operador))
    .to_request();
  let resp = test::call_service(&app, publish).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["storageMode"], "local");
  assert_eq!(body["expiresIn"], "24h");
  let file_name = body["fileName"].as_str().unwrap();
  assert!(file_name.starts_with("planilla_0001_"));
  assert!(fixture.dir.path().join("pdfs").join(file_name).exists());

  let signed_url = body["signedUrl"].as_str().unwrap();
  let path = signed_url.strip_prefix(PUBLIC_BASE).unwrap();
  assert!(path.starts_with("/api/v1/files/pdf/"));

  // No bearer token needed: the URL itself is the capability.
  let fetch = test::TestRequest::get().uri(path).to_request();
  let resp = test::call_service(&app, fetch).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
  let fetched = test::read_body(resp).await;
  assert_eq!(fetched, rendered);

  let missing = test::TestRequest::get()
    .uri("/api/v1/planillas/9999/pdf")
    .insert_header(fixture.bearer(Role::Consulta))
    .to_request();
  let resp = test::call_service(&app, missing).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Planilla no encontrada");

  let forged = test::TestRequest::get().uri("/api/v1/files/pdf/not-a-token").to_request();
  assert_eq!(test::call_service(&app, forged).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn landing_page_is_served_when_present() {
  let fixture = Fixture::new();
  let app = app!(fixture);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  std::fs::create_dir_all(fixture.dir.path().join("public")).unwrap();
  std::fs::write(fixture.dir.path().join("public").join("index.html"), "<h1>Planillas</h1>").unwrap();
  let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(test::read_body(resp).await, "<h1>Planillas</h1>".as_bytes());
}
