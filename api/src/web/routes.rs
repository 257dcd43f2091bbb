// api/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  audit_handlers, auth_handlers, file_handlers, planilla_handlers, site_handlers, tasa_handlers,
};

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(site_handlers::health_check_handler))
    .route("/", web::get().to(site_handlers::index_handler))
    .service(
      web::scope("/api/v1") // Base path for API version 1
        .service(
          web::scope("/auth")
            .route("/login", web::post().to(auth_handlers::login_handler))
            .route("/refresh", web::post().to(auth_handlers::refresh_handler))
            .route("/logout", web::post().to(auth_handlers::logout_handler)),
        )
        .route("/me", web::get().to(auth_handlers::me_handler))
        .service(
          web::scope("/planillas")
            .route("", web::get().to(planilla_handlers::list_planillas_handler))
            .route("", web::post().to(planilla_handlers::create_planilla_handler))
            .route("/{id}", web::get().to(planilla_handlers::get_planilla_handler))
            .route("/{id}", web::put().to(planilla_handlers::update_planilla_handler))
            .route("/{id}", web::delete().to(planilla_handlers::delete_planilla_handler))
            .route("/{id}/pdf", web::get().to(planilla_handlers::planilla_pdf_handler))
            .route(
              "/{id}/pdf/publish",
              web::post().to(planilla_handlers::publish_planilla_pdf_handler),
            ),
        )
        .service(
          web::scope("/tasas")
            .route("", web::get().to(tasa_handlers::list_tasas_handler))
            .route("", web::post().to(tasa_handlers::create_tasa_handler))
            .route("/{id}", web::put().to(tasa_handlers::update_tasa_handler))
            .route("/{id}", web::delete().to(tasa_handlers::delete_tasa_handler)),
        )
        .route("/auditoria", web::get().to(audit_handlers::list_audit_handler))
        .route("/files/pdf/{token}", web::get().to(file_handlers::download_pdf_handler)),
    );
}
