// api/src/web/handlers/mod.rs

pub mod audit_handlers;
pub mod auth_handlers;
pub mod file_handlers;
pub mod planilla_handlers;
pub mod site_handlers;
pub mod tasa_handlers;
