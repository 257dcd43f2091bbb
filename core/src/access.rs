// core/src/access.rs

//! Role to permission mapping.
//!
//! Tasa deletion only needs `Write`; planilla deletion needs `DeletePlanilla`,
//! which only `admin_gerente` holds.

use crate::error::{CoreError, CoreResult};
use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
  Write,
  DeletePlanilla,
  ReadAudit,
}

impl Permission {
  fn denial_message(&self) -> &'static str {
    match self {
      Permission::Write => "Sin permisos para escribir",
      Permission::DeletePlanilla => "Sin permisos para eliminar planillas",
      Permission::ReadAudit => "Sin permisos para ver auditoría",
    }
  }
}

pub fn can_write(role: Role) -> bool {
  matches!(role, Role::AdminGerente | Role::Operador)
}

pub fn can_delete_planilla(role: Role) -> bool {
  role == Role::AdminGerente
}

pub fn can_read_audit(role: Role) -> bool {
  matches!(role, Role::AdminGerente | Role::Operador)
}

pub fn allows(role: Role, permission: Permission) -> bool {
  match permission {
    Permission::Write => can_write(role),
    Permission::DeletePlanilla => can_delete_planilla(role),
    Permission::ReadAudit => can_read_audit(role),
  }
}

/// `Authorization` error when `role` lacks `permission`.
pub fn ensure(role: Role, permission: Permission) -> CoreResult<()> {
  if allows(role, permission) {
    Ok(())
  } else {
    Err(CoreError::Authorization(permission.denial_message().to_string()))
  }
}
