// core/src/seed.rs

//! Demo data shared by the in-memory backing and the Postgres seed.

use crate::error::CoreResult;
use crate::models::{NewPlanilla, NewTasa, Role};
use crate::password;
use crate::persistence::Persistence;
use crate::repository::NewUser;
use rust_decimal::Decimal;
use tracing::{info, instrument};

pub const DEMO_PASSWORD: &str = "123456";

#[derive(Debug, Clone, Copy)]
pub struct DemoUser {
  pub id: &'static str,
  pub email: &'static str,
  pub name: &'static str,
  pub role: Role,
}

pub const DEMO_USERS: [DemoUser; 3] = [
  DemoUser {
    id: "u1",
    email: "admin@hardsoft.local",
    name: "Admin Demo",
    role: Role::AdminGerente,
  },
  DemoUser {
    id: "u2",
    email: "operador@hardsoft.local",
    name: "Operador Demo",
    role: Role::Operador,
  },
  DemoUser {
    id: "u3",
    email: "consulta@hardsoft.local",
    name: "Consulta Demo",
    role: Role::Consulta,
  },
];

pub fn example_planilla() -> NewPlanilla {
  NewPlanilla {
    cliente: "Fundación Pacífico C.A.".to_string(),
    proyecto: "Desarrollo de Z Facturación Digital".to_string(),
    monto_bruto_usd: Decimal::new(168_056, 2),
  }
}

pub fn example_tasa() -> NewTasa {
  NewTasa {
    bcv: Decimal::new(4_073, 2),
    paralela: Decimal::new(4_104, 2),
    fuente: "api".to_string(),
  }
}

/// Idempotent seed: upserts the demo users, then inserts the example tasa and
/// planilla only into empty tables.
#[instrument(name = "seed::run", skip(persistence))]
pub async fn run(persistence: &Persistence) -> CoreResult<()> {
  for demo in DEMO_USERS.iter() {
    persistence
      .users
      .upsert(NewUser {
        email: demo.email.to_string(),
        name: demo.name.to_string(),
        role: demo.role,
        password_hash: password::hash_password(DEMO_PASSWORD)?,
      })
      .await?;
  }

  if persistence.tasas.count().await? == 0 {
    persistence.tasas.create(example_tasa()).await?;
  }
  if persistence.planillas.count().await? == 0 {
    persistence.planillas.create(example_planilla()).await?;
  }

  info!("Seed completed.");
  Ok(())
}
