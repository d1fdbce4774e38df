//! Folio server binary.
//!
//! Configuration is read from `folio.toml` when present and from `FOLIO__*`
//! environment variables (a `.env` file is honoured). The binary serves a
//! small in-memory employee directory.

use anyhow::Context;
use folio::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Employee {
    first_name: String,
    last_name: String,
    department: String,
    salary: u32,
}

impl Employee {
    fn new(first_name: &str, last_name: &str, department: &str, salary: u32) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            department: department.to_string(),
            salary,
        }
    }
}

impl Reportable for Employee {}

fn employees() -> Vec<Employee> {
    vec![
        Employee::new("Sad", "Panda", "Engineering", 5200),
        Employee::new("Gigi", "Petrescu", "Finance", 4800),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_dotenv()
        .with_optional_file("folio.toml")
        .context("failed to read folio.toml")?
        .with_env_prefix("FOLIO")
        .load()
        .context("invalid configuration")?;

    folio::telemetry::init_telemetry(&config.telemetry.telemetry_config())
        .context("failed to initialize telemetry")?;

    let repository: Arc<dyn Repository<Employee>> = Arc::new(InMemoryRepository::new(employees()));
    let server = build_server(&config, repository).context("failed to build server")?;

    tracing::info!(
        addr = %config.server.http_addr,
        base_path = %config.reports.base_path,
        environment = %config.telemetry.environment,
        "starting folio"
    );

    server.run().await.context("server failed")?;
    Ok(())
}
