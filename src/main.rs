//! Point Ledger - demo driver
//!
//! Loads config, wires the in-memory store and history log into the
//! service, then fires a burst of concurrent charges and uses to show
//! the per-user serialization at work:
//!
//! ```text
//! ┌──────────┐    ┌───────────────┐    ┌──────────────┐
//! │  Config  │───▶│ PointService  │───▶│ Final report │
//! │  (YAML)  │    │ (lock + audit)│    │  (tracing)   │
//! └──────────┘    └───────────────┘    └──────────────┘
//! ```

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::info;

use point_ledger::config::AppConfig;
use point_ledger::logging::init_logging;
use point_ledger::{MemoryHistoryLog, MemoryPointStore, PointService, UserId};

const USERS: UserId = 4;
const CHARGES_PER_USER: usize = 25;
const CHARGE_AMOUNT: u64 = 10;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(&get_env());
    let _guard = init_logging(&config);

    info!(max_charge = config.ledger.max_charge, "point ledger demo starting");

    let store = MemoryPointStore::seeded((1..=USERS).map(|id| (id, 0)));
    let service = Arc::new(PointService::with_max_charge(
        store,
        MemoryHistoryLog::new(),
        config.ledger.max_charge,
    ));

    // Concurrent charge burst: every user gets CHARGES_PER_USER x CHARGE_AMOUNT
    let mut tasks = JoinSet::new();
    for user_id in 1..=USERS {
        for _ in 0..CHARGES_PER_USER {
            let service = Arc::clone(&service);
            tasks.spawn(async move { service.charge(user_id, CHARGE_AMOUNT).await });
        }
    }
    while let Some(joined) = tasks.join_next().await {
        joined??;
    }

    // Spend some of it back
    for user_id in 1..=USERS {
        service.use_points(user_id, 50).await?;
    }

    for user_id in 1..=USERS {
        let balance = service.get_balance(user_id);
        let records = service.get_history(user_id);
        info!(
            user_id,
            point = balance.point(),
            history_records = records.len(),
            "final balance"
        );
    }

    info!("point ledger demo finished");
    Ok(())
}
