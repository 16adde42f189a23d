//! Composition root wiring configured adapters into a ledger engine.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::clock::SystemClock;
use crate::adapter::outbound::notifier::LogNotifier;
use crate::adapter::outbound::sqlite::database::connection;
use crate::adapter::outbound::sqlite::{SqliteLedgerStore, TransferJournal};
use crate::application::{EnginePorts, LedgerEngine};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::notifier::NotifierRegistry;

/// A running ledger and the handles the CLI reads from directly.
pub struct Runtime {
    pub engine: Arc<LedgerEngine>,
    pub journal: Arc<TransferJournal>,
}

/// Build notifier registry from configuration.
pub(crate) fn build_notifier_registry(_config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    registry
}

/// Open the configured database and load every market into an engine.
///
/// # Errors
/// Returns an error if the database cannot be opened, migrated or loaded.
pub fn build_runtime(config: &Config) -> Result<Runtime> {
    let pool = connection::open(&config.database)?;
    let store = Arc::new(SqliteLedgerStore::new(pool.clone()));
    let journal = Arc::new(TransferJournal::new(pool));

    let ports = EnginePorts {
        access: Arc::new(config.roles.policy()),
        assets: journal.clone(),
        store,
        notifier: Arc::new(build_notifier_registry(config)),
        clock: Arc::new(SystemClock),
    };
    let engine = Arc::new(LedgerEngine::load(config.ledger.settings(), ports)?);
    info!(database = %config.database, paused = engine.is_paused(), "Ledger ready");

    Ok(Runtime { engine, journal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, NewMarket, Odds};

    fn config(dir: &tempfile::TempDir) -> Config {
        Config {
            database: dir.path().join("ledger.db").to_string_lossy().into_owned(),
            ..Config::parse_toml("[roles]\nadministrators = [\"root\"]\n").unwrap()
        }
    }

    #[test]
    fn runtime_persists_markets_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let root = AccountId::new("root");

        let runtime = build_runtime(&config).unwrap();
        let spec = NewMarket::fixed_odds(
            "derby",
            "USDC",
            vec![Odds::try_new(20_000).unwrap(), Odds::try_new(30_000).unwrap()],
        );
        runtime.engine.create_market(&root, spec).unwrap();
        drop(runtime);

        let reopened = build_runtime(&config).unwrap();
        assert_eq!(reopened.engine.markets().len(), 1);
    }

    #[test]
    fn unknown_callers_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = build_runtime(&config(&dir)).unwrap();
        let spec = NewMarket::parimutuel("m", "USDC", 2);
        let err = runtime
            .engine
            .create_market(&AccountId::new("mallory"), spec)
            .unwrap_err();
        assert!(err.as_ledger().is_some());
    }
}
