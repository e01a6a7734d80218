//! # Provisioning Smoke Test
//!
//! Runs the scripted provisioning walk-through against an in-memory
//! directory: creates a class of service, domain, server, zimlet, account,
//! calendar resource, nested distribution lists, a data source and an
//! identity, checks lookups, renames, membership, authentication and search,
//! then deletes everything once enter is pressed.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin dirprov-smoke [test-id] [--yes]
//! ```
//!
//! The test id defaults to the current time (`20240131-154500`) and is used
//! in every created name. `--yes` skips the prompt before cleanup. Set
//! `DIRPROV_CONFIG` to a JSON config file to change the bootstrapped names;
//! `RUST_LOG=debug` shows the engine's logging.
//!
//! ## Output
//!
//! ```text
//! Testing health
//! Testing config
//! ...
//! Deleting entries
//!
//! Test 20240131-154500 done!
//! ```
//!
//! A provisioning failure prints its code and message followed by each
//! underlying cause, and still exits with status 0; a failed assertion exits
//! with status 1.
//!
//! ```text
//! ERROR: account.DOMAIN_EXISTS (domain already exists: domain-x.ldap-test-domain)
//!
//! Test x failed!
//! ```

use dirprov::config::{ProvisioningConfig, CONFIG_ENV_VAR};
use dirprov::harness::{
    failure_report, AutoConfirm, Confirmation, HarnessError, ProvisioningSmokeTest,
    StdinConfirmation,
};
use dirprov::provisioning::StandardProvisioning;
use dirprov::storage::InMemoryStorage;
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let auto_confirm = args.iter().any(|arg| arg == "--yes" || arg == "-y");
    let test_id = args.iter().find(|arg| !arg.starts_with('-')).cloned();

    let config = match env::var(CONFIG_ENV_VAR) {
        Ok(path) => match ProvisioningConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: cannot load config '{}': {}", path, e);
                process::exit(1);
            }
        },
        Err(_) => ProvisioningConfig::default(),
    };

    let prov = match StandardProvisioning::new(InMemoryStorage::new(), config.clone()).await {
        Ok(prov) => prov,
        Err(e) => {
            eprintln!("Error: cannot start provisioning: {} ({})", e.code(), e);
            process::exit(1);
        }
    };

    let asserted = if auto_confirm {
        run(&prov, &config, AutoConfirm, test_id).await
    } else {
        run(&prov, &config, StdinConfirmation, test_id).await
    };
    if !asserted {
        process::exit(1);
    }
}

async fn run<C: Confirmation>(
    prov: &StandardProvisioning<InMemoryStorage>,
    config: &ProvisioningConfig,
    confirmation: C,
    test_id: Option<String>,
) -> bool {
    // false only when a check of the script itself failed
    let mut smoke = ProvisioningSmokeTest::new(prov, config, confirmation);
    if let Some(id) = test_id {
        smoke = smoke.with_test_id(id);
    }
    let test_id = smoke.names().test_id.clone();

    match smoke.execute().await {
        Ok(test_id) => {
            println!("\nTest {} done!", test_id);
            true
        }
        Err(HarnessError::Provisioning(e)) => {
            for line in failure_report(&e) {
                println!("{}", line);
            }
            println!("\nTest {} failed!", test_id);
            true
        }
        Err(e) => {
            println!("ERROR: {}", e);
            println!("\nTest {} failed!", test_id);
            false
        }
    }
}
