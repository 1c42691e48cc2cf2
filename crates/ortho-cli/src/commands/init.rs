//! `ortho init` - create the evidence store and seed reference data.

use crate::cli::InitArgs;
use crate::error::Result;
use crate::seed::seed_reference_data;
use crate::{Config, Formatter};
use ortho_store::SqliteStore;

/// Execute the init command.
pub fn execute_init(args: InitArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = SqliteStore::new(&config.db_path)?;

    if args.no_seed {
        println!(
            "{}",
            formatter.success(&format!("Store ready at {}", config.db_path.display()))
        );
        return Ok(());
    }

    let created = seed_reference_data(&mut store)?;
    println!(
        "{}",
        formatter.success(&format!(
            "Store ready at {} ({} reference issue(s) seeded)",
            config.db_path.display(),
            created
        ))
    );
    Ok(())
}
