//! `ortho reports` - list the append-only scoring audit log.

use crate::error::Result;
use crate::{Config, Formatter};
use ortho_domain::traits::EvidenceStore;
use ortho_store::SqliteStore;

/// Execute the reports command.
pub fn execute_reports(config: &Config, formatter: &Formatter) -> Result<()> {
    let store = SqliteStore::new(&config.db_path)?;
    let reports = store.list_reports()?;
    println!("{}", formatter.format_reports(&reports)?);
    Ok(())
}
