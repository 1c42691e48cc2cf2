//! `ortho classify` - classify every stored paper.

use crate::error::Result;
use crate::{Config, Formatter};
use ortho_classifier::Classifier;
use ortho_domain::traits::EvidenceStore;
use ortho_store::SqliteStore;

/// Execute the classify command.
pub fn execute_classify(config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = SqliteStore::new(&config.db_path)?;
    let classifier = Classifier::new(config.classifier_config());

    let papers = store.list_papers()?;
    let mut classified = 0;
    let mut unclassified = 0;

    for paper in &papers {
        let outcome = classifier.classify_and_store(&mut store, paper)?;
        if outcome.is_classified() {
            classified += 1;
        } else {
            unclassified += 1;
        }
    }

    println!(
        "{}",
        formatter.success(&format!(
            "Classified {} paper(s); {} stored unclassified",
            classified, unclassified
        ))
    );
    Ok(())
}
