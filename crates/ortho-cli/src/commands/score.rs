//! `ortho score` - score a patient's treatment necessity.

use crate::cli::ScoreArgs;
use crate::error::Result;
use crate::seed::resolve_issue;
use crate::{Config, Formatter};
use ortho_scorer::{PatientProfile, Scorer};
use ortho_store::SqliteStore;

/// Execute the score command.
pub fn execute_score(args: ScoreArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = SqliteStore::new(&config.db_path)?;

    let mut issue_ids = Vec::with_capacity(args.issues.len());
    for selector in &args.issues {
        issue_ids.push(resolve_issue(&store, selector)?);
    }

    let scorer = Scorer::new(config.scorer_config());
    let patient = PatientProfile::new(args.age, issue_ids);

    let result = if args.log_report {
        let (result, id) = scorer.score_and_log(&mut store, &patient, args.notes.clone())?;
        eprintln!("{}", formatter.success(&format!("Report logged: {}", id)));
        result
    } else {
        scorer.score(&store, &patient)?
    };

    println!("{}", formatter.format_score(&result)?);
    Ok(())
}
