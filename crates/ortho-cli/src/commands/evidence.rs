//! `ortho evidence` - display a derived evidence table.

use crate::cli::{EvidenceArgs, EvidenceTable};
use crate::error::Result;
use crate::seed::resolve_issue;
use crate::{Config, Formatter};
use ortho_domain::traits::EvidenceStore;
use ortho_domain::IssueTreatmentEffect;
use ortho_store::SqliteStore;

/// Execute the evidence command.
pub fn execute_evidence(args: EvidenceArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = SqliteStore::new(&config.db_path)?;

    let output = match args.table {
        EvidenceTable::AgeRisk => formatter.format_age_risks(&store.age_risk_profiles()?)?,
        EvidenceTable::Effects => {
            let issues = match &args.issue {
                Some(selector) => {
                    let id = resolve_issue(&store, selector)?;
                    store.get_issue(id)?.into_iter().collect()
                }
                None => store.list_issues()?,
            };
            let mut rows: Vec<(String, IssueTreatmentEffect)> = Vec::new();
            for issue in &issues {
                for effect in store.treatment_effects_for_issue(issue.id)? {
                    rows.push((issue.name_ja.clone(), effect));
                }
            }
            formatter.format_effects(&rows)?
        }
        EvidenceTable::Timing => formatter.format_timing(&store.timing_benefits()?)?,
        EvidenceTable::Scenarios => match args.age {
            Some(age) => formatter.format_scenarios(&store.scenarios_for_age(age)?)?,
            None => formatter.format_scenarios(&store.list_scenarios()?)?,
        },
        EvidenceTable::Economics => match args.age {
            Some(age) => {
                let rows: Vec<_> = store.economic_impact_for_age(age)?.into_iter().collect();
                formatter.format_economics(&rows)?
            }
            None => formatter.format_economics(&store.economic_impacts()?)?,
        },
    };

    println!("{}", output);
    Ok(())
}
