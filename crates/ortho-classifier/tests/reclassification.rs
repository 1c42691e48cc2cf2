//! Re-classification behavior against a real store

use ortho_classifier::{Classifier, ClassifierConfig};
use ortho_domain::traits::EvidenceStore;
use ortho_domain::{
    EvidenceLevel, IssueKeyword, Language, NewDentalIssue, NewPaper, Paper,
};
use ortho_store::SqliteStore;

fn seed_issues(store: &mut SqliteStore) {
    let crowding = store
        .insert_issue(NewDentalIssue {
            code: "crowding".to_string(),
            name_ja: "叢生".to_string(),
            name_en: "Crowding".to_string(),
            severity_base_score: 70.0,
        })
        .unwrap();
    let open_bite = store
        .insert_issue(NewDentalIssue {
            code: "open_bite".to_string(),
            name_ja: "開咬".to_string(),
            name_en: "Open bite".to_string(),
            severity_base_score: 65.0,
        })
        .unwrap();

    store
        .upsert_keyword(IssueKeyword::new(crowding, "crowding", Language::En, 1.0))
        .unwrap();
    store
        .upsert_keyword(IssueKeyword::new(crowding, "dental crowding", Language::En, 1.1))
        .unwrap();
    store
        .upsert_keyword(IssueKeyword::new(open_bite, "open bite", Language::En, 1.0))
        .unwrap();
}

fn insert_paper(store: &mut SqliteStore, abstract_text: &str) -> Paper {
    let mut new = NewPaper::titled("Malocclusion outcomes", EvidenceLevel::Ib);
    new.abstract_text = Some(abstract_text.to_string());
    let id = store.insert_paper(new).unwrap();
    store.get_paper(id).unwrap().unwrap()
}

#[test]
fn test_classify_and_store_writes_relations() {
    let mut store = SqliteStore::in_memory().unwrap();
    seed_issues(&mut store);
    let paper = insert_paper(&mut store, "A trial of dental crowding correction");

    let classifier = Classifier::default_config();
    let outcome = classifier.classify_and_store(&mut store, &paper).unwrap();
    assert!(outcome.is_classified());

    let relations = store.relations_for_paper(paper.id).unwrap();
    assert_eq!(relations.len(), 1);
    assert!(relations[0].is_primary);
}

#[test]
fn test_reclassification_replaces_relations() {
    let mut store = SqliteStore::in_memory().unwrap();
    seed_issues(&mut store);
    let classifier = Classifier::default_config();

    let paper = insert_paper(&mut store, "A trial of dental crowding correction");
    classifier.classify_and_store(&mut store, &paper).unwrap();

    // The abstract changes upstream; the paper now discusses open bite only.
    let mut changed = paper.clone();
    changed.abstract_text = Some("Anterior open bite in adolescents".to_string());

    for _ in 0..3 {
        classifier.classify_and_store(&mut store, &changed).unwrap();
    }

    let relations = store.relations_for_paper(paper.id).unwrap();
    assert_eq!(
        relations.len(),
        1,
        "exactly one relation row per (paper, issue) regardless of run count"
    );
    let open_bite = store.find_issue_by_code("open_bite").unwrap().unwrap();
    assert_eq!(relations[0].issue_id, open_bite.id);
}

#[test]
fn test_unclassifiable_paper_clears_relations() {
    let mut store = SqliteStore::in_memory().unwrap();
    seed_issues(&mut store);
    let classifier = Classifier::default_config();

    let paper = insert_paper(&mut store, "dental crowding");
    classifier.classify_and_store(&mut store, &paper).unwrap();
    assert!(!store.relations_for_paper(paper.id).unwrap().is_empty());

    let mut changed = paper.clone();
    changed.abstract_text = Some("unrelated periodontal topic".to_string());
    changed.title = "Unrelated".to_string();
    let outcome = classifier.classify_and_store(&mut store, &changed).unwrap();

    assert!(!outcome.is_classified());
    assert!(store.relations_for_paper(paper.id).unwrap().is_empty());
}
