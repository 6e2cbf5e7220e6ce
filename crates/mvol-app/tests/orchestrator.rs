//! End-to-end tests of the orchestrator over real files in a temp directory.

use mvol_app::config::StorageConfig;
use mvol_app::{AppError, NewMarket, Orchestrator};
use mvol_core::{Category, Metric, Ordinal, Statistic};
use std::path::Path;
use tempfile::TempDir;

fn one_to_ten() -> Vec<f64> {
    (1..=10).map(f64::from).collect()
}

fn write_national(dir: &Path) {
    std::fs::write(
        dir.join("National.txt"),
        "Ten Year National Rent Growth: 1,2,3,4,5,6,7,8,9,10\n\
         Ten Year National Vacancy: 1,2,3,4,5,6,7,8,9,10\n\
         Ten Year National Cap Rate: 1,2,3,4,5,6,7,8,9,10\n",
    )
    .unwrap();
}

fn setup() -> (TempDir, Orchestrator) {
    let dir = TempDir::new().unwrap();
    write_national(dir.path());
    let orchestrator = Orchestrator::open(&StorageConfig::in_dir(dir.path())).unwrap();
    (dir, orchestrator)
}

fn austin() -> NewMarket {
    NewMarket {
        name: "Austin".to_string(),
        vacancy: vec![5.0; 10],
        rent_growth: one_to_ten(),
        cap_rate: one_to_ten(),
    }
}

fn boise() -> NewMarket {
    NewMarket {
        name: "Boise".to_string(),
        vacancy: vec![6.0, 7.0, 6.0, 7.0, 6.0, 7.0, 6.0, 7.0, 6.0, 7.0],
        rent_growth: one_to_ten().iter().map(|x| x * 2.0).collect(),
        cap_rate: vec![4.0; 10],
    }
}

fn rankings_text(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("Rankings.txt")).unwrap()
}

fn ranking_line(dir: &TempDir, category: Category) -> String {
    let prefix = format!("{}:", category.label());
    rankings_text(dir)
        .lines()
        .find(|l| l.starts_with(&prefix))
        .unwrap()
        .to_string()
}

#[test]
fn test_add_flat_vacancy_and_unit_beta() {
    let (_dir, mut orchestrator) = setup();
    let record = orchestrator.add_market(austin()).unwrap();

    assert_eq!(record.vacancy.std_dev, 0.0);
    assert_eq!(record.vacancy.cv, 0.0);
    assert_eq!(record.rent_growth.beta, 1.0);
    assert_eq!(record.cap_rate.std_dev, 2.87);
    assert_eq!(record.cap_rate.cv, 52.18);

    let stored = orchestrator.find_market("Austin").unwrap();
    assert_eq!(stored, record);
}

#[test]
fn test_add_ranks_market_in_all_nine_lists() {
    let (dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();
    orchestrator.add_market(boise()).unwrap();

    let text = rankings_text(&dir);
    assert_eq!(text.lines().count(), 9);
    for (line, category) in text.lines().zip(Category::ALL) {
        assert!(line.starts_with(&format!("{}: ", category.label())), "{line}");
        assert!(line.contains("Austin - "));
        assert!(line.contains("Boise - "));
    }

    let view = orchestrator.view_market("Boise").unwrap();
    let sd_vac = Category::new(Statistic::StdDev, Metric::Vacancy);
    assert_eq!(view.rank(sd_vac), Some(Ordinal(2)));
    assert_eq!(ranking_line(&dir, sd_vac), "Standard Deviation Vacancy Rankings: Austin - 0.0,Boise - 0.5");
}

#[test]
fn test_add_rejects_duplicate_name() {
    let (_dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();

    let err = orchestrator.add_market(austin()).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(orchestrator.export_markets().unwrap().len(), 1);
}

#[test]
fn test_add_validation_writes_nothing() {
    let (dir, mut orchestrator) = setup();

    let mut short = austin();
    short.cap_rate.pop();
    assert!(matches!(orchestrator.add_market(short), Err(AppError::Validation(_))));

    let mut empty = austin();
    empty.vacancy.clear();
    assert!(matches!(orchestrator.add_market(empty), Err(AppError::Validation(_))));

    let mut bad_name = austin();
    bad_name.name = "Austin: TX".to_string();
    assert!(matches!(orchestrator.add_market(bad_name), Err(AppError::Validation(_))));

    let mut mismatched = austin();
    mismatched.vacancy = vec![1.0, 2.0];
    mismatched.rent_growth = vec![1.0, 2.0];
    mismatched.cap_rate = vec![1.0, 2.0];
    assert!(matches!(orchestrator.add_market(mismatched), Err(AppError::Validation(_))));

    assert!(!dir.path().join("Markets.txt").exists());
    assert!(!dir.path().join("Rankings.txt").exists());
}

fn overflowing() -> Vec<f64> {
    let mut series = vec![0.0; 10];
    series[0] = 1e200;
    series[1] = -1e200;
    series
}

#[test]
fn test_add_rejects_overflowing_statistics() {
    let (dir, mut orchestrator) = setup();
    let big = NewMarket {
        name: "Big".to_string(),
        vacancy: overflowing(),
        ..austin()
    };

    let err = orchestrator.add_market(big).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err:?}");
    assert!(!dir.path().join("Markets.txt").exists());
    assert!(!dir.path().join("Rankings.txt").exists());

    let added = orchestrator
        .add_market(NewMarket {
            name: "Big".to_string(),
            ..austin()
        })
        .unwrap();
    assert_eq!(orchestrator.find_market("Big").unwrap(), added);
}

#[test]
fn test_update_rejects_overflowing_statistics() {
    let (dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();
    let markets = std::fs::read_to_string(dir.path().join("Markets.txt")).unwrap();
    let rankings = rankings_text(&dir);

    let err = orchestrator
        .update_metric("Austin", Metric::CapRate, overflowing(), None)
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err:?}");
    assert_eq!(std::fs::read_to_string(dir.path().join("Markets.txt")).unwrap(), markets);
    assert_eq!(rankings_text(&dir), rankings);

    let err = orchestrator
        .update_metric("Austin", Metric::CapRate, one_to_ten(), Some(vec![f64::NAN; 10]))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err:?}");
    assert!(orchestrator.find_market("Austin").is_ok());
}

#[test]
fn test_add_requires_national_data() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = Orchestrator::open(&StorageConfig::in_dir(dir.path())).unwrap();

    match orchestrator.add_market(austin()) {
        Err(AppError::Validation(msg)) => assert!(msg.contains("National data")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_update_touches_only_one_family() {
    let (dir, mut orchestrator) = setup();
    let before = orchestrator.add_market(austin()).unwrap();
    orchestrator.add_market(boise()).unwrap();

    let untouched: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|c| c.metric != Metric::CapRate)
        .collect();
    let lines_before: Vec<String> = untouched.iter().map(|c| ranking_line(&dir, *c)).collect();
    let view_before = orchestrator.view_market("Austin").unwrap();

    let descending: Vec<f64> = one_to_ten().into_iter().rev().collect();
    let after = orchestrator
        .update_metric("Austin", Metric::CapRate, descending.clone(), None)
        .unwrap();

    assert_eq!(after.vacancy, before.vacancy);
    assert_eq!(after.rent_growth, before.rent_growth);
    assert_eq!(after.cap_rate.ten_year, descending);
    assert_eq!(after.cap_rate.beta, -1.0);

    let lines_after: Vec<String> = untouched.iter().map(|c| ranking_line(&dir, *c)).collect();
    assert_eq!(lines_after, lines_before);

    let view_after = orchestrator.view_market("Austin").unwrap();
    for category in &untouched {
        assert_eq!(view_after.rank(*category), view_before.rank(*category));
    }

    // Beta cap rate: Boise is flat (0.0), Austin is now -1.0.
    let beta_cap = Category::new(Statistic::Beta, Metric::CapRate);
    assert_eq!(view_after.rank(beta_cap), Some(Ordinal(1)));
    assert_eq!(orchestrator.find_market("Austin").unwrap(), after);
}

#[test]
fn test_update_with_explicit_national() {
    let (_dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();

    let national = vec![2.0, 4.0, 6.0, 8.0];
    let record = orchestrator
        .update_metric("Austin", Metric::Vacancy, vec![1.0, 2.0, 3.0, 4.0], Some(national))
        .unwrap();
    // cov = 2.5, var(national) = round(sqrt(5), 2)^2 = 2.24^2 = 5.0176
    assert_eq!(record.vacancy.beta, 0.5);
    assert_eq!(record.vacancy.ten_year.len(), 4);
}

#[test]
fn test_update_errors() {
    let (_dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();

    assert!(matches!(
        orchestrator.update_metric("Reno", Metric::Vacancy, one_to_ten(), None),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        orchestrator.update_metric("Austin", Metric::Vacancy, vec![1.0, 2.0], None),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        orchestrator.update_metric("Austin", Metric::Vacancy, Vec::new(), Some(Vec::new())),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn test_remove_purges_both_stores() {
    let (dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();
    orchestrator.add_market(boise()).unwrap();

    orchestrator.remove_market("Austin").unwrap();

    assert!(matches!(orchestrator.find_market("Austin"), Err(AppError::NotFound(_))));
    assert!(matches!(orchestrator.view_market("Austin"), Err(AppError::NotFound(_))));
    assert!(!rankings_text(&dir).contains("Austin"));

    let view = orchestrator.view_market("Boise").unwrap();
    assert!(view.ranks.iter().all(|(_, rank)| *rank == Some(Ordinal(1))));

    assert!(matches!(orchestrator.remove_market("Austin"), Err(AppError::NotFound(_))));
}

#[test]
fn test_remove_fails_closed_on_incomplete_rankings() {
    let (dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();

    let partial: String = rankings_text(&dir).lines().take(4).map(|l| format!("{l}\n")).collect();
    std::fs::write(dir.path().join("Rankings.txt"), &partial).unwrap();

    match orchestrator.remove_market("Austin") {
        Err(AppError::RankingsUnavailable { missing }) => assert_eq!(missing.len(), 5),
        other => panic!("expected rankings unavailable, got {other:?}"),
    }
    assert!(orchestrator.find_market("Austin").is_ok());
    assert_eq!(rankings_text(&dir), partial);
}

#[test]
fn test_view_reports_missing_rank_per_list() {
    let (dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();

    let cv_vac = Category::ALL[0];
    let edited: String = rankings_text(&dir)
        .lines()
        .map(|l| {
            if l.starts_with(&format!("{}:", cv_vac.label())) {
                format!("{}:\n", cv_vac.label())
            } else {
                format!("{l}\n")
            }
        })
        .collect();
    std::fs::write(dir.path().join("Rankings.txt"), edited).unwrap();

    let view = orchestrator.view_market("Austin").unwrap();
    assert_eq!(view.rank(cv_vac), None);
    assert_eq!(view.ranks.iter().filter(|(_, r)| r.is_some()).count(), 8);
}

#[test]
fn test_extract_rankings_truncates_to_shortest() {
    let (dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();
    orchestrator.add_market(boise()).unwrap();

    let table = orchestrator.extract_rankings().unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].len(), 9);

    let edited = rankings_text(&dir).replacen(",Boise - 0.5", "", 1);
    std::fs::write(dir.path().join("Rankings.txt"), edited).unwrap();
    assert_eq!(orchestrator.extract_rankings().unwrap().rows.len(), 1);
}

#[test]
fn test_extract_rankings_requires_complete_file() {
    let (_dir, orchestrator) = setup();
    assert!(matches!(
        orchestrator.extract_rankings(),
        Err(AppError::RankingsUnavailable { .. })
    ));
}

#[test]
fn test_compare_reports_which_market_is_missing() {
    let (_dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();
    orchestrator.add_market(boise()).unwrap();

    let comparison = orchestrator.compare("Austin", " Boise ").unwrap();
    assert_eq!(comparison.first.name, "Austin");
    assert_eq!(comparison.second.name, "Boise");

    match orchestrator.compare("Austin", "Reno") {
        Err(AppError::NotFound(msg)) => assert!(msg.starts_with("Market 2")),
        other => panic!("expected not found, got {other:?}"),
    }
    match orchestrator.compare("Reno", "Austin") {
        Err(AppError::NotFound(msg)) => assert!(msg.starts_with("Market 1")),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn test_market_average() {
    let (_dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();

    assert_eq!(orchestrator.market_average("Austin", Metric::RentGrowth).unwrap(), 5.5);
    assert_eq!(orchestrator.market_average("Austin", Metric::Vacancy).unwrap(), 5.0);
    assert!(matches!(
        orchestrator.market_average("Reno", Metric::Vacancy),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_reopen_reads_persisted_state() {
    let (dir, mut orchestrator) = setup();
    orchestrator.add_market(austin()).unwrap();
    drop(orchestrator);

    let reopened = Orchestrator::open(&StorageConfig::in_dir(dir.path())).unwrap();
    assert_eq!(reopened.export_markets().unwrap().len(), 1);
    assert!(!reopened.ledger().marker_path().exists());
}
