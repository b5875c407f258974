use std::fs;
use tempfile::tempdir;
use tideline_core::{
    save_snapshot, CsvFileRepository, RecordRepository, RecordService, SurveyRecord, CSV_HEADER,
};

fn sample(site: &str, count: &str) -> SurveyRecord {
    SurveyRecord::new(site, "1997", "T1", "Q1", "Butter Clam", count)
}

#[test]
fn create_initializes_the_data_file_idempotently() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.csv");

    let repo = CsvFileRepository::create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(repo.path(), path);
    assert_eq!(repo.count().unwrap(), 0);

    // A second open of the same path must not disturb existing state.
    let mut first = CsvFileRepository::create(&path).unwrap();
    first.insert(&sample("S1", "1")).unwrap();
    let again = CsvFileRepository::create(&path).unwrap();
    assert_eq!(again.count().unwrap(), 1);
}

#[test]
fn insert_assigns_increasing_identities_and_lists_in_order() {
    let dir = tempdir().unwrap();
    let mut repo = CsvFileRepository::create(dir.path().join("records.csv")).unwrap();

    let first = repo.insert(&sample("S1", "1")).unwrap();
    let second = repo.insert(&sample("S2", "2")).unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 2);

    let records = repo.list_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, Some(1));
    assert_eq!(records[0].site, "S1");
    assert_eq!(records[1].id, Some(2));
    assert_eq!(records[1].species, "Butter Clam");
}

#[test]
fn identities_survive_delete_and_are_never_reused() {
    let dir = tempdir().unwrap();
    let mut repo = CsvFileRepository::create(dir.path().join("records.csv")).unwrap();

    repo.insert(&sample("S1", "1")).unwrap();
    let second = repo.insert(&sample("S2", "2")).unwrap();
    assert!(repo.delete(second).unwrap());

    let third = repo.insert(&sample("S3", "3")).unwrap();
    assert_eq!(third, 3);
}

#[test]
fn update_and_delete_report_missing_identities_as_false() {
    let dir = tempdir().unwrap();
    let mut repo = CsvFileRepository::create(dir.path().join("records.csv")).unwrap();

    let id = repo.insert(&sample("S1", "1")).unwrap();
    assert!(repo.update(id, &sample("S1-fixed", "9")).unwrap());
    assert!(!repo.update(id + 100, &sample("ghost", "0")).unwrap());
    assert!(!repo.delete(id + 100).unwrap());

    let records = repo.list_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, Some(id));
    assert_eq!(records[0].site, "S1-fixed");
    assert_eq!(records[0].count, "9");
}

#[test]
fn clear_all_restarts_the_identity_sequence() {
    let dir = tempdir().unwrap();
    let mut repo = CsvFileRepository::create(dir.path().join("records.csv")).unwrap();

    repo.insert(&sample("S1", "1")).unwrap();
    repo.insert(&sample("S2", "2")).unwrap();
    repo.clear_all().unwrap();
    assert_eq!(repo.count().unwrap(), 0);

    let id = repo.insert(&sample("S3", "3")).unwrap();
    assert_eq!(id, 1);
}

#[test]
fn state_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.csv");

    {
        let mut repo = CsvFileRepository::create(&path).unwrap();
        repo.insert(&sample("S1", "1")).unwrap();
        repo.insert(&sample("S2", "2")).unwrap();
    }

    let mut reopened = CsvFileRepository::create(&path).unwrap();
    let records = reopened.list_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].site, "S1");
    assert_eq!(records[1].id, Some(2));

    let third = reopened.insert(&sample("S3", "3")).unwrap();
    assert_eq!(third, 3);
}

#[test]
fn replace_all_swaps_contents_and_restarts_identities() {
    let dir = tempdir().unwrap();
    let mut repo = CsvFileRepository::create(dir.path().join("records.csv")).unwrap();

    repo.insert(&sample("manual-1", "1")).unwrap();
    let replacement = vec![sample("R1", "1"), sample("R2", "2")];
    assert_eq!(repo.replace_all(&replacement).unwrap(), 2);

    let records = repo.list_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, Some(1));
    assert_eq!(records[0].site, "R1");
    assert_eq!(records[1].id, Some(2));
}

#[test]
fn the_service_contract_holds_over_the_file_backend() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.csv");
    fs::write(
        &source,
        "site,year,transect,quadrat,species,count\n\
         S1,1997,T1,Q1,Butter Clam,12\n\
         S2,1998,T2,Q3,Littleneck Clam,5\n",
    )
    .unwrap();

    let repo = CsvFileRepository::create(dir.path().join("records.csv")).unwrap();
    let mut service = RecordService::new(repo, source);

    assert_eq!(service.ensure_loaded().unwrap(), 2);
    let former_second = service.get_by_position(2).unwrap().unwrap();
    assert!(service.delete_by_position(1).unwrap());
    assert_eq!(service.get_by_position(1).unwrap().unwrap(), former_second);
    assert_eq!(service.record_count().unwrap(), 1);
}

#[test]
fn snapshots_get_distinct_generated_names() {
    let dir = tempdir().unwrap();
    let records = vec![sample("S1", "1"), sample("S2", "2")];

    let first = save_snapshot(dir.path(), &records).unwrap();
    let second = save_snapshot(dir.path(), &records).unwrap();
    assert_ne!(first, second);
    assert!(first.exists());
    assert!(second.exists());

    let name = first.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("survey-"));
    assert!(name.ends_with(".csv"));
}

#[test]
fn snapshot_contents_carry_the_header_and_tracked_fields() {
    let dir = tempdir().unwrap();
    let records = vec![sample("S1", "12"), sample("S2", "5")];

    let path = save_snapshot(dir.path(), &records).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines[1], "S1,1997,T1,Q1,Butter Clam,12");
    assert_eq!(lines[2], "S2,1997,T1,Q1,Butter Clam,5");
}
