use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use tideline_core::ingest::csv::{parse_line, to_csv_row};
use tideline_core::{load_records, LoadError, MAX_LOADED_RECORDS};

fn write_source(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("source.csv");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn missing_source_fails_with_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.csv");

    let err = load_records(&path).unwrap_err();
    assert!(matches!(err, LoadError::SourceNotFound(missing) if missing == path));
}

#[test]
fn header_only_source_yields_no_records() {
    let dir = tempdir().unwrap();
    let path = write_source(&dir, "site,year,transect,quadrat,species,count\n");

    let records = load_records(&path).unwrap();
    assert!(records.is_empty());
}

#[test]
fn first_line_is_discarded_even_when_it_looks_like_data() {
    let dir = tempdir().unwrap();
    let path = write_source(&dir, "S0,1990,T0,Q0,Heart Cockle,7\nS1,1997,T1,Q1,Butter Clam,12\n");

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].site, "S1");
}

#[test]
fn malformed_rows_are_skipped_without_failing_the_load() {
    let dir = tempdir().unwrap();
    let path = write_source(
        &dir,
        "site,year,transect,quadrat,species,count\n\
         S1,1997,T1,Q1,Butter Clam,12\n\
         S1,1997,T1,Q2\n\
         S2,1998,T2,Q1,Littleneck Clam,3\n\
         S2,1998,T2,Q2,Horse Clam,0\n",
    );

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].site, "S1");
    assert_eq!(records[0].quadrat, "Q1");
    assert_eq!(records[1].species, "Littleneck Clam");
    assert_eq!(records[2].count, "0");
}

#[test]
fn loaded_records_are_transient() {
    let dir = tempdir().unwrap();
    let path = write_source(
        &dir,
        "site,year,transect,quadrat,species,count\nS1,1997,T1,Q1,Butter Clam,12\n",
    );

    let records = load_records(&path).unwrap();
    assert_eq!(records[0].id, None);
}

#[test]
fn fields_are_trimmed_and_extra_fields_ignored() {
    let dir = tempdir().unwrap();
    let path = write_source(
        &dir,
        "site,year,transect,quadrat,species,count\n S1 , 1997 ,T1,Q1, Butter Clam ,12,extra,columns\n",
    );

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].site, "S1");
    assert_eq!(records[0].year, "1997");
    assert_eq!(records[0].species, "Butter Clam");
    assert_eq!(records[0].count, "12");
}

#[test]
fn load_stops_at_the_record_cap_in_file_order() {
    let dir = tempdir().unwrap();
    let mut contents = String::from("site,year,transect,quadrat,species,count\n");
    for index in 0..150 {
        contents.push_str(&format!("S{index},1997,T1,Q1,Butter Clam,{index}\n"));
    }
    let path = write_source(&dir, &contents);

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), MAX_LOADED_RECORDS);
    assert_eq!(records[0].site, "S0");
    assert_eq!(records[MAX_LOADED_RECORDS - 1].site, "S99");
}

#[test]
fn parse_line_rejects_short_rows() {
    assert!(parse_line("S1,1997,T1,Q1,Butter Clam").is_none());
    assert!(parse_line("").is_none());
}

#[test]
fn parse_then_serialize_round_trips_the_tracked_fields() {
    let record = parse_line("S1, 1997 ,T1,Q1, Butter Clam ,12,ignored").unwrap();
    assert_eq!(to_csv_row(&record), "S1,1997,T1,Q1,Butter Clam,12");
}
