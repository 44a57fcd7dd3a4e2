//! End-to-end tests: load a metadata table from disk, split it, write it
//! back and check the labels that come out.

use std::collections::BTreeMap;
use std::path::Path;

use pretty_assertions::assert_eq;
use rusty_split::{
    load_file, write_file, FilterMode, MetadataTable, MetadataValue, Proportions, Record,
    SplitConfig, SplitLabel, Splitter,
};

/// 100 traces with string indices; every fifth pair of rows has P and S
/// picks, giving 40 eligible rows.
fn waveform_metadata() -> MetadataTable {
    let records = (0..100i64)
        .map(|i| {
            Record::new(format!("XX.STA{:02}..HH.{i}", i % 7))
                .with("PS-pairs", i % 5 < 2)
                .with("source_magnitude", 1.0 + (i % 13) as f64 / 4.0)
                .with("station_code", format!("STA{:02}", i % 7))
        })
        .collect();
    MetadataTable::from_records(records).with_index_name(Some("trace_name".to_string()))
}

fn splitter(config: &SplitConfig) -> Splitter {
    Splitter::from_config(config)
}

fn ps_config() -> SplitConfig {
    SplitConfig {
        eligible_column: "PS-pairs".to_string(),
        index_column: Some("trace_name".to_string()),
        ..SplitConfig::default()
    }
}

fn labels(table: &MetadataTable, column: &str) -> BTreeMap<MetadataValue, MetadataValue> {
    table
        .records
        .iter()
        .map(|r| (r.index.clone(), r.get(column).cloned().unwrap_or(MetadataValue::Null)))
        .collect()
}

fn round_trip(table: &MetadataTable, path: &Path) -> MetadataTable {
    write_file(table, path).unwrap();
    load_file(path, Some("trace_name")).unwrap()
}

#[test]
fn test_prefix_partition_of_forty_eligible_rows() {
    let mut table = waveform_metadata();
    let config = SplitConfig {
        proportions: Proportions::new(0.8, 0.1, 0.1),
        shuffle: false,
        ..ps_config()
    };

    let sizes = splitter(&config).split(&mut table).unwrap();
    assert_eq!((sizes.train, sizes.dev, sizes.test), (32, 4, 4));

    let eligible: Vec<&Record> = table
        .records
        .iter()
        .filter(|r| r.get("PS-pairs") == Some(&MetadataValue::Bool(true)))
        .collect();
    let eligible_labels: Vec<String> = eligible
        .iter()
        .map(|r| r.get("split").map(|v| v.to_string()).unwrap_or_default())
        .collect();
    let mut expected = vec!["train".to_string(); 32];
    expected.extend(vec!["dev".to_string(); 4]);
    expected.extend(vec!["test".to_string(); 4]);
    assert_eq!(eligible_labels, expected);

    assert_eq!(table.value_counts("split")[&MetadataValue::from("Undefined")], 60);
}

#[test]
fn test_seeded_split_survives_every_file_format() {
    let config = SplitConfig {
        seed: Some(2024),
        ..ps_config()
    };
    let mut table = waveform_metadata();
    splitter(&config).split(&mut table).unwrap();
    let expected = labels(&table, "split");

    let dir = tempfile::tempdir().unwrap();
    for name in ["split.csv", "split.json", "split.parquet"] {
        let back = round_trip(&table, &dir.path().join(name));
        assert_eq!(labels(&back, "split"), expected, "{name}");
    }
}

#[test]
fn test_same_seed_on_reloaded_table_gives_same_labels() {
    let dir = tempfile::tempdir().unwrap();
    let original = waveform_metadata();
    let reloaded = round_trip(&original, &dir.path().join("meta.parquet"));

    let config = SplitConfig {
        mode: FilterMode::All,
        seed: Some(99),
        ..ps_config()
    };
    let a = splitter(&config).assign(&original).unwrap();
    let b = splitter(&config).assign(&reloaded).unwrap();
    assert_eq!(a.to_map(), b.to_map());
}

#[test]
fn test_exclude_mode_only_labels_ineligible_rows() {
    let mut table = waveform_metadata();
    let config = SplitConfig {
        mode: FilterMode::ExcludeFiltered,
        proportions: Proportions::new(0.5, 0.3, 0.2),
        seed: Some(1),
        ..ps_config()
    };
    let sizes = splitter(&config).split(&mut table).unwrap();
    assert_eq!(sizes.total(), 60);
    assert_eq!((sizes.train, sizes.dev, sizes.test), (30, 18, 12));

    for rec in &table.records {
        let label: SplitLabel = rec.get("split").unwrap().to_string().parse().unwrap();
        let eligible = rec.get("PS-pairs") == Some(&MetadataValue::Bool(true));
        assert_eq!(label == SplitLabel::Undefined, eligible, "{}", rec.index);
    }
}

#[test]
fn test_invalid_proportions_keep_existing_labels() {
    let mut table = waveform_metadata();
    splitter(&SplitConfig {
        seed: Some(5),
        ..ps_config()
    })
    .split(&mut table)
    .unwrap();
    let before = labels(&table, "split");

    let err = splitter(&SplitConfig {
        proportions: Proportions::new(0.9, 0.05, 0.1),
        ..ps_config()
    })
    .split(&mut table)
    .unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(labels(&table, "split"), before);
}

#[test]
fn test_config_file_drives_split() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("split.json");
    std::fs::write(
        &config_path,
        r#"{
            "mode": "include",
            "proportions": { "train": 0.5, "dev": 0.25, "test": 0.25 },
            "shuffle": false,
            "eligible_column": "PS-pairs",
            "split_column": "subset"
        }"#,
    )
    .unwrap();

    let config = SplitConfig::from_file(&config_path).unwrap();
    let mut table = waveform_metadata();
    let sizes = splitter(&config).split(&mut table).unwrap();

    assert_eq!((sizes.train, sizes.dev, sizes.test), (20, 10, 10));
    assert!(table.has_column("subset"));
    let counts = table.value_counts("subset");
    assert_eq!(counts[&MetadataValue::from("train")], 20);
    assert_eq!(counts[&MetadataValue::from("Undefined")], 60);
}
