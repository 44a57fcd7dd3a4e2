use std::path::PathBuf;

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_split::{write_file, MetadataTable, Record};

/// Writes a synthetic seismic trace metadata table for trying out
/// `rusty-split`. Output path defaults to `sample_metadata.csv`; the
/// extension picks the format.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_metadata.csv"));

    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let stations = ["ABC", "DEF", "GHI", "JKL"];
    let channels = ["HH", "EH", "BH"];

    let mut records = Vec::new();
    for event in 0..50 {
        let magnitude: f64 = rng.gen_range(0.5..4.5);
        for station in &stations {
            for channel in &channels {
                // Larger events are more likely to have both phases picked.
                let ps_pair = rng.gen_bool((0.2 + magnitude / 6.0).min(0.95));
                let snr: f64 = rng.gen_range(1.0..40.0);
                let trace_name = format!("ev{event:04}.XX.{station}..{channel}");
                records.push(
                    Record::new(trace_name)
                        .with("station_code", *station)
                        .with("channel", *channel)
                        .with("source_magnitude", (magnitude * 100.0).round() / 100.0)
                        .with("trace_snr_db", (snr * 10.0).round() / 10.0)
                        .with("PS-pairs", ps_pair),
                );
            }
        }
    }

    let table =
        MetadataTable::from_records(records).with_index_name(Some("trace_name".to_string()));
    write_file(&table, &output_path)?;

    let eligible = table
        .records
        .iter()
        .filter(|r| r.get("PS-pairs").and_then(|v| v.as_bool()) == Some(true))
        .count();
    println!(
        "Wrote {} traces ({eligible} with PS pairs) to {}",
        table.len(),
        output_path.display()
    );
    Ok(())
}
