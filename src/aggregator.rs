use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{AggregateError, Result};
use crate::record::{self, Record};

/// Header of every summary table.
pub const HEADER: [&str; 3] = ["input", "throughput", "duration"];

/// Collects criterion samples as `group -> value -> samples`.
pub struct BenchmarkAggregator {
    groups: HashMap<String, Group>,
}

impl BenchmarkAggregator {
    pub fn new() -> Self {
        BenchmarkAggregator {
            groups: HashMap::new(),
        }
    }

    /// Ingests every row of the `raw.csv` file at `path`.
    pub fn process(&mut self, path: &Path) -> Result<usize> {
        let file = File::open(path).map_err(|source| AggregateError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        self.process_reader(path, io::BufReader::new(file))
    }

    /// Like [`process`](Self::process), reading from `source` and using `path` for diagnostics.
    pub fn process_reader<R: io::Read>(&mut self, path: &Path, source: R) -> Result<usize> {
        let rows = record::read_records(path, source, |record| self.ingest(&record))?;
        debug!("{}: {} rows", path.display(), rows);
        Ok(rows)
    }

    /// Adds one record. On error the aggregator is left untouched.
    pub fn ingest(&mut self, record: &Record) -> Result<()> {
        let sample = record.sample()?;

        let group = self.groups.entry(record.group.clone()).or_default();
        match group.entries.entry(record.value) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.throughput != record.throughput {
                    return Err(AggregateError::ThroughputMismatch {
                        group: record.group.clone(),
                        value: record.value,
                        expected: entry.throughput,
                        found: record.throughput,
                    });
                }
                entry.samples.push(sample);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(GroupEntry {
                    value: record.value,
                    throughput: record.throughput,
                    samples: vec![sample],
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group names in ascending order.
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Writes one summary table per group into `output_dir`, named `<prefix><group>.csv`.
    ///
    /// Returns the written paths in group name order. Fails before writing
    /// anything if two groups map to the same file name.
    pub fn emit(&self, output_dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
        let targets = self.output_paths(output_dir, prefix)?;
        if !targets.is_empty() {
            fs::create_dir_all(output_dir)
                .map_err(|source| AggregateError::output(output_dir, source))?;
        }

        let mut written = Vec::with_capacity(targets.len());
        for (name, path) in targets {
            let rows = self.groups[name].rows()?;
            info!("Writing group {} to file {}...", name, path.display());

            let file = File::create(&path).map_err(|source| AggregateError::output(&path, source))?;
            let mut output = BufWriter::new(file);
            write_rows(&rows, &mut output)
                .and_then(|_| output.flush())
                .map_err(|source| AggregateError::output(&path, source))?;

            info!("Finished writing group {}!", name);
            written.push(path);
        }
        Ok(written)
    }

    fn output_paths(&self, output_dir: &Path, prefix: &str) -> Result<Vec<(&str, PathBuf)>> {
        let mut owners: HashMap<String, &str> = HashMap::with_capacity(self.groups.len());
        let mut targets = Vec::with_capacity(self.groups.len());
        for name in self.group_names() {
            let file_name = output_file_name(prefix, name);
            if let Some(first) = owners.insert(file_name.clone(), name) {
                return Err(AggregateError::OutputNameClash {
                    first: first.to_owned(),
                    second: name.to_owned(),
                    path: output_dir.join(file_name),
                });
            }
            targets.push((name, output_dir.join(file_name)));
        }
        Ok(targets)
    }
}

impl Default for BenchmarkAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// All entries of one benchmark group, keyed by input value.
#[derive(Default, Debug)]
pub struct Group {
    entries: HashMap<i64, GroupEntry>,
}

impl Group {
    /// Summary rows sorted by ascending value.
    pub fn rows(&self) -> Result<Vec<OutputRow>> {
        let mut values: Vec<_> = self.entries.keys().collect();
        values.sort_unstable();

        let mut rows = Vec::with_capacity(values.len());
        for value in values {
            let entry = &self.entries[value];
            let row = entry.summarize()?;
            debug!(
                "{} - {} - {} - {:?}",
                row.value, row.throughput, row.average, entry.samples
            );
            rows.push(row);
        }
        Ok(rows)
    }

    pub fn entry(&self, value: i64) -> Option<&GroupEntry> {
        self.entries.get(&value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct GroupEntry {
    pub value: i64,
    pub throughput: i64,
    /// Per-iteration durations in seconds, in encounter order.
    pub samples: Vec<f64>,
}

impl GroupEntry {
    fn summarize(&self) -> Result<OutputRow> {
        Ok(OutputRow {
            value: self.value,
            throughput: self.throughput,
            average: mean(&self.samples)?,
        })
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct OutputRow {
    pub value: i64,
    pub throughput: i64,
    /// Mean per-iteration duration in seconds.
    pub average: f64,
}

/// Arithmetic mean of `samples`.
pub fn mean(samples: &[f64]) -> Result<f64> {
    if samples.is_empty() {
        return Err(AggregateError::EmptySampleSet);
    }
    let sum: f64 = samples.iter().sum();
    Ok(sum / samples.len() as f64)
}

/// Writes `rows` as a comma separated table with [`HEADER`].
///
/// Floats use `Display`, which never depends on locale and never switches to
/// exponent notation.
pub fn write_rows(rows: &[OutputRow], output: &mut dyn Write) -> io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(output);
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record([
            row.value.to_string(),
            row.throughput.to_string(),
            row.average.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// File name for a group's table. Path separators in the group name become `_`.
pub fn output_file_name(prefix: &str, group: &str) -> String {
    let group: String = group
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}{}.csv", prefix, group)
}
