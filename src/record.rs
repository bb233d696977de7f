use std::io::Read;
use std::path::Path;

use log::trace;
use serde::Deserialize;

use crate::error::{AggregateError, Result};
use crate::units::TimeUnit;

/// Columns a `raw.csv` file must carry. Anything else criterion writes is ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "group",
    "value",
    "throughput_num",
    "unit",
    "sample_measured_value",
    "iteration_count",
];

/// One row of a criterion `raw.csv` file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Record {
    pub group: String,
    pub value: i64,
    #[serde(rename = "throughput_num")]
    pub throughput: i64,
    #[serde(rename = "sample_measured_value")]
    pub measured_value: f64,
    pub iteration_count: u64,
    pub unit: String,
}

impl Record {
    /// Duration of a single iteration, in seconds.
    pub fn sample(&self) -> Result<f64> {
        let unit: TimeUnit = self.unit.parse()?;
        Ok(self.measured_value / self.iteration_count as f64 / unit.scale() as f64)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.iteration_count == 0 {
            return Err("iteration_count must be positive".to_string());
        }
        if !self.measured_value.is_finite() {
            return Err(format!(
                "sample_measured_value is not a finite number: {}",
                self.measured_value
            ));
        }
        Ok(())
    }
}

/// Reads every row of `source` and hands it to `consume`, stopping at the first error.
///
/// `path` only labels errors; the data comes from `source`. Errors returned by
/// `consume` are tagged with the path and line of the row that caused them.
/// Returns the number of rows consumed.
pub fn read_records<R, F>(path: &Path, source: R, mut consume: F) -> Result<usize>
where
    R: Read,
    F: FnMut(Record) -> Result<()>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|err| csv_error(path, err))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(AggregateError::malformed(
                path,
                1,
                format!("missing column '{}'", column),
            ));
        }
    }

    let mut row = csv::StringRecord::new();
    let mut count = 0;
    while reader
        .read_record(&mut row)
        .map_err(|err| csv_error(path, err))?
    {
        let line = row.position().map_or(0, |pos| pos.line());
        let record: Record = row
            .deserialize(Some(&headers))
            .map_err(|err| AggregateError::malformed(path, line, err.to_string()))?;
        record
            .validate()
            .map_err(|message| AggregateError::malformed(path, line, message))?;

        trace!("{}:{} {:?}", path.display(), line, record);
        consume(record).map_err(|err| err.in_row(path, line))?;
        count += 1;
    }

    Ok(count)
}

fn csv_error(path: &Path, err: csv::Error) -> AggregateError {
    let line = err.position().map_or(0, |pos| pos.line());
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => AggregateError::Input {
            path: path.to_path_buf(),
            source,
        },
        _ => AggregateError::malformed(path, line, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "group,function,value,throughput_num,throughput_type,sample_measured_value,unit,iteration_count\n";

    fn read(input: &str) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        read_records(Path::new("raw.csv"), input.as_bytes(), |record| {
            records.push(record);
            Ok(())
        })?;
        Ok(records)
    }

    fn record(measured_value: f64, iteration_count: u64, unit: &str) -> Record {
        Record {
            group: "parse".to_string(),
            value: 100,
            throughput: 1000,
            measured_value,
            iteration_count,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_sample_conversion() {
        let sample = record(5_000_000_000.0, 1000, "ns").sample().unwrap();
        assert!((sample - 0.005).abs() < 1e-15);

        let sample = record(5_000_000_000_000.0, 1000, "ns").sample().unwrap();
        assert!((sample - 5.0).abs() < 1e-12);

        let sample = record(3_000.0, 3, "ms").sample().unwrap();
        assert!((sample - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_unknown_unit() {
        let err = record(1.0, 1, "fortnights").sample().unwrap_err();
        assert!(matches!(err, AggregateError::UnknownUnit { ref unit } if unit == "fortnights"));
    }

    #[test]
    fn test_read_criterion_rows() {
        let input = format!(
            "{}parse,,100,1000,bytes,200,ns,1\nparse,,200,2000,bytes,4100.5,ns,10\n",
            HEADER
        );
        let records = read(&input).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], record(200.0, 1, "ns"));
        assert_eq!(records[1].value, 200);
        assert_eq!(records[1].throughput, 2000);
        assert_eq!(records[1].measured_value, 4100.5);
        assert_eq!(records[1].iteration_count, 10);
    }

    #[test]
    fn test_read_columns_in_any_order() {
        let input = "unit,iteration_count,sample_measured_value,throughput_num,value,group\nns,4,800,10,3,g\n";
        let records = read(input).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].group, "g");
        assert_eq!(records[0].value, 3);
        assert_eq!(records[0].iteration_count, 4);
    }

    #[test]
    fn test_negative_value_and_throughput() {
        let input = format!("{}parse,,-5,-10,bytes,200,ns,1\n", HEADER);
        let records = read(&input).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, -5);
        assert_eq!(records[0].throughput, -10);
    }

    #[test]
    fn test_group_whitespace_is_kept() {
        let input = format!(
            "{}parse,,100,1000,bytes,200,ns,1\n parse,,100,1000,bytes,200,ns,1\n",
            HEADER
        );
        let records = read(&input).unwrap();

        assert_eq!(records[0].group, "parse");
        assert_eq!(records[1].group, " parse");
    }

    #[test]
    fn test_read_header_only() {
        assert!(read(HEADER).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column() {
        let input = "group,value,unit,sample_measured_value,iteration_count\nparse,100,ns,200,1\n";
        match read(input).unwrap_err() {
            AggregateError::MalformedRow { line, message, .. } => {
                assert_eq!(line, 1);
                assert!(message.contains("throughput_num"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value() {
        let input = format!(
            "{}parse,,100,1000,bytes,200,ns,1\nparse,,abc,1000,bytes,200,ns,1\n",
            HEADER
        );
        match read(&input).unwrap_err() {
            AggregateError::MalformedRow { path, line, .. } => {
                assert_eq!(path, Path::new("raw.csv"));
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_iteration_count() {
        for count in ["0", "-5", ""] {
            let input = format!("{}parse,,100,1000,bytes,200,ns,{}\n", HEADER, count);
            let err = read(&input).unwrap_err();
            assert!(
                matches!(err, AggregateError::MalformedRow { line: 2, .. }),
                "iteration_count {:?} gave {:?}",
                count,
                err
            );
        }
    }

    #[test]
    fn test_consumer_error_carries_row() {
        let input = format!("{}parse,,100,1000,bytes,200,fortnights,1\n", HEADER);
        let err = read_records(Path::new("raw.csv"), input.as_bytes(), |record| {
            record.sample().map(|_| ())
        })
        .unwrap_err();

        match &err {
            AggregateError::InRow { line, .. } => assert_eq!(*line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(err.root(), AggregateError::UnknownUnit { .. }));
        let message = err.to_string();
        assert!(message.contains("raw.csv:2"), "{}", message);
        assert!(message.contains("fortnights"), "{}", message);
    }
}
