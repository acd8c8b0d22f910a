use crate::error::RowError;
use crate::record::{AllocMode, LatencyProfile, RunRecord};
use crate::schema::{Column, Schema};
use csv::StringRecord;
use std::str::FromStr;

/// Nanoseconds per microsecond; latency columns are written in ns.
const NS_PER_US: f64 = 1000.0;
/// Kilobytes per megabyte; memory columns are written in KB.
const KB_PER_MB: f64 = 1024.0;

/// Configuration for row parsing
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Substring of a file name marking pooled-allocation results, for files
    /// without an explicit mode column
    pub pooled_marker: String,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            pooled_marker: "pool".to_string(),
        }
    }
}

/// Parse one result row into a [`RunRecord`].
///
/// Fields are trimmed, coerced and normalized to in-memory units
/// (latency ns -> us, memory KB -> MB). A missing mandatory field or any
/// present field that fails coercion rejects the whole row.
pub fn parse_row(
    row: &StringRecord,
    schema: &Schema,
    source_file_name: &str,
    config: &ParseConfig,
) -> Result<RunRecord, RowError> {
    let cells = Cells { row, schema };

    let implementation = cells
        .text(Column::Implementation)
        .ok_or(RowError::MissingField(Column::Implementation.name()))?
        .to_string();
    let producers = cells.positive(Column::Producers)?;
    let consumers = cells.positive(Column::Consumers)?;
    let payload_us = cells.required::<u32>(Column::PayloadUs)?;
    let throughput = cells.required_float(Column::Throughput)?;

    let mode = match cells.text(Column::Mode) {
        Some(value) => {
            AllocMode::from_cell(value).ok_or_else(|| RowError::UnknownMode(value.to_string()))?
        }
        None => AllocMode::from_file_name(source_file_name, &config.pooled_marker),
    };

    let duration_s = match cells.text(Column::DurationS) {
        Some(_) => Some(cells.positive(Column::DurationS)?),
        None => None,
    };

    let mut latency = LatencyProfile::default();
    for column in [
        Column::AvgLat,
        Column::P50,
        Column::P95,
        Column::P99,
        Column::P999,
        Column::MaxLat,
    ] {
        if let (Some(ns), Some(percentile)) = (cells.float(column)?, column.percentile()) {
            latency.set(percentile, ns / NS_PER_US);
        }
    }

    let peak_mem_mb = cells.float(Column::PeakMemKb)?.map(|kb| kb / KB_PER_MB);
    let max_depth = cells.optional::<u64>(Column::MaxDepth)?;

    Ok(RunRecord {
        implementation,
        mode,
        producers,
        consumers,
        payload_us,
        duration_s,
        throughput,
        latency,
        peak_mem_mb,
        max_depth,
        source: source_file_name.to_string(),
    })
}

/// Typed access to the cells of one row through its file's schema.
struct Cells<'a> {
    row: &'a StringRecord,
    schema: &'a Schema,
}

impl<'a> Cells<'a> {
    /// Trimmed cell text; an absent column, a short row and an empty cell are all `None`.
    fn text(&self, column: Column) -> Option<&'a str> {
        self.schema
            .index(column)
            .and_then(|i| self.row.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn optional<T: FromStr>(&self, column: Column) -> Result<Option<T>, RowError> {
        match self.text(column) {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|_| coercion_error(column, value)),
            None => Ok(None),
        }
    }

    fn required<T: FromStr>(&self, column: Column) -> Result<T, RowError> {
        self.optional(column)?
            .ok_or(RowError::MissingField(column.name()))
    }

    fn positive(&self, column: Column) -> Result<u32, RowError> {
        let value = self.required::<u32>(column)?;
        if value == 0 {
            return Err(RowError::NotPositive {
                field: column.name(),
                value: value.to_string(),
            });
        }
        Ok(value)
    }

    /// Finite, non-negative float.
    fn float(&self, column: Column) -> Result<Option<f64>, RowError> {
        let Some(raw) = self.text(column) else {
            return Ok(None);
        };
        let value = raw
            .parse::<f64>()
            .map_err(|_| coercion_error(column, raw))?;
        if !value.is_finite() {
            return Err(RowError::InvalidNumber {
                field: column.name(),
                value: raw.to_string(),
            });
        }
        if value < 0.0 {
            return Err(RowError::Negative {
                field: column.name(),
                value: raw.to_string(),
            });
        }
        Ok(Some(value))
    }

    fn required_float(&self, column: Column) -> Result<f64, RowError> {
        self.float(column)?
            .ok_or(RowError::MissingField(column.name()))
    }
}

/// Integer columns report a leading minus sign as a sign error rather than garbage.
fn coercion_error(column: Column, value: &str) -> RowError {
    let negative_number = value
        .strip_prefix('-')
        .is_some_and(|rest| rest.parse::<f64>().is_ok());
    if negative_number {
        RowError::Negative {
            field: column.name(),
            value: value.to_string(),
        }
    } else {
        RowError::InvalidNumber {
            field: column.name(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FULL_HEADER: &str =
        "impl,P,C,payload_us,duration_s,throughput,avg_lat,p50,p95,p99,p999,max_lat,peak_mem_kb,max_depth";

    fn schema(header: &str) -> Schema {
        Schema::from_headers(header.split(','))
    }

    fn row(line: &str) -> StringRecord {
        StringRecord::from(line.split(',').collect::<Vec<_>>())
    }

    fn parse(header: &str, line: &str, file: &str) -> Result<RunRecord, RowError> {
        parse_row(&row(line), &schema(header), file, &ParseConfig::default())
    }

    #[test]
    fn test_units_normalized_once() {
        let record = parse(
            FULL_HEADER,
            "EBR,2,2,100,5,18000.5,1000,500,2000,3000,4000,9000,2048,17",
            "ebr.csv",
        )
        .unwrap();

        assert_relative_eq!(record.latency.avg.unwrap(), 1.0);
        assert_relative_eq!(record.latency.p50.unwrap(), 0.5);
        assert_relative_eq!(record.latency.p999.unwrap(), 4.0);
        assert_relative_eq!(record.latency.max.unwrap(), 9.0);
        assert_relative_eq!(record.peak_mem_mb.unwrap(), 2.0);
        assert_relative_eq!(record.throughput, 18000.5);
        assert_eq!(record.max_depth, Some(17));
        assert_eq!(record.duration_s, Some(5));
        assert_eq!(record.source, "ebr.csv");
    }

    #[test]
    fn test_values_and_names_are_trimmed() {
        let record = parse(
            " impl , P , C , payload_us , throughput_ops ",
            "  hp , 4 , 4 , 0 , 123.0 ",
            "hp.csv",
        )
        .unwrap();
        assert_eq!(record.implementation, "hp");
        assert_eq!((record.producers, record.consumers, record.payload_us), (4, 4, 0));
    }

    #[test]
    fn test_missing_mandatory_field_rejects_row() {
        let header = "impl,P,C,payload_us,throughput";
        assert_eq!(
            parse(header, ",1,1,100,10.0", "a.csv"),
            Err(RowError::MissingField("impl"))
        );
        assert_eq!(
            parse("impl,P,C,payload_us", "ebr,1,1,100", "a.csv"),
            Err(RowError::MissingField("throughput"))
        );
        // short row: the throughput cell does not exist at all
        assert_eq!(
            parse(header, "ebr,1,1,100", "a.csv"),
            Err(RowError::MissingField("throughput"))
        );
    }

    #[test]
    fn test_coercion_failures() {
        let header = "impl,P,C,payload_us,throughput,max_depth";
        assert!(matches!(
            parse(header, "ebr,two,1,100,10.0,1", "a.csv"),
            Err(RowError::InvalidNumber { field: "P", .. })
        ));
        assert!(matches!(
            parse(header, "ebr,0,1,100,10.0,1", "a.csv"),
            Err(RowError::NotPositive { field: "P", .. })
        ));
        assert!(matches!(
            parse(header, "ebr,1,1,-5,10.0,1", "a.csv"),
            Err(RowError::Negative { field: "payload_us", .. })
        ));
        assert!(matches!(
            parse(header, "ebr,1,1,100,-10.0,1", "a.csv"),
            Err(RowError::Negative { field: "throughput", .. })
        ));
        assert!(matches!(
            parse(header, "ebr,1,1,100,NaN,1", "a.csv"),
            Err(RowError::InvalidNumber { field: "throughput", .. })
        ));
        // an optional column that is present must still coerce
        assert!(matches!(
            parse(header, "ebr,1,1,100,10.0,deep", "a.csv"),
            Err(RowError::InvalidNumber { field: "max_depth", .. })
        ));
    }

    #[test]
    fn test_empty_optional_cell_is_absent() {
        let record = parse(
            "impl,P,C,payload_us,throughput,p99,max_depth",
            "ebr,1,1,100,10.0,,",
            "a.csv",
        )
        .unwrap();
        assert_eq!(record.latency.p99, None);
        assert_eq!(record.max_depth, None);
    }

    #[test]
    fn test_mode_from_file_name_when_no_column() {
        let header = "impl,P,C,payload_us,throughput";
        let pooled = parse(header, "ebr,1,1,100,10.0", "results_pool_v2.csv").unwrap();
        let heap = parse(header, "ebr,1,1,100,10.0", "results_v2.csv").unwrap();
        assert_eq!(pooled.mode, AllocMode::Pooled);
        assert_eq!(heap.mode, AllocMode::Heap);
    }

    #[test]
    fn test_explicit_mode_column_wins_over_file_name() {
        let header = "impl,mode,P,C,payload_us,throughput";
        let record = parse(header, "ebr,heap,1,1,100,10.0", "pool.csv").unwrap();
        assert_eq!(record.mode, AllocMode::Heap);
        assert_eq!(
            parse(header, "ebr,arena,1,1,100,10.0", "a.csv"),
            Err(RowError::UnknownMode("arena".to_string()))
        );
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(matches!(
            parse("impl,P,C,payload_us,duration_s,throughput", "ebr,1,1,100,0,10.0", "a.csv"),
            Err(RowError::NotPositive { field: "duration_s", .. })
        ));
    }
}
