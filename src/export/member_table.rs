//! CSV member tables: one row per valid time, one column per ensemble member.

use crate::export::error::ExportError;
use crate::types::ensemble_matrix::EnsembleMatrix;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub const VALID_TIME_COLUMN: &str = "ValidTime";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A member table read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberTable {
    pub valid_times: Vec<DateTime<Utc>>,
    pub matrix: EnsembleMatrix,
}

/// Column name of a zero-based member, e.g. `gep1` for member 0.
pub fn member_column(prefix: &str, member: usize) -> String {
    format!("{}{}", prefix, member + 1)
}

/// Builds the `ValidTime` + `{prefix}1..{prefix}N` frame for one variable.
///
/// MISSING cells become nulls.
pub fn member_table_frame(
    valid_times: &[DateTime<Utc>],
    matrix: &EnsembleMatrix,
    prefix: &str,
) -> Result<DataFrame, ExportError> {
    if valid_times.len() != matrix.lead_times() {
        return Err(ExportError::ShapeMismatch {
            valid_times: valid_times.len(),
            lead_times: matrix.lead_times(),
        });
    }

    let millis: Vec<i64> = valid_times.iter().map(|t| t.timestamp_millis()).collect();
    let mut columns: Vec<Column> = Vec::with_capacity(matrix.members() + 1);
    columns.push(
        Series::new(VALID_TIME_COLUMN.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .into(),
    );
    for member in 0..matrix.members() {
        let name = member_column(prefix, member);
        columns.push(Series::new(name.into(), matrix.member_series(member)).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Writes a member table as CSV with a header row.
///
/// Timestamps use [`TIMESTAMP_FORMAT`]; MISSING cells are left empty.
pub fn write_member_table(
    path: &Path,
    valid_times: &[DateTime<Utc>],
    matrix: &EnsembleMatrix,
    prefix: &str,
) -> Result<(), ExportError> {
    let mut frame = member_table_frame(valid_times, matrix, prefix)?;
    let mut file = File::create(path).map_err(|e| ExportError::Create(path.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_datetime_format(Some(TIMESTAMP_FORMAT.to_string()))
        .finish(&mut frame)
        .map_err(|source| ExportError::Polars {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        "Wrote {} ({} members x {} valid times)",
        path.display(),
        matrix.members(),
        valid_times.len()
    );
    Ok(())
}

/// Reads a table written by [`write_member_table`].
///
/// Member columns are every `{prefix}<n>` column, which must run from 1 to
/// their count without gaps. Empty cells read back as MISSING.
pub fn read_member_table(path: &Path, prefix: &str) -> Result<MemberTable, ExportError> {
    let polars_error = |source| ExportError::Polars {
        path: path.to_path_buf(),
        source,
    };
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(polars_error)?
        .finish()
        .map_err(polars_error)?;

    let column = |name: &str| {
        frame
            .column(name)
            .map_err(|_| ExportError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };

    let time_column = column(VALID_TIME_COLUMN)?.cast(&DataType::String)?;
    let valid_times = time_column
        .str()?
        .into_iter()
        .map(|value| {
            let value = value.unwrap_or_default();
            NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
                .map(|t| t.and_utc())
                .map_err(|source| ExportError::TimeParse {
                    value: value.to_string(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let members = frame
        .get_column_names()
        .iter()
        .filter(|name| {
            name.as_str()
                .strip_prefix(prefix)
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        })
        .count();

    let mut rows = Vec::with_capacity(members);
    for member in 0..members {
        let values = column(&member_column(prefix, member))?.cast(&DataType::Float64)?;
        rows.push(values.f64()?.into_iter().collect::<Vec<Option<f64>>>());
    }
    let matrix = if rows.is_empty() {
        EnsembleMatrix::new(0, valid_times.len())
    } else {
        EnsembleMatrix::from_rows(rows).ok_or(ExportError::ShapeMismatch {
            valid_times: valid_times.len(),
            lead_times: 0,
        })?
    };

    debug!(
        "Read {} ({} members x {} valid times)",
        path.display(),
        members,
        valid_times.len()
    );
    Ok(MemberTable {
        valid_times,
        matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn times() -> Vec<DateTime<Utc>> {
        let init = Utc.with_ymd_and_hms(2017, 4, 12, 0, 0, 0).unwrap();
        (0..3).map(|i| init + chrono::Duration::hours(6 * i)).collect()
    }

    fn matrix() -> EnsembleMatrix {
        EnsembleMatrix::from_rows(vec![
            vec![Some(71.5), Some(68.25), None],
            vec![Some(70.0), None, Some(59.5)],
        ])
        .unwrap()
    }

    #[test]
    fn test_frame_layout() -> Result<(), Box<dyn std::error::Error>> {
        let frame = member_table_frame(&times(), &matrix(), "gep")?;
        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["ValidTime", "gep1", "gep2"]);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.column("gep2")?.f64()?.get(1), None);
        Ok(())
    }

    #[test]
    fn test_write_then_read_preserves_missing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("maxtemps.csv");
        write_member_table(&path, &times(), &matrix(), "gep")?;

        let text = std::fs::read_to_string(&path)?;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ValidTime,gep1,gep2"));
        assert!(lines
            .next()
            .is_some_and(|row| row.starts_with("2017-04-12 00:00:00,")));

        let table = read_member_table(&path, "gep")?;
        assert_eq!(table.valid_times, times());
        assert_eq!(table.matrix, matrix());
        Ok(())
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let result = member_table_frame(&times()[..2], &matrix(), "gep");
        assert!(matches!(
            result,
            Err(ExportError::ShapeMismatch {
                valid_times: 2,
                lead_times: 3
            })
        ));
    }

    #[test]
    fn test_read_without_time_column_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "when,gep1\n2017-04-12 00:00:00,1.0\n")?;
        assert!(matches!(
            read_member_table(&path, "gep"),
            Err(ExportError::MissingColumn { .. })
        ));
        Ok(())
    }
}
