//! Tab-separated export of every log.

use std::{
    fmt::{Display, Write as _},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, TimeZone};

use crate::db::LogRecord;

pub const EXPORT_HEADER: &str = "UTC Date\tLocal Date\tLabel\tLog";
pub const EXPORT_FILE_NAME: &str = "voicelog-export.tsv";
pub const EXPORT_MIME_TYPE: &str = "text/plain";

const LOCAL_DATE_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Render `records` with local dates shown in `local`.
pub fn format_delimited<Tz>(records: &[LogRecord], local: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(EXPORT_HEADER);
    out.push('\n');

    for record in records {
        let local_date = record
            .timestamp
            .with_timezone(local)
            .format(LOCAL_DATE_FORMAT);
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            local_date,
            field(record.label_key()),
            field(&record.text),
        );
    }

    out
}

/// Write an export under `<data_dir>/logs/` and return the file path.
pub fn write_export_file(data_dir: &Path, contents: &str) -> Result<PathBuf> {
    let logs_dir = data_dir.join("logs");
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("failed to create export directory {}", logs_dir.display()))?;

    let path = logs_dir.join(EXPORT_FILE_NAME);
    fs::write(&path, contents)
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    Ok(path)
}

// Tabs and line breaks inside a field would split the row.
fn field(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LogId;
    use chrono::{FixedOffset, Utc};
    use tempfile::tempdir;

    fn record(text: &str, label: Option<&str>) -> LogRecord {
        LogRecord {
            id: LogId::Assigned(1),
            text: text.into(),
            label: label.map(str::to_string),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 18, 5, 0).unwrap(),
        }
    }

    #[test]
    fn empty_export_is_header_only() {
        assert_eq!(format_delimited(&[], &Utc), format!("{EXPORT_HEADER}\n"));
    }

    #[test]
    fn rows_follow_header_column_order() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let out = format_delimited(&[record("buy milk", Some("errands"))], &tz);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], EXPORT_HEADER);
        assert_eq!(
            lines[1],
            "2024-01-15T18:05:00Z\tJan 15, 2024 1:05 PM\terrands\tbuy milk"
        );
    }

    #[test]
    fn local_column_depends_on_zone_but_utc_column_does_not() {
        let east = FixedOffset::east_opt(9 * 3600).unwrap();
        let west = FixedOffset::west_opt(8 * 3600).unwrap();
        let records = [record("x", None)];

        let a = format_delimited(&records, &east);
        let b = format_delimited(&records, &west);
        let row_a: Vec<&str> = a.lines().nth(1).unwrap().split('\t').collect();
        let row_b: Vec<&str> = b.lines().nth(1).unwrap().split('\t').collect();

        assert_eq!(row_a[0], row_b[0]);
        assert_eq!(row_a[1], "Jan 16, 2024 3:05 AM");
        assert_eq!(row_b[1], "Jan 15, 2024 10:05 AM");
        assert_eq!(row_a[2], "");
    }

    #[test]
    fn embedded_separators_are_flattened() {
        let out = format_delimited(&[record("line one\nline\ttwo", Some("a\tb"))], &Utc);
        let row = out.lines().nth(1).unwrap();
        assert_eq!(row.split('\t').count(), 4);
        assert!(row.ends_with("a b\tline one line two"));
    }

    #[test]
    fn export_file_lands_in_logs_dir() {
        let dir = tempdir().unwrap();
        let path = write_export_file(dir.path(), "UTC Date\n").unwrap();

        assert_eq!(path, dir.path().join("logs").join(EXPORT_FILE_NAME));
        assert_eq!(fs::read_to_string(path).unwrap(), "UTC Date\n");
    }
}
