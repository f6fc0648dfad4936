use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    helpers::{label_from_column, label_key, parse_datetime, storable_datetime, to_i64},
    models::{LogId, LogRecord},
    Database,
};

const SELECT_COLUMNS: &str = "SELECT id, datetime, text, label FROM logs";

fn row_to_log(row: &Row) -> Result<LogRecord> {
    let datetime: String = row.get("datetime")?;
    let label: Option<String> = row.get("label")?;

    Ok(LogRecord {
        id: LogId::Assigned(row.get("id")?),
        text: row.get("text")?,
        label: label_from_column(label),
        timestamp: parse_datetime(&datetime, "datetime")?,
    })
}

impl Database {
    /// Insert a new entry and return it with its store-assigned id.
    pub async fn insert_log(&self, record: &LogRecord) -> Result<LogRecord> {
        if let LogId::Assigned(id) = record.id {
            bail!("log {id} is already persisted");
        }

        let datetime = storable_datetime(&record.timestamp)?;
        let mut record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO logs (datetime, text, label) VALUES (?1, ?2, ?3)",
                params![
                    datetime,
                    record.text,
                    label_key(record.label.as_deref()),
                ],
            )?;
            record.id = LogId::Assigned(conn.last_insert_rowid());
            Ok(record)
        })
        .await
    }

    /// Remove one entry. Missing ids are ignored.
    pub async fn delete_log(&self, log_id: i64) -> Result<()> {
        self.execute(move |conn| {
            conn.execute("DELETE FROM logs WHERE id = ?1", params![log_id])?;
            Ok(())
        })
        .await
    }

    /// Remove every entry filed under `label` and return how many went.
    pub async fn delete_logs_with_label(&self, label: &str) -> Result<usize> {
        let label = label.to_string();
        self.execute(move |conn| {
            let removed = conn.execute(
                "DELETE FROM logs WHERE COALESCE(label, '') = ?1",
                params![label],
            )?;
            Ok(removed)
        })
        .await
    }

    /// Move every entry from `old_label` to `new_label` in one statement.
    pub async fn update_label(&self, old_label: &str, new_label: &str) -> Result<usize> {
        let old_label = old_label.to_string();
        let new_label = new_label.to_string();
        self.execute(move |conn| {
            let renamed = conn.execute(
                "UPDATE logs SET label = ?1 WHERE COALESCE(label, '') = ?2",
                params![new_label, old_label],
            )?;
            Ok(renamed)
        })
        .await
    }

    /// Replace the text and label of an existing entry.
    pub async fn update_log(
        &self,
        log_id: i64,
        text: String,
        label: Option<String>,
    ) -> Result<()> {
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE logs SET text = ?1, label = ?2 WHERE id = ?3",
                params![text, label_key(label.as_deref()), log_id],
            )?;

            if rows_affected == 0 {
                return Err(anyhow!("log {log_id} not found"));
            }

            Ok(())
        })
        .await
    }

    pub async fn get_log(&self, log_id: i64) -> Result<Option<LogRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
            let log = stmt
                .query_row(params![log_id], |row| Ok(row_to_log(row)))
                .optional()?
                .transpose()?;
            Ok(log)
        })
        .await
    }

    /// Every entry in insertion order. Used for export.
    pub async fn get_all_logs(&self) -> Result<Vec<LogRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;

            let mut rows = stmt.query([])?;
            let mut logs = Vec::new();
            while let Some(row) = rows.next()? {
                logs.push(row_to_log(row)?);
            }

            Ok(logs)
        })
        .await
    }

    /// Distinct labels in use. Unlabelled entries contribute `""`.
    pub async fn get_distinct_labels(&self) -> Result<BTreeSet<String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT DISTINCT COALESCE(label, '') FROM logs")?;

            let mut rows = stmt.query([])?;
            let mut labels = BTreeSet::new();
            while let Some(row) = rows.next()? {
                labels.insert(row.get::<_, String>(0)?);
            }

            Ok(labels)
        })
        .await
    }

    /// One page of entries under `label`, newest first.
    ///
    /// Equal timestamps fall back to id order so repeated reads between
    /// mutations always slice the same sequence.
    pub async fn get_logs_page(
        &self,
        label: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<LogRecord>> {
        let label = label.to_string();
        let offset = to_i64(offset)?;
        let limit = to_i64(limit)?;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS}
                 WHERE COALESCE(label, '') = ?1
                 ORDER BY datetime DESC, id ASC
                 LIMIT ?2 OFFSET ?3"
            ))?;

            let mut rows = stmt.query(params![label, limit, offset])?;
            let mut logs = Vec::new();
            while let Some(row) = rows.next()? {
                logs.push(row_to_log(row)?);
            }

            Ok(logs)
        })
        .await
    }

    /// Newest entry under `label`, if any.
    pub async fn get_most_recent_log(&self, label: &str) -> Result<Option<LogRecord>> {
        let label = label.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS}
                 WHERE COALESCE(label, '') = ?1
                 ORDER BY datetime DESC, id ASC
                 LIMIT 1"
            ))?;

            let log = stmt
                .query_row(params![label], |row| Ok(row_to_log(row)))
                .optional()?
                .transpose()?;
            Ok(log)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
    use tempfile::{tempdir, TempDir};

    fn open() -> (TempDir, Database) {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("voicelog.sqlite3")).unwrap();
        (dir, db)
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap()
    }

    async fn insert(db: &Database, text: &str, label: &str, minutes: i64) -> LogRecord {
        let label = (!label.is_empty()).then(|| label.to_string());
        db.insert_log(&LogRecord::new(text, label, base_time() + Duration::minutes(minutes)))
            .await
            .unwrap()
    }

    fn texts(logs: &[LogRecord]) -> Vec<&str> {
        logs.iter().map(|log| log.text.as_str()).collect()
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let (_dir, db) = open();
        let first = insert(&db, "one", "", 0).await;
        let second = insert(&db, "two", "", 1).await;

        let (LogId::Assigned(a), LogId::Assigned(b)) = (first.id, second.id) else {
            panic!("ids not assigned");
        };
        assert!(b > a);
    }

    #[tokio::test]
    async fn insert_rejects_persisted_records() {
        let (_dir, db) = open();
        let stored = insert(&db, "one", "", 0).await;
        assert!(db.insert_log(&stored).await.is_err());
    }

    #[tokio::test]
    async fn insert_rejects_years_past_9999_without_writing() {
        let (_dir, db) = open();
        insert(&db, "normal", "", 0).await;

        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let too_late = LogRecord::new("far future", None, last + Duration::seconds(2));
        assert!(db.insert_log(&too_late).await.is_err());

        let page = db.get_logs_page("", 0, 10).await.unwrap();
        assert_eq!(texts(&page), vec!["normal"]);
        assert_eq!(db.get_all_logs().await.unwrap().len(), 1);

        let edge = db
            .insert_log(&LogRecord::new("last second", None, last))
            .await
            .unwrap();
        let page = db.get_logs_page("", 0, 10).await.unwrap();
        assert_eq!(texts(&page), vec!["last second", "normal"]);
        assert_eq!(page[0].timestamp, edge.timestamp);
    }

    #[tokio::test]
    async fn get_log_finds_by_id() {
        let (_dir, db) = open();
        let stored = insert(&db, "tagged", "work", 0).await;

        let found = db.get_log(stored.id.get().unwrap()).await.unwrap();
        assert_eq!(found, Some(stored));
        assert!(db.get_log(9_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn page_is_newest_first_with_id_tiebreak() {
        let (_dir, db) = open();
        insert(&db, "tie-a", "work", 5).await;
        insert(&db, "oldest", "work", 0).await;
        insert(&db, "tie-b", "work", 5).await;
        insert(&db, "newest", "work", 9).await;

        let page = db.get_logs_page("work", 0, 10).await.unwrap();
        assert_eq!(texts(&page), vec!["newest", "tie-a", "tie-b", "oldest"]);
    }

    #[tokio::test]
    async fn page_respects_offset_and_limit() {
        let (_dir, db) = open();
        for minute in 0..5 {
            insert(&db, &format!("note {minute}"), "", minute).await;
        }

        let page = db.get_logs_page("", 1, 2).await.unwrap();
        assert_eq!(texts(&page), vec!["note 3", "note 2"]);

        let past_end = db.get_logs_page("", 10, 2).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn page_filters_by_exact_label() {
        let (_dir, db) = open();
        insert(&db, "a", "Work", 0).await;
        insert(&db, "b", "work", 1).await;
        insert(&db, "c", "", 2).await;

        let page = db.get_logs_page("work", 0, 10).await.unwrap();
        assert_eq!(texts(&page), vec!["b"]);

        let unlabelled = db.get_logs_page("", 0, 10).await.unwrap();
        assert_eq!(texts(&unlabelled), vec!["c"]);
    }

    #[tokio::test]
    async fn null_and_empty_labels_share_a_filter() {
        let (_dir, db) = open();
        insert(&db, "empty", "", 1).await;
        db.execute(|conn| {
            conn.execute(
                "INSERT INTO logs (datetime, text, label) VALUES ('2024-02-01T07:00:00.000000000Z', 'legacy', NULL)",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        let page = db.get_logs_page("", 0, 10).await.unwrap();
        assert_eq!(texts(&page), vec!["empty", "legacy"]);
        assert!(page.iter().all(|log| log.label.is_none()));

        let labels = db.get_distinct_labels().await.unwrap();
        assert_eq!(labels.into_iter().collect::<Vec<_>>(), vec![String::new()]);

        assert_eq!(db.delete_logs_with_label("").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_removes_only_the_given_id() {
        let (_dir, db) = open();
        let keep = insert(&db, "keep", "", 0).await;
        let gone = insert(&db, "gone", "", 1).await;

        db.delete_log(gone.id.get().unwrap()).await.unwrap();
        db.delete_log(9_999).await.unwrap();

        let all = db.get_all_logs().await.unwrap();
        assert_eq!(all, vec![keep]);
    }

    #[tokio::test]
    async fn delete_with_label_leaves_other_labels() {
        let (_dir, db) = open();
        insert(&db, "w1", "work", 0).await;
        insert(&db, "p1", "personal", 1).await;
        insert(&db, "w2", "work", 2).await;

        assert_eq!(db.delete_logs_with_label("work").await.unwrap(), 2);
        assert_eq!(db.delete_logs_with_label("missing").await.unwrap(), 0);

        let all = db.get_all_logs().await.unwrap();
        assert_eq!(texts(&all), vec!["p1"]);
    }

    #[tokio::test]
    async fn update_label_renames_every_match() {
        let (_dir, db) = open();
        insert(&db, "a", "old", 0).await;
        insert(&db, "b", "old", 1).await;
        insert(&db, "c", "other", 2).await;

        assert_eq!(db.update_label("old", "new").await.unwrap(), 2);

        assert!(db.get_logs_page("old", 0, 10).await.unwrap().is_empty());
        assert_eq!(texts(&db.get_logs_page("new", 0, 10).await.unwrap()), vec!["b", "a"]);
        assert_eq!(texts(&db.get_logs_page("other", 0, 10).await.unwrap()), vec!["c"]);
    }

    #[tokio::test]
    async fn update_log_edits_text_and_label() {
        let (_dir, db) = open();
        let stored = insert(&db, "draft", "", 0).await;
        let id = stored.id.get().unwrap();

        db.update_log(id, "final".into(), Some("work".into()))
            .await
            .unwrap();

        let page = db.get_logs_page("work", 0, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, stored.id);
        assert_eq!(page[0].text, "final");
        assert_eq!(page[0].timestamp, stored.timestamp);
    }

    #[tokio::test]
    async fn update_log_reports_missing_id() {
        let (_dir, db) = open();
        assert!(db.update_log(42, "x".into(), None).await.is_err());
    }

    #[tokio::test]
    async fn distinct_labels_lists_each_label_once() {
        let (_dir, db) = open();
        insert(&db, "a", "work", 0).await;
        insert(&db, "b", "work", 1).await;
        insert(&db, "c", "home", 2).await;

        let labels = db.get_distinct_labels().await.unwrap();
        assert_eq!(
            labels.into_iter().collect::<Vec<_>>(),
            vec!["home".to_string(), "work".to_string()]
        );
    }

    #[tokio::test]
    async fn most_recent_picks_newest_under_label() {
        let (_dir, db) = open();
        assert!(db.get_most_recent_log("").await.unwrap().is_none());

        insert(&db, "old", "", 0).await;
        insert(&db, "new", "", 3).await;
        insert(&db, "elsewhere", "work", 9).await;

        let last = db.get_most_recent_log("").await.unwrap().unwrap();
        assert_eq!(last.text, "new");
    }

    #[tokio::test]
    async fn timestamps_round_trip_as_the_same_instant() {
        let (_dir, db) = open();
        let tz = FixedOffset::east_opt(9 * 3600 + 30 * 60).unwrap();
        let at = tz
            .with_ymd_and_hms(2024, 7, 4, 23, 15, 0)
            .unwrap()
            + Duration::nanoseconds(123_456_789);

        db.insert_log(&LogRecord::new("tokyo-ish", None, at))
            .await
            .unwrap();

        let stored = db.get_all_logs().await.unwrap().remove(0);
        assert_eq!(stored.timestamp, at);
    }
}
