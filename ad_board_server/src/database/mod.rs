use std::str::FromStr;

use ad_board_commons::record::AdRecord;
pub use sqlx::Error;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Executor, Row, Sqlite,
};

type Pool = sqlx::Pool<Sqlite>;

/// Whether an insert stored a new row or hit the dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

pub struct Database {
    pool: Pool,
}

impl Database {
    /// Open the database at `db_path`, creating it and its schema if
    /// needed.
    pub async fn new(db_path: &str) -> Result<Database, Error> {
        let db_url = format!("sqlite:{db_path}");

        if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            Sqlite::create_database(&db_url).await?;
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(32)
            .connect_with(
                SqliteConnectOptions::from_str(&db_url)?
                    .pragma("cache_size", "-32768")
                    .busy_timeout(std::time::Duration::from_secs(600)),
            )
            .await?;

        // ADS:
        // id (unique primary key, i64)
        // server_name, category, content, invite (strings)
        // timestamp (date+time in UTC in RFC3339 format)
        // author_id (i64 because sqlite doesn't support u64)
        //
        // One row per (author_id, timestamp); the constraint is what makes
        // submission idempotent under retries and concurrent writers.
        pool.execute(sqlx::query(
            "
                CREATE TABLE IF NOT EXISTS ads (
                    id INTEGER PRIMARY KEY NOT NULL,
                    server_name TEXT NOT NULL,
                    category TEXT NOT NULL,
                    content TEXT NOT NULL,
                    invite TEXT NOT NULL,
                    timestamp TEXT NOT NULL,
                    author_id INTEGER NOT NULL,
                    UNIQUE(author_id, timestamp)
                ) STRICT;",
        ))
        .await?;

        Ok(Database { pool })
    }

    /// Store a record unless its (author, timestamp) pair is already
    /// present. The existence check and the insert are one statement, so
    /// two callers racing on the same pair cannot both store.
    pub async fn insert_ad(&self, record: &AdRecord) -> Result<InsertOutcome, Error> {
        let result = sqlx::query(
            "INSERT INTO ads(server_name, category, content, invite, timestamp, author_id)
            VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(author_id, timestamp) DO NOTHING;",
        )
        .bind(&record.server_name)
        .bind(&record.category)
        .bind(&record.content)
        .bind(&record.invite)
        .bind(record.timestamp)
        .bind(record.author_id as i64)
        .execute(&self.pool)
        .await?;

        match result.rows_affected() {
            0 => Ok(InsertOutcome::Duplicate),
            _ => Ok(InsertOutcome::Inserted),
        }
    }

    /// Every stored record, most recent first. Records sharing a timestamp
    /// come back most-recently-inserted first.
    pub async fn list_ads(&self) -> Result<Vec<AdRecord>, Error> {
        sqlx::query(
            "SELECT id, server_name, category, content, invite, timestamp, author_id
            FROM ads ORDER BY timestamp DESC, id DESC;",
        )
        .map(ad_from_sqlite_row)
        .fetch_all(&self.pool)
        .await
    }
}

fn ad_from_sqlite_row(row: SqliteRow) -> AdRecord {
    AdRecord {
        id: Some(row.get(0)),
        server_name: row.get(1),
        category: row.get(2),
        content: row.get(3),
        invite: row.get(4),
        timestamp: row.get(5),
        author_id: row.get::<i64, _>(6) as u64,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    async fn temp_database() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ads.sqlite");
        let database = Database::new(path.to_str().unwrap()).await.unwrap();
        (dir, database)
    }

    fn record(author_id: u64, timestamp: DateTime<Utc>, content: &str) -> AdRecord {
        AdRecord {
            id: None,
            server_name: "Ad Fair".to_owned(),
            category: "Partners".to_owned(),
            content: content.to_owned(),
            invite: "https://t.me/+AbCdEf123".to_owned(),
            timestamp,
            author_id,
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn accepts_then_duplicates() {
        let (_dir, database) = temp_database().await;
        let ad = record(42, noon(), "selling socks");

        assert_eq!(
            database.insert_ad(&ad).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            database.insert_ad(&ad).await.unwrap(),
            InsertOutcome::Duplicate
        );
        assert_eq!(database.list_ads().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_author_different_instants_both_store() {
        let (_dir, database) = temp_database().await;
        let later = noon() + chrono::Duration::seconds(30);

        database.insert_ad(&record(42, noon(), "one")).await.unwrap();
        database.insert_ad(&record(42, later, "two")).await.unwrap();

        assert_eq!(database.list_ads().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stored_records_come_back_verbatim() {
        let (_dir, database) = temp_database().await;
        let ad = record(42, noon(), "selling socks, dm me");
        database.insert_ad(&ad).await.unwrap();

        let listed = database.list_ads().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].id.is_some());
        assert_eq!(listed[0].server_name, ad.server_name);
        assert_eq!(listed[0].category, ad.category);
        assert_eq!(listed[0].content, ad.content);
        assert_eq!(listed[0].invite, ad.invite);
        assert_eq!(listed[0].timestamp, ad.timestamp);
        assert_eq!(listed[0].author_id, ad.author_id);
    }

    #[tokio::test]
    async fn lists_most_recent_first() {
        let (_dir, database) = temp_database().await;
        let t1 = noon();
        let t2 = noon() + chrono::Duration::minutes(5);
        let t3 = noon() + chrono::Duration::minutes(10);

        // Inserted out of order on purpose.
        database.insert_ad(&record(1, t2, "second")).await.unwrap();
        database.insert_ad(&record(2, t3, "third")).await.unwrap();
        database.insert_ad(&record(3, t1, "first")).await.unwrap();

        let contents: Vec<String> = database
            .list_ads()
            .await
            .unwrap()
            .into_iter()
            .map(|ad| ad.content)
            .collect();
        assert_eq!(contents, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn equal_timestamps_order_by_insertion() {
        let (_dir, database) = temp_database().await;

        database.insert_ad(&record(1, noon(), "older")).await.unwrap();
        database.insert_ad(&record(2, noon(), "newer")).await.unwrap();

        let contents: Vec<String> = database
            .list_ads()
            .await
            .unwrap()
            .into_iter()
            .map(|ad| ad.content)
            .collect();
        assert_eq!(contents, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn concurrent_same_key_submissions_store_once() {
        let (_dir, database) = temp_database().await;
        let database = Arc::new(database);

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let database = database.clone();
            tasks.spawn(async move {
                database
                    .insert_ad(&record(7, noon(), &format!("attempt {i}")))
                    .await
                    .unwrap()
            });
        }

        let mut inserted = 0;
        let mut duplicates = 0;
        while let Some(outcome) = tasks.join_next().await {
            match outcome.unwrap() {
                InsertOutcome::Inserted => inserted += 1,
                InsertOutcome::Duplicate => duplicates += 1,
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(database.list_ads().await.unwrap().len(), 1);
    }
}
