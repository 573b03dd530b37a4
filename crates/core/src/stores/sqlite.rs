use crate::error::StoreError;
use crate::models::{Bill, BillType};
use crate::traits::BillStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

/// SQLite-backed bill store: one partition table per category, each with an
/// FTS5 companion over the short title and summary text.
pub struct SqliteBillStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBillStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn partition_table(bill_type: BillType) -> String {
    format!("bills_{}", bill_type.as_str())
}

fn provision_partition(conn: &Connection, bill_type: BillType) -> Result<(), StoreError> {
    let table = partition_table(bill_type);
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
          bill_id TEXT PRIMARY KEY,
          congress INTEGER NOT NULL,
          bill_type TEXT NOT NULL,
          number TEXT NOT NULL,
          introduced_at TEXT,
          summary_date TEXT,
          summary_text TEXT,
          actions TEXT NOT NULL,
          sponsors TEXT NOT NULL,
          cosponsors TEXT NOT NULL,
          status_at TEXT,
          short_title TEXT,
          official_title TEXT,
          UNIQUE(congress, bill_type, number)
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_congress ON {table}(congress);

        CREATE VIRTUAL TABLE IF NOT EXISTS {table}_fts USING fts5(
          short_title,
          summary_text,
          bill_id UNINDEXED,
          content='{table}',
          content_rowid='rowid'
        );

        CREATE TRIGGER IF NOT EXISTS {table}_ai AFTER INSERT ON {table} BEGIN
          INSERT INTO {table}_fts(rowid, short_title, summary_text, bill_id)
          VALUES (NEW.rowid, NEW.short_title, NEW.summary_text, NEW.bill_id);
        END;

        CREATE TRIGGER IF NOT EXISTS {table}_ad AFTER DELETE ON {table} BEGIN
          INSERT INTO {table}_fts({table}_fts, rowid, short_title, summary_text, bill_id)
          VALUES ('delete', OLD.rowid, OLD.short_title, OLD.summary_text, OLD.bill_id);
        END;
        "
    ))?;

    Ok(())
}

#[async_trait]
impl BillStore for SqliteBillStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        for bill_type in BillType::ALL {
            provision_partition(&conn, bill_type)?;
        }
        Ok(())
    }

    async fn insert_batch(&self, bills: &[Bill]) -> Result<usize, StoreError> {
        if bills.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut written = 0usize;

        for bill in bills {
            let table = partition_table(bill.bill_type);
            let mut statement = tx.prepare_cached(&format!(
                "
                INSERT INTO {table} (
                  bill_id, congress, bill_type, number, introduced_at,
                  summary_date, summary_text, actions, sponsors, cosponsors,
                  status_at, short_title, official_title
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "
            ))?;

            statement.execute(params![
                bill.bill_id,
                bill.congress as i64,
                bill.bill_type.as_str(),
                bill.number,
                bill.introduced_at.map(|date| date.format("%Y-%m-%d").to_string()),
                bill.summary.as_ref().map(|summary| summary.date.as_str()),
                bill.summary.as_ref().map(|summary| summary.text.as_str()),
                serde_json::to_string(&bill.actions)?,
                serde_json::to_string(&bill.sponsors)?,
                serde_json::to_string(&bill.cosponsors)?,
                bill.status_at,
                bill.short_title,
                bill.official_title,
            ])?;
            written += 1;
        }

        tx.commit()?;
        Ok(written)
    }
}
