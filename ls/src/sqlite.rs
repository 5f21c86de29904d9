//! SQLite-backed ledger store
//!
//! One connection behind an async mutex. Queries here are single-row inserts
//! and small indexed scans, so serializing them on one connection is cheap
//! and keeps rusqlite's threading model out of the picture.

use rusqlite::{Connection, ErrorCode, Row, params};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::now_ms;
use crate::records::{Contribution, Member, NewContribution};
use crate::store::LedgerStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS members (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    phone       TEXT NOT NULL UNIQUE,
    created_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS admins (
    phone       TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS contributions (
    id          TEXT PRIMARY KEY,
    member_id   TEXT NOT NULL REFERENCES members(id),
    amount      REAL NOT NULL,
    period      TEXT NOT NULL,
    category    TEXT NOT NULL,
    created_at  INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_contributions_member_period
    ON contributions (member_id, period);
";

/// rusqlite-backed [`LedgerStore`]
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open (or create) the ledger database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        let ledger = Self::from_connection(conn)?;
        info!(path = %path.as_ref().display(), "ledger database opened");
        Ok(ledger)
    }

    /// Open a throwaway in-memory ledger
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn member_from_row(row: &Row<'_>) -> Result<Member, StoreError> {
    Ok(Member {
        id: row
            .get::<_, Option<String>>(0)?
            .ok_or(StoreError::MalformedRecord { table: "members", field: "id" })?,
        name: row
            .get::<_, Option<String>>(1)?
            .ok_or(StoreError::MalformedRecord { table: "members", field: "name" })?,
        phone: row
            .get::<_, Option<String>>(2)?
            .ok_or(StoreError::MalformedRecord { table: "members", field: "phone" })?,
        created_at: row
            .get::<_, Option<i64>>(3)?
            .ok_or(StoreError::MalformedRecord { table: "members", field: "created_at" })?,
    })
}

fn contribution_from_row(row: &Row<'_>) -> Result<Contribution, StoreError> {
    Ok(Contribution {
        id: row
            .get::<_, Option<String>>(0)?
            .ok_or(StoreError::MalformedRecord { table: "contributions", field: "id" })?,
        member_id: row
            .get::<_, Option<String>>(1)?
            .ok_or(StoreError::MalformedRecord { table: "contributions", field: "member_id" })?,
        amount: row
            .get::<_, Option<f64>>(2)?
            .ok_or(StoreError::MalformedRecord { table: "contributions", field: "amount" })?,
        period: row
            .get::<_, Option<String>>(3)?
            .ok_or(StoreError::MalformedRecord { table: "contributions", field: "period" })?,
        category: row
            .get::<_, Option<String>>(4)?
            .ok_or(StoreError::MalformedRecord { table: "contributions", field: "category" })?,
        created_at: row
            .get::<_, Option<i64>>(5)?
            .ok_or(StoreError::MalformedRecord { table: "contributions", field: "created_at" })?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn find_member_by_phone(&self, phone: &str) -> Result<Option<Member>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, name, phone, created_at FROM members WHERE phone = ?1")?;
        let mut rows = stmt.query(params![phone])?;
        match rows.next()? {
            Some(row) => Ok(Some(member_from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn insert_member(&self, name: &str, phone: &str) -> Result<Member, StoreError> {
        let member = Member {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            created_at: now_ms(),
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO members (id, name, phone, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![member.id, member.name, member.phone, member.created_at],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::DuplicateMember { phone: phone.to_string() }
            } else {
                StoreError::Sqlite(e)
            }
        })?;

        debug!(member_id = %member.id, %phone, "member inserted");
        Ok(member)
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, name, phone, created_at FROM members ORDER BY created_at")?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(member_from_row(row)?);
        }
        Ok(members)
    }

    async fn is_admin(&self, phone: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM admins WHERE phone = ?1", params![phone], |row| {
                row.get(0)
            })?;
        Ok(count > 0)
    }

    async fn insert_admin(&self, phone: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute("INSERT OR IGNORE INTO admins (phone) VALUES (?1)", params![phone])?;
        Ok(())
    }

    async fn insert_contribution(&self, new: NewContribution) -> Result<Contribution, StoreError> {
        let contribution = Contribution {
            id: Uuid::now_v7().to_string(),
            member_id: new.member_id,
            amount: new.amount,
            period: new.period,
            category: new.category,
            created_at: now_ms(),
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO contributions (id, member_id, amount, period, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                contribution.id,
                contribution.member_id,
                contribution.amount,
                contribution.period,
                contribution.category,
                contribution.created_at
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::UnknownMember(contribution.member_id.clone())
            } else {
                StoreError::Sqlite(e)
            }
        })?;

        debug!(
            member_id = %contribution.member_id,
            amount = contribution.amount,
            period = %contribution.period,
            category = %contribution.category,
            "contribution inserted"
        );
        Ok(contribution)
    }

    async fn contributions_for_member(&self, member_id: &str) -> Result<Vec<Contribution>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, member_id, amount, period, category, created_at
             FROM contributions WHERE member_id = ?1 ORDER BY created_at",
        )?;
        let mut rows = stmt.query(params![member_id])?;
        let mut contributions = Vec::new();
        while let Some(row) = rows.next()? {
            contributions.push(contribution_from_row(row)?);
        }
        Ok(contributions)
    }

    async fn contributions_for_period(
        &self,
        member_id: &str,
        period: &str,
    ) -> Result<Vec<Contribution>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, member_id, amount, period, category, created_at
             FROM contributions WHERE member_id = ?1 AND period = ?2 ORDER BY created_at",
        )?;
        let mut rows = stmt.query(params![member_id, period])?;
        let mut contributions = Vec::new();
        while let Some(row) = rows.next()? {
            contributions.push(contribution_from_row(row)?);
        }
        Ok(contributions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_member_round_trip() {
        let ledger = SqliteLedger::open_in_memory().unwrap();

        let inserted = ledger.insert_member("Wanjiku Kamau", "+254700000001").await.unwrap();
        assert_eq!(inserted.name, "Wanjiku Kamau");

        let found = ledger.find_member_by_phone("+254700000001").await.unwrap();
        assert_eq!(found, Some(inserted));

        let missing = ledger.find_member_by_phone("+254711111111").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let ledger = SqliteLedger::open_in_memory().unwrap();

        ledger.insert_member("Wanjiku Kamau", "+254700000001").await.unwrap();
        let err = ledger
            .insert_member("Someone Else", "+254700000001")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateMember { phone } if phone == "+254700000001"));

        // The loser's insert left no second row behind
        let members = ledger.list_members().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Wanjiku Kamau");
    }

    #[tokio::test]
    async fn test_contribution_round_trip_and_period_filter() {
        let ledger = SqliteLedger::open_in_memory().unwrap();
        let member = ledger.insert_member("Otieno Odhiambo", "+254700000002").await.unwrap();

        ledger
            .insert_contribution(NewContribution {
                member_id: member.id.clone(),
                amount: 500.0,
                period: "March 2025".to_string(),
                category: "welfare".to_string(),
            })
            .await
            .unwrap();
        ledger
            .insert_contribution(NewContribution {
                member_id: member.id.clone(),
                amount: 300.0,
                period: "April 2025".to_string(),
                category: "savings".to_string(),
            })
            .await
            .unwrap();

        let all = ledger.contributions_for_member(&member.id).await.unwrap();
        assert_eq!(all.len(), 2);

        let march = ledger
            .contributions_for_period(&member.id, "March 2025")
            .await
            .unwrap();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].amount, 500.0);
        assert_eq!(march[0].category, "welfare");
    }

    #[tokio::test]
    async fn test_contribution_requires_existing_member() {
        let ledger = SqliteLedger::open_in_memory().unwrap();

        let err = ledger
            .insert_contribution(NewContribution {
                member_id: "no-such-member".to_string(),
                amount: 500.0,
                period: "March 2025".to_string(),
                category: "welfare".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::UnknownMember(id) if id == "no-such-member"));
    }

    #[tokio::test]
    async fn test_admin_flagging() {
        let ledger = SqliteLedger::open_in_memory().unwrap();

        assert!(!ledger.is_admin("+254700000003").await.unwrap());
        ledger.insert_admin("+254700000003").await.unwrap();
        assert!(ledger.is_admin("+254700000003").await.unwrap());

        // Idempotent
        ledger.insert_admin("+254700000003").await.unwrap();
        assert!(ledger.is_admin("+254700000003").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_record_fails_on_read() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("ledger.db");

        // A legacy database whose members table never declared NOT NULL
        {
            let raw = Connection::open(&db_path).unwrap();
            raw.execute_batch(
                "CREATE TABLE members (id TEXT PRIMARY KEY, name TEXT, phone TEXT, created_at INTEGER);
                 INSERT INTO members (id, name, phone, created_at)
                 VALUES ('m-1', NULL, '+254700000004', 1700000000000);",
            )
            .unwrap();
        }

        let ledger = SqliteLedger::open(&db_path).unwrap();
        let err = ledger.find_member_by_phone("+254700000004").await.unwrap_err();

        assert!(matches!(
            err,
            StoreError::MalformedRecord { table: "members", field: "name" }
        ));
    }

    #[tokio::test]
    async fn test_open_on_disk_persists() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("ledger.db");

        {
            let ledger = SqliteLedger::open(&db_path).unwrap();
            ledger.insert_member("Achieng Were", "+254700000005").await.unwrap();
        }

        let reopened = SqliteLedger::open(&db_path).unwrap();
        let found = reopened.find_member_by_phone("+254700000005").await.unwrap();
        assert_eq!(found.map(|m| m.name), Some("Achieng Were".to_string()));
    }
}
