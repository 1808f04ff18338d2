use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Row;

use portal_types::models::{Message, Pdf, Photo, Update};

use crate::{Database, parse_store_timestamp};

impl Database {
    // -- Messages --

    pub fn list_messages(&self) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, text, timestamp, created_at FROM messages ORDER BY id DESC",
            )?;
            let rows = stmt
                .query_map([], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Most recent by creation order, for the widget views.
    pub fn recent_messages(&self, limit: u32) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, text, timestamp, created_at FROM messages
                 ORDER BY created_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_message(
        &self,
        name: &str,
        text: &str,
        timestamp: &str,
        created_at: &str,
    ) -> Result<Message> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (name, text, timestamp, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, text, timestamp, created_at],
            )?;
            Ok(Message {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                text: text.to_string(),
                timestamp: timestamp.to_string(),
                created_at: created_at.to_string(),
            })
        })
    }

    pub fn delete_message(&self, id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id])?))
    }

    // -- Updates --

    /// Capped at the `limit` highest ids; the retention policy keeps the
    /// table bounded, the LIMIT here just makes the read independent of it.
    pub fn list_updates(&self, limit: u32) -> Result<Vec<Update>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, status, text, timestamp, created_at FROM updates
                 ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], update_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn recent_updates(&self, limit: u32) -> Result<Vec<Update>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, status, text, timestamp, created_at FROM updates
                 ORDER BY created_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], update_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_update(
        &self,
        name: &str,
        status: &str,
        text: &str,
        timestamp: &str,
        created_at: &str,
    ) -> Result<Update> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO updates (name, status, text, timestamp, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![name, status, text, timestamp, created_at],
            )?;
            Ok(Update {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                status: status.to_string(),
                text: text.to_string(),
                timestamp: timestamp.to_string(),
                created_at: created_at.to_string(),
            })
        })
    }

    pub fn delete_update(&self, id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| Ok(conn.execute("DELETE FROM updates WHERE id = ?1", [id])?))
    }

    /// Age-based purge: deletes every update whose `timestamp` parses and
    /// predates `cutoff`. Rows with unparseable timestamps are kept — the
    /// purge must never be the cause of unexpected data loss.
    pub fn prune_expired_updates(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let mut stmt = conn.prepare("SELECT id, timestamp FROM updates")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            drop(stmt);

            let stale: Vec<i64> = rows
                .into_iter()
                .filter(|(_, ts)| parse_store_timestamp(ts).is_some_and(|t| t < cutoff))
                .map(|(id, _)| id)
                .collect();

            let mut removed = 0;
            for id in &stale {
                removed += conn.execute("DELETE FROM updates WHERE id = ?1", [id])?;
            }
            Ok(removed)
        })
    }

    /// Count-based cap: keep only the `max` highest ids. Runs after every
    /// insert; reads never re-trigger it.
    pub fn cap_updates(&self, max: u32) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM updates WHERE id NOT IN
                 (SELECT id FROM updates ORDER BY id DESC LIMIT ?1)",
                [max],
            )?;
            Ok(removed)
        })
    }

    // -- Photos --

    pub fn list_photos(&self) -> Result<Vec<Photo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, data, caption, timestamp, created_at FROM photos ORDER BY id DESC",
            )?;
            let rows = stmt
                .query_map([], photo_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_photo(
        &self,
        data: &str,
        caption: &str,
        timestamp: &str,
        created_at: &str,
    ) -> Result<Photo> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO photos (data, caption, timestamp, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![data, caption, timestamp, created_at],
            )?;
            Ok(Photo {
                id: conn.last_insert_rowid(),
                data: data.to_string(),
                caption: caption.to_string(),
                timestamp: timestamp.to_string(),
                created_at: created_at.to_string(),
            })
        })
    }

    pub fn delete_photo(&self, id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| Ok(conn.execute("DELETE FROM photos WHERE id = ?1", [id])?))
    }

    // -- Pdfs --

    pub fn list_pdfs(&self) -> Result<Vec<Pdf>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, data, timestamp, created_at FROM pdfs ORDER BY id DESC",
            )?;
            let rows = stmt
                .query_map([], pdf_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_pdf(
        &self,
        name: &str,
        data: &str,
        timestamp: &str,
        created_at: &str,
    ) -> Result<Pdf> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO pdfs (name, data, timestamp, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, data, timestamp, created_at],
            )?;
            Ok(Pdf {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                data: data.to_string(),
                timestamp: timestamp.to_string(),
                created_at: created_at.to_string(),
            })
        })
    }

    pub fn delete_pdf(&self, id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| Ok(conn.execute("DELETE FROM pdfs WHERE id = ?1", [id])?))
    }
}

fn message_from_row(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        name: row.get(1)?,
        text: row.get(2)?,
        timestamp: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn update_from_row(row: &Row) -> rusqlite::Result<Update> {
    Ok(Update {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        text: row.get(3)?,
        timestamp: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn photo_from_row(row: &Row) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: row.get(0)?,
        data: row.get(1)?,
        caption: row.get(2)?,
        timestamp: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn pdf_from_row(row: &Row) -> rusqlite::Result<Pdf> {
    Ok(Pdf {
        id: row.get(0)?,
        name: row.get(1)?,
        data: row.get(2)?,
        timestamp: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn iso(t: DateTime<Utc>) -> String {
        t.to_rfc3339()
    }

    #[test]
    fn message_roundtrip_and_delete_counts() {
        let db = db();
        let now = iso(Utc::now());
        let created = db.insert_message("A", "hi", &now, &now).unwrap();
        assert_eq!(created.id, 1);

        let all = db.list_messages().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "A");
        assert_eq!(all[0].text, "hi");

        assert_eq!(db.delete_message(created.id).unwrap(), 1);
        assert_eq!(db.delete_message(created.id).unwrap(), 0);
        assert!(db.list_messages().unwrap().is_empty());
    }

    #[test]
    fn list_messages_newest_first() {
        let db = db();
        let now = iso(Utc::now());
        for i in 0..3 {
            db.insert_message(&format!("u{i}"), "x", &now, &now).unwrap();
        }
        let ids: Vec<i64> = db.list_messages().unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn cap_keeps_ten_highest_ids() {
        let db = db();
        let now = iso(Utc::now());
        for i in 0..11 {
            db.insert_update(&format!("u{i}"), "notice", "x", &now, &now)
                .unwrap();
            db.cap_updates(10).unwrap();
        }
        let rows = db.list_updates(50).unwrap();
        assert_eq!(rows.len(), 10);
        let ids: Vec<i64> = rows.iter().map(|u| u.id).collect();
        assert_eq!(ids, (2..=11).rev().collect::<Vec<i64>>());
    }

    #[test]
    fn cap_is_idempotent() {
        let db = db();
        let now = iso(Utc::now());
        for _ in 0..12 {
            db.insert_update("u", "notice", "x", &now, &now).unwrap();
        }
        assert_eq!(db.cap_updates(10).unwrap(), 2);
        assert_eq!(db.cap_updates(10).unwrap(), 0);
    }

    #[test]
    fn prune_removes_only_expired_rows() {
        let db = db();
        let now = Utc::now();
        let stale = iso(now - Duration::hours(72));
        let fresh = iso(now - Duration::hours(1));
        db.insert_update("old", "notice", "x", &stale, &iso(now)).unwrap();
        db.insert_update("new", "notice", "x", &fresh, &iso(now)).unwrap();

        let removed = db.prune_expired_updates(now - Duration::hours(48)).unwrap();
        assert_eq!(removed, 1);

        let rows = db.list_updates(10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "new");
    }

    #[test]
    fn prune_keeps_unparseable_timestamps() {
        // Fail-safe: a malformed timestamp is never grounds for deletion.
        let db = db();
        let now = Utc::now();
        db.insert_update("odd", "notice", "x", "not-a-date", &iso(now))
            .unwrap();
        let removed = db.prune_expired_updates(now - Duration::hours(48)).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(db.list_updates(10).unwrap().len(), 1);
    }

    #[test]
    fn prune_is_idempotent() {
        let db = db();
        let now = Utc::now();
        let stale = iso(now - Duration::hours(100));
        db.insert_update("old", "notice", "x", &stale, &iso(now)).unwrap();
        let cutoff = now - Duration::hours(48);
        assert_eq!(db.prune_expired_updates(cutoff).unwrap(), 1);
        assert_eq!(db.prune_expired_updates(cutoff).unwrap(), 0);
    }

    #[test]
    fn photo_caption_defaults_to_empty() {
        let db = db();
        let now = iso(Utc::now());
        let photo = db.insert_photo("deadbeef", "", &now, &now).unwrap();
        assert_eq!(photo.caption, "");
        assert_eq!(db.list_photos().unwrap()[0].caption, "");
    }

    #[test]
    fn pdf_roundtrip() {
        let db = db();
        let now = iso(Utc::now());
        let pdf = db.insert_pdf("report.pdf", "JVBERi0x", &now, &now).unwrap();
        assert_eq!(pdf.id, 1);
        assert_eq!(db.delete_pdf(1).unwrap(), 1);
        assert!(db.list_pdfs().unwrap().is_empty());
    }
}
