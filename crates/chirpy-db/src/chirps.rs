use serde::Deserialize;

use crate::Database;
use crate::error::{DbError, Result};
use crate::models::ChirpRow;

/// Listing order, by chirp id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl Database {
    /// Store an already-validated chirp body. The author must exist.
    pub fn create_chirp(&self, body: &str, author_id: u64) -> Result<ChirpRow> {
        self.with_snapshot_mut(|snap| {
            if !snap.users.contains_key(&author_id) {
                return Err(DbError::NotFound);
            }

            let id = snap.allocate_chirp_id();
            let chirp = ChirpRow {
                id,
                body: body.to_string(),
                author_id,
            };
            snap.chirps.insert(id, chirp.clone());
            Ok(chirp)
        })
    }

    pub fn get_chirp(&self, id: u64) -> Result<ChirpRow> {
        self.with_snapshot(|snap| snap.chirps.get(&id).cloned())?
            .ok_or(DbError::NotFound)
    }

    pub fn list_chirps(&self, author_id: Option<u64>, order: SortOrder) -> Result<Vec<ChirpRow>> {
        self.with_snapshot(|snap| {
            // BTreeMap iterates in ascending id order already.
            let mut chirps: Vec<ChirpRow> = snap
                .chirps
                .values()
                .filter(|c| author_id.is_none_or(|a| c.author_id == a))
                .cloned()
                .collect();
            if order == SortOrder::Desc {
                chirps.reverse();
            }
            chirps
        })
    }

    /// Remove a chirp. Existence is checked before authorship.
    pub fn delete_chirp(&self, id: u64, requester_id: u64) -> Result<()> {
        self.with_snapshot_mut(|snap| {
            let chirp = snap.chirps.get(&id).ok_or(DbError::NotFound)?;
            if chirp.author_id != requester_id {
                return Err(DbError::NotAuthorized);
            }
            snap.chirps.remove(&id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_with_users(n: usize) -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("db.json")).unwrap();
        // Bypass hashing; only the ids matter here.
        db.with_snapshot_mut(|snap| {
            for id in 1..=n as u64 {
                snap.users.insert(
                    id,
                    crate::models::UserRow {
                        id,
                        email: format!("u{}@b.com", id),
                        password_hash: String::new(),
                        is_upgraded: false,
                    },
                );
            }
            Ok(())
        })
        .unwrap();
        (dir, db)
    }

    #[test]
    fn create_and_get() {
        let (_dir, db) = open_with_users(1);
        let chirp = db.create_chirp("hello", 1).unwrap();
        assert_eq!(chirp.id, 1);
        assert_eq!(db.get_chirp(1).unwrap(), chirp);
        assert!(matches!(db.get_chirp(2), Err(DbError::NotFound)));
    }

    #[test]
    fn unknown_author_rejected() {
        let (_dir, db) = open_with_users(1);
        assert!(matches!(db.create_chirp("hi", 5), Err(DbError::NotFound)));
    }

    #[test]
    fn list_filters_and_orders() {
        let (_dir, db) = open_with_users(2);
        db.create_chirp("one", 1).unwrap();
        db.create_chirp("two", 2).unwrap();
        db.create_chirp("three", 1).unwrap();

        let asc: Vec<u64> = db
            .list_chirps(None, SortOrder::Asc)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(asc, vec![1, 2, 3]);

        let desc: Vec<u64> = db
            .list_chirps(None, SortOrder::Desc)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(desc, vec![3, 2, 1]);

        let by_author: Vec<u64> = db
            .list_chirps(Some(1), SortOrder::Asc)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(by_author, vec![1, 3]);
    }

    #[test]
    fn delete_removes_the_key() {
        let (_dir, db) = open_with_users(1);
        let chirp = db.create_chirp("bye", 1).unwrap();

        db.delete_chirp(chirp.id, 1).unwrap();
        assert!(matches!(db.get_chirp(chirp.id), Err(DbError::NotFound)));
        assert!(db.list_chirps(None, SortOrder::Asc).unwrap().is_empty());
        assert!(db.with_snapshot(|s| s.chirps.is_empty()).unwrap());
    }

    #[test]
    fn delete_by_other_user_is_refused() {
        let (_dir, db) = open_with_users(2);
        let chirp = db.create_chirp("mine", 1).unwrap();

        assert!(matches!(db.delete_chirp(chirp.id, 2), Err(DbError::NotAuthorized)));
        assert_eq!(db.list_chirps(None, SortOrder::Asc).unwrap(), vec![chirp]);
    }

    #[test]
    fn delete_missing_is_not_found_before_authorization() {
        let (_dir, db) = open_with_users(1);
        assert!(matches!(db.delete_chirp(7, 1), Err(DbError::NotFound)));
    }

    #[test]
    fn ids_never_collide_after_delete() {
        let (_dir, db) = open_with_users(1);
        db.create_chirp("a", 1).unwrap();
        db.create_chirp("b", 1).unwrap();
        db.create_chirp("c", 1).unwrap();
        db.delete_chirp(2, 1).unwrap();

        let d = db.create_chirp("d", 1).unwrap();
        assert_eq!(d.id, 4);
        assert_eq!(db.get_chirp(3).unwrap().body, "c");
    }

    #[test]
    fn deleting_newest_does_not_free_its_id() {
        let (dir, db) = open_with_users(1);
        db.create_chirp("a", 1).unwrap();
        let b = db.create_chirp("b", 1).unwrap();
        db.delete_chirp(b.id, 1).unwrap();

        let c = db.create_chirp("c", 1).unwrap();
        assert_ne!(c.id, b.id);
        assert_eq!(c.id, 3);
        assert!(matches!(db.get_chirp(b.id), Err(DbError::NotFound)));

        // The high-water mark is on disk, not just in memory.
        drop(db);
        let db = Database::open(&dir.path().join("db.json")).unwrap();
        db.delete_chirp(c.id, 1).unwrap();
        assert_eq!(db.create_chirp("d", 1).unwrap().id, 4);
    }

    #[test]
    fn sort_order_parses_lowercase() {
        let order: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(order, SortOrder::Desc);
        assert_eq!(SortOrder::default(), SortOrder::Asc);
    }
}
