use crate::Database;
use crate::error::{DbError, Result};
use crate::models::UserRow;
use crate::password::{hash_password, verify_against_dummy, verify_password};
use crate::snapshot::Snapshot;

impl Database {
    /// Register a new user. Emails must be unique.
    ///
    /// The password is hashed before the exclusive lock is taken; the
    /// duplicate check and the insert share one lock acquisition.
    pub fn create_user(&self, email: &str, password: &str) -> Result<UserRow> {
        let password_hash = hash_password(password)?;

        self.with_snapshot_mut(|snap| {
            if find_by_email(snap, email).is_some() {
                return Err(DbError::DuplicateEmail);
            }

            let id = snap.allocate_user_id();
            let user = UserRow {
                id,
                email: email.to_string(),
                password_hash,
                is_upgraded: false,
            };
            snap.users.insert(id, user.clone());
            Ok(user)
        })
    }

    pub fn get_user(&self, id: u64) -> Result<UserRow> {
        self.with_snapshot(|snap| snap.users.get(&id).cloned())?
            .ok_or(DbError::NotFound)
    }

    /// Unknown email and wrong password both come back as `InvalidCredentials`.
    pub fn authenticate_user(&self, email: &str, password: &str) -> Result<UserRow> {
        let Some(user) = self.with_snapshot(|snap| find_by_email(snap, email).cloned())? else {
            return Err(verify_against_dummy(password));
        };

        verify_password(password, &user.password_hash)?;
        Ok(user)
    }

    /// Replace a user's email and password. Upgrade status is kept.
    pub fn update_user(&self, id: u64, email: &str, password: &str) -> Result<UserRow> {
        let password_hash = hash_password(password)?;

        self.with_snapshot_mut(|snap| {
            if find_by_email(snap, email).is_some_and(|other| other.id != id) {
                return Err(DbError::DuplicateEmail);
            }

            let user = snap.users.get_mut(&id).ok_or(DbError::NotFound)?;
            user.email = email.to_string();
            user.password_hash = password_hash;
            Ok(user.clone())
        })
    }

    /// Mark a user as upgraded. Idempotent; never reverted.
    pub fn upgrade_user(&self, id: u64) -> Result<()> {
        self.with_snapshot_mut(|snap| {
            let user = snap.users.get_mut(&id).ok_or(DbError::NotFound)?;
            user.is_upgraded = true;
            Ok(())
        })
    }
}

// Linear scan; fine for the sizes this store is meant for.
fn find_by_email<'a>(snap: &'a Snapshot, email: &str) -> Option<&'a UserRow> {
    snap.users.values().find(|u| u.email == email)
}
