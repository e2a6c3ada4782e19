use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};
use crate::models::{ChirpRow, RefreshTokenRow, UserRow};

/// The whole persisted document at one instant.
///
/// Integer keys are written as their decimal string form, which is what
/// serde_json does for integer map keys in both directions.
///
/// `last_chirp_id` / `last_user_id` record the highest id ever handed out so
/// deleted ids are never reissued. Documents written without them decode
/// with 0 and fall back to the highest live id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub chirps: BTreeMap<u64, ChirpRow>,
    pub users: BTreeMap<u64, UserRow>,
    pub refresh_tokens: BTreeMap<String, RefreshTokenRow>,
    #[serde(default)]
    pub last_chirp_id: u64,
    #[serde(default)]
    pub last_user_id: u64,
}

impl Snapshot {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a document, rejecting any record filed under a key other than its own id.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;

        if let Some((key, chirp)) = snapshot.chirps.iter().find(|(k, c)| **k != c.id) {
            return Err(DbError::StoreUnavailable(format!(
                "chirp filed under key {} has id {}",
                key, chirp.id
            )));
        }
        if let Some((key, user)) = snapshot.users.iter().find(|(k, u)| **k != u.id) {
            return Err(DbError::StoreUnavailable(format!(
                "user filed under key {} has id {}",
                key, user.id
            )));
        }

        Ok(snapshot)
    }

    pub fn allocate_chirp_id(&mut self) -> u64 {
        allocate(&mut self.last_chirp_id, &self.chirps)
    }

    pub fn allocate_user_id(&mut self) -> u64 {
        allocate(&mut self.last_user_id, &self.users)
    }
}

/// One past both the recorded high-water mark and the highest live id.
fn allocate<V>(last: &mut u64, map: &BTreeMap<u64, V>) -> u64 {
    let highest_live = map.keys().next_back().copied().unwrap_or(0);
    let id = (*last).max(highest_live) + 1;
    *last = id;
    id
}
