//! Leaderboard rankings and per-user stats.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use veristream_shared::{LeaderboardEntry, UserStats};

#[derive(Default)]
struct LeaderboardInner {
    rankings: Vec<LeaderboardEntry>,
    loaded: bool,
    user_stats: HashMap<String, UserStats>,
    stale_users: HashSet<String>,
}

#[derive(Default)]
pub struct LeaderboardStore {
    inner: RwLock<LeaderboardInner>,
}

impl LeaderboardStore {
    pub fn rankings(&self) -> Vec<LeaderboardEntry> {
        self.inner
            .read()
            .map(|inner| inner.rankings.clone())
            .unwrap_or_default()
    }

    pub fn loaded(&self) -> bool {
        self.inner.read().map(|inner| inner.loaded).unwrap_or(false)
    }

    pub fn user_stats(&self, user_id: &str) -> Option<UserStats> {
        self.inner.read().ok()?.user_stats.get(user_id).cloned()
    }

    pub fn user_stats_stale(&self, user_id: &str) -> bool {
        self.inner
            .read()
            .map(|inner| inner.stale_users.contains(user_id))
            .unwrap_or(false)
    }

    /// LEADERBOARD_UPDATED: wholesale replacement, no merging. Seeding from
    /// the query layer goes through the same path.
    pub fn replace_rankings(&self, rankings: Vec<LeaderboardEntry>) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        inner.rankings = rankings;
        inner.loaded = true;
    }

    /// USER_STATS_UPDATED: last writer wins.
    pub(crate) fn apply_user_stats(&self, stats: UserStats) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        inner.stale_users.remove(&stats.user_id);
        inner.user_stats.insert(stats.user_id.clone(), stats);
    }

    pub fn seed_user_stats(&self, stats: UserStats) {
        self.apply_user_stats(stats);
    }

    pub(crate) fn invalidate_user(&self, user_id: &str) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        inner.stale_users.insert(user_id.to_string());
    }
}
