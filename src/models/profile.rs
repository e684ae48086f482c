use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_LEVEL: &str = "Beginner";
pub const POINTS_PER_LEVEL: i32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub total_points: i32,
    pub current_streak: i32,
    pub best_streak: i32,
    pub level: String,
}

impl Profile {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id,
            display_name: Some(username.clone()),
            username,
            total_points: 0,
            current_streak: 0,
            best_streak: 0,
            level: DEFAULT_LEVEL.to_string(),
        }
    }

    /// Applies a finished attempt: points are added and the streak grows by one.
    pub fn award(&mut self, points: i32) {
        self.total_points += points;
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
    }

    pub fn xp_to_next_level(&self) -> i32 {
        POINTS_PER_LEVEL - self.total_points.rem_euclid(POINTS_PER_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_adds_points_and_extends_streak() {
        let mut profile = Profile::new(Uuid::new_v4(), "ana");
        profile.best_streak = 3;
        profile.award(20);
        profile.award(30);

        assert_eq!(profile.total_points, 50);
        assert_eq!(profile.current_streak, 2);
        assert_eq!(profile.best_streak, 3);

        profile.award(0);
        profile.award(10);
        assert_eq!(profile.best_streak, 4);
    }

    #[test]
    fn xp_to_next_level_counts_down_within_a_level() {
        let mut profile = Profile::new(Uuid::new_v4(), "ana");
        assert_eq!(profile.xp_to_next_level(), 100);
        profile.total_points = 20;
        assert_eq!(profile.xp_to_next_level(), 80);
        profile.total_points = 200;
        assert_eq!(profile.xp_to_next_level(), 100);
    }
}
