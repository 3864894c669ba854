//! Achievement catalog and unlock models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub achievement_type: String,
    pub rarity: String,
    pub points_required: Option<i32>,
    pub events_required: Option<i32>,
    pub friends_required: Option<i32>,
    pub points_reward: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Achievement {
    /// Parsed rarity, defaulting to COMMON for unknown values
    pub fn rarity(&self) -> AchievementRarity {
        AchievementRarity::from_str(&self.rarity).unwrap_or(AchievementRarity::Common)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAchievement {
    pub id: i64,
    pub user_id: i64,
    pub achievement_id: i64,
    pub unlocked_at: DateTime<Utc>,
    pub progress_value: i32,
    pub is_featured: bool,
    pub notification_sent: bool,
}

/// Achievement category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementType {
    Social,
    Organizer,
    Participant,
    Streak,
    Special,
    Seasonal,
}

impl fmt::Display for AchievementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AchievementType::Social => "SOCIAL",
            AchievementType::Organizer => "ORGANIZER",
            AchievementType::Participant => "PARTICIPANT",
            AchievementType::Streak => "STREAK",
            AchievementType::Special => "SPECIAL",
            AchievementType::Seasonal => "SEASONAL",
        };
        write!(f, "{}", s)
    }
}

/// Ordinal achievement rarity, used to order simultaneous unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AchievementRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl AchievementRarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementRarity::Common => "COMMON",
            AchievementRarity::Uncommon => "UNCOMMON",
            AchievementRarity::Rare => "RARE",
            AchievementRarity::Epic => "EPIC",
            AchievementRarity::Legendary => "LEGENDARY",
        }
    }

    /// Numeric rank, ascending with rarity
    pub fn rank(&self) -> u8 {
        match self {
            AchievementRarity::Common => 0,
            AchievementRarity::Uncommon => 1,
            AchievementRarity::Rare => 2,
            AchievementRarity::Epic => 3,
            AchievementRarity::Legendary => 4,
        }
    }
}

impl fmt::Display for AchievementRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AchievementRarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMMON" => Ok(AchievementRarity::Common),
            "UNCOMMON" => Ok(AchievementRarity::Uncommon),
            "RARE" => Ok(AchievementRarity::Rare),
            "EPIC" => Ok(AchievementRarity::Epic),
            "LEGENDARY" => Ok(AchievementRarity::Legendary),
            other => Err(format!("unknown rarity: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_ordering() {
        assert!(AchievementRarity::Common < AchievementRarity::Legendary);
        assert!(AchievementRarity::Rare.rank() < AchievementRarity::Epic.rank());
    }

    #[test]
    fn test_unknown_rarity_defaults_to_common() {
        let achievement = Achievement {
            id: 1,
            code: "X".to_string(),
            name: "X".to_string(),
            description: None,
            icon_url: None,
            achievement_type: AchievementType::Special.to_string(),
            rarity: "MYTHIC".to_string(),
            points_required: None,
            events_required: None,
            friends_required: None,
            points_reward: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(achievement.rarity(), AchievementRarity::Common);
    }
}
