use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    #[default]
    Female,
}

/// Weekly exercise tier used for the activity factor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTier {
    /// 0-2 sessions a week
    #[default]
    Low,
    /// 3-5 sessions a week
    Moderate,
    Daily,
}

impl ActivityTier {
    pub fn factor(self) -> f64 {
        match self {
            Self::Low => 1.2,
            Self::Moderate => 1.55,
            Self::Daily => 1.75,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    #[default]
    Maintain,
    Lose,
    Gain,
}

impl Goal {
    /// kcal added to (or taken from) the maintenance estimate.
    pub fn adjustment(self) -> f64 {
        match self {
            Self::Maintain => 0.0,
            Self::Lose => -300.0,
            Self::Gain => 300.0,
        }
    }
}

/// Canonical profile. Zero height or weight means "not filled in".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Profile {
    pub age: u32,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: ActivityTier,
    pub goal: Goal,
}
