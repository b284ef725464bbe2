use gophermart_core::money::Unit;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of reward a [`MatchRule`] grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "reward_kind", rename_all = "lowercase")]
pub enum RewardKind {
    /// Whole-percent of the good's price.
    Percent,
    /// A fixed amount per matching good.
    Natural,
}

/// Wire representation of `reward_type`: `"%"` or `"pt"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum RewardType {
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "pt")]
    Natural,
}

impl From<RewardType> for RewardKind {
    fn from(value: RewardType) -> Self {
        match value {
            RewardType::Percent => RewardKind::Percent,
            RewardType::Natural => RewardKind::Natural,
        }
    }
}

/// A named reward rule, immutable after creation.
///
/// `reward` is stored as a plain integer column; its meaning depends on
/// `kind`. For `Percent` it is a whole-percent integer (`30` means 30% of
/// the good's price), never a scaled [`Unit`]. For `Natural` it is hundredths
/// of the currency unit, same encoding as every other money column, and is
/// read back out through [`MatchRule::natural_reward`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchRule {
    pub id: Uuid,
    pub name: String,
    pub kind: RewardKind,
    pub reward: i64,
}

impl MatchRule {
    /// Whole-percent integer for a [`RewardKind::Percent`] rule.
    ///
    /// Panics if called on a [`RewardKind::Natural`] rule; callers are
    /// expected to branch on `kind` first.
    pub fn percent(&self) -> i64 {
        assert_eq!(self.kind, RewardKind::Percent);
        self.reward
    }

    /// Flat reward amount for a [`RewardKind::Natural`] rule.
    pub fn natural_reward(&self) -> Unit {
        assert_eq!(self.kind, RewardKind::Natural);
        Unit::from_scaled_i64(self.reward)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    #[serde(rename = "match")]
    pub name: String,
    pub reward: f64,
    pub reward_type: RewardType,
}

impl CreateMatchRequest {
    /// Converts the wire `reward` into the raw integer column value for
    /// this request's `reward_type`: a whole-percent integer for `%`, or
    /// hundredths of the currency unit for `pt`.
    pub fn reward_column(&self) -> i64 {
        match self.reward_type {
            RewardType::Percent => self.reward.round() as i64,
            RewardType::Natural => Unit::from_f64(self.reward).as_scaled_i64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_reward_column_is_a_whole_percent_integer() {
        let req = CreateMatchRequest {
            name: "Tefal".into(),
            reward: 30.0,
            reward_type: RewardType::Percent,
        };
        assert_eq!(req.reward_column(), 30);
    }

    #[test]
    fn natural_reward_column_is_scaled_hundredths() {
        let req = CreateMatchRequest {
            name: "Bonus".into(),
            reward: 5.00,
            reward_type: RewardType::Natural,
        };
        assert_eq!(req.reward_column(), 500);
    }
}
