use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// Identifier of a sentiment classification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    Lexicon,
    Trained,
    Remote,
}

impl StrategyId {
    pub const ALL: [StrategyId; 3] = [StrategyId::Lexicon, StrategyId::Trained, StrategyId::Remote];

    pub fn code(self) -> i32 {
        match self {
            StrategyId::Lexicon => 0,
            StrategyId::Trained => 1,
            StrategyId::Remote => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyId::Lexicon => "Rule-based",
            StrategyId::Trained => "Compression nearest-neighbor",
            StrategyId::Remote => "SSense API",
        }
    }

    pub fn describe(self) -> StrategyDescription {
        let (description, requires) = match self {
            StrategyId::Lexicon => ("การวิเคราะห์ด้วยกฎเกณฑ์ที่กำหนดไว้", None),
            StrategyId::Trained => (
                "โมเดลเพื่อนบ้านใกล้สุดที่เทรนจากคลังข้อความที่ติดป้ายกำกับ",
                Some("training corpus"),
            ),
            StrategyId::Remote => ("AI for Thai SSense API", Some("internet connection")),
        };
        StrategyDescription {
            id: self.code(),
            strategy: self,
            name: self.name().to_string(),
            description: description.to_string(),
            requires: requires.map(str::to_string),
        }
    }
}

impl TryFrom<i32> for StrategyId {
    type Error = i32;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(StrategyId::Lexicon),
            1 => Ok(StrategyId::Trained),
            2 => Ok(StrategyId::Remote),
            other => Err(other),
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDescription {
    pub id: i32,
    pub strategy: StrategyId,
    pub name: String,
    pub description: String,
    pub requires: Option<String>,
}

/// Snapshot of the active strategy and its readiness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub active: StrategyDescription,
    pub lexicon_version: String,
    /// Trained strategy: model fit and not degraded.
    pub model_trained: Option<bool>,
    pub training_examples: Option<usize>,
    /// Remote strategy: last probe succeeded.
    pub api_available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_try_from() {
        for strategy in StrategyId::ALL {
            assert_eq!(StrategyId::try_from(strategy.code()), Ok(strategy));
        }
        assert_eq!(StrategyId::try_from(99), Err(99));
        assert_eq!(StrategyId::try_from(-1), Err(-1));
    }

    #[test]
    fn descriptions_are_ordered_by_code() {
        let codes: Vec<i32> = StrategyId::ALL.iter().map(|s| s.describe().id).collect();
        assert_eq!(codes, vec![0, 1, 2]);
    }
}
