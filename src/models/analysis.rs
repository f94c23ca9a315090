use serde::{Deserialize, Deserializer, Serialize};

/// Structured relationship report returned by the LLM
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    /// 0 = very unhealthy, 100 = very healthy
    #[serde(deserialize_with = "null_as_default")]
    pub health_score: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub red_flags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub action_plan: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub communication_style: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dominant_emotions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub positive_aspects: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub message_balance: MessageBalance,
}

/// Share of messages sent by each of the two participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageBalance {
    #[serde(deserialize_with = "null_as_default")]
    pub person_a: String,
    #[serde(deserialize_with = "null_as_default")]
    pub person_b: String,
    #[serde(deserialize_with = "null_as_even_share")]
    pub person_a_percentage: i32,
    #[serde(deserialize_with = "null_as_even_share")]
    pub person_b_percentage: i32,
}

impl Default for MessageBalance {
    fn default() -> Self {
        Self {
            person_a: String::new(),
            person_b: String::new(),
            person_a_percentage: 50,
            person_b_percentage: 50,
        }
    }
}

/// Coarse bucket for a health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl ScoreBand {
    pub fn from_score(score: i32) -> Self {
        match score {
            ..=30 => ScoreBand::Low,
            31..=60 => ScoreBand::Medium,
            _ => ScoreBand::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Low => "needs attention",
            ScoreBand::Medium => "mixed",
            ScoreBand::High => "healthy",
        }
    }
}

impl AnalysisResult {
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.health_score)
    }
}

/// Treat an explicit JSON `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_even_share<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or(50))
}
