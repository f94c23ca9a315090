use serde::{Deserialize, Serialize};

use super::{AnalysisResult, MessageBalance};

/// A saved analysis, as stored in the history database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Row ID assigned by the store
    pub id: i64,
    /// Insertion time in Unix milliseconds
    pub created_at_ms: i64,
    pub person_a: String,
    pub person_b: String,
    pub health_score: i32,
    pub summary: String,
    pub communication_style: String,
    pub red_flags: Vec<String>,
    pub action_plan: Vec<String>,
    pub positive_aspects: Vec<String>,
    pub dominant_emotions: Vec<String>,
    pub person_a_percentage: i32,
    pub person_b_percentage: i32,
}

impl AnalysisRecord {
    /// Rebuild the analysis result this record was saved from
    pub fn to_result(&self) -> AnalysisResult {
        AnalysisResult {
            health_score: self.health_score,
            summary: self.summary.clone(),
            red_flags: self.red_flags.clone(),
            action_plan: self.action_plan.clone(),
            communication_style: self.communication_style.clone(),
            dominant_emotions: self.dominant_emotions.clone(),
            positive_aspects: self.positive_aspects.clone(),
            message_balance: MessageBalance {
                person_a: self.person_a.clone(),
                person_b: self.person_b.clone(),
                person_a_percentage: self.person_a_percentage,
                person_b_percentage: self.person_b_percentage,
            },
        }
    }
}
