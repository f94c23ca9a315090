use crate::models::AnalysisResult;

/// Validation outcome for a decoded analysis result
#[derive(Debug, Clone)]
pub struct ResultValidation {
    /// Whether the result is usable
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
}

impl ResultValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

/// Check a result against the rules given to the model
pub fn validate_result(result: &AnalysisResult) -> ResultValidation {
    let mut errors = Vec::new();

    if !(0..=100).contains(&result.health_score) {
        errors.push(format!(
            "health_score {} is outside 0-100",
            result.health_score
        ));
    }

    if result.summary.trim().is_empty() {
        errors.push("summary is empty".to_string());
    }

    if result.action_plan.iter().all(|item| item.trim().is_empty()) {
        errors.push("action_plan has no items".to_string());
    }

    let balance = &result.message_balance;
    for (name, value) in [
        ("person_a_percentage", balance.person_a_percentage),
        ("person_b_percentage", balance.person_b_percentage),
    ] {
        if !(0..=100).contains(&value) {
            errors.push(format!("{} {} is outside 0-100", name, value));
        }
    }

    if errors.is_empty() {
        ResultValidation::valid()
    } else {
        ResultValidation::invalid(errors)
    }
}
