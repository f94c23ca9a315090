/// Build the analysis prompt around the formatted chat excerpt
pub fn build_analysis_prompt(chat_data: &str, language: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are an expert psychologist and data analyst who studies relationship dynamics. \
         You will analyze the exported chat history below.\n\n",
    );

    prompt.push_str("## Task\n");
    prompt.push_str(
        "Analyze the conversation in depth and return the results in EXACTLY the JSON format \
         given below. Return only JSON, no other text.\n\n",
    );

    prompt.push_str("## Analysis Criteria\n");
    prompt.push_str("1. Evaluate the message balance and communication frequency of both sides\n");
    prompt.push_str("2. Identify emotional tone, empathy and supportiveness\n");
    prompt.push_str("3. Detect conflict patterns and healthy or unhealthy dynamics\n");
    prompt.push_str("4. Note the positive aspects and strengths\n");
    prompt.push_str("5. Offer concrete, actionable suggestions for growth\n\n");

    prompt.push_str("## Chat Data\n");
    prompt.push_str(chat_data);
    if !chat_data.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push('\n');

    prompt.push_str("## Output Format (return only this JSON)\n");
    prompt.push_str(OUTPUT_SCHEMA);
    prompt.push_str("\n\n");

    prompt.push_str("## Rules\n");
    prompt.push_str("- health_score must be an INTEGER between 0 and 100\n");
    prompt.push_str(&format!("- Write all text values in {}\n", language));
    prompt.push_str("- Return only JSON, no explanations\n");
    prompt.push_str("- red_flags may be empty, but include at least one action_plan item\n");

    prompt
}

const OUTPUT_SCHEMA: &str = r#"{
    "health_score": <integer 0-100, 0 = very unhealthy, 100 = very healthy>,
    "summary": "<3-4 sentence summary of the overall state of the relationship>",
    "red_flags": ["<warning sign 1>", "<warning sign 2>"],
    "action_plan": ["<concrete suggestion 1>", "<concrete suggestion 2>", "<concrete suggestion 3>"],
    "communication_style": "<description of the communication style>",
    "dominant_emotions": ["<emotion 1>", "<emotion 2>", "<emotion 3>"],
    "positive_aspects": ["<positive aspect 1>", "<positive aspect 2>"],
    "message_balance": {
        "person_a": "<name of the first person>",
        "person_b": "<name of the second person>",
        "person_a_percentage": <person A's share of messages, integer>,
        "person_b_percentage": <person B's share of messages, integer>
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_chat_and_schema() {
        let chat = "[1.1.2024 10:00] Alice: Hello\n[1.1.2024 10:01] Bob: Hi\n";
        let prompt = build_analysis_prompt(chat, "Turkish");

        assert!(prompt.contains(chat));
        assert!(prompt.contains("\"health_score\""));
        assert!(prompt.contains("\"person_b_percentage\""));
        assert!(prompt.contains("Write all text values in Turkish"));
    }

    #[test]
    fn test_chat_section_precedes_output_format() {
        let prompt = build_analysis_prompt("[t] A: x", "English");
        let chat_at = prompt.find("[t] A: x").unwrap();
        let schema_at = prompt.find("## Output Format").unwrap();
        assert!(chat_at < schema_at);
    }
}
