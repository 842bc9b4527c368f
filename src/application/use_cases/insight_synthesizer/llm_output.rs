use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::error::{AppError, Result};
use crate::infrastructure::response::strip_model_wrapping;

/// First balanced `{...}` span in model output that parses as a JSON object.
/// Candidates start at each opening brace in turn, so stray braces in the
/// surrounding prose are skipped. Braces inside JSON strings are ignored.
pub(crate) fn extract_json_object(output: &str) -> Option<String> {
    let cleaned = strip_model_wrapping(output)
        .lines()
        .collect::<Vec<_>>()
        .join("\n");

    cleaned
        .match_indices('{')
        .filter_map(|(start, _)| balanced_span(&cleaned[start..]))
        .find(|candidate| {
            serde_json::from_str::<Value>(candidate).map_or(false, |value| value.is_object())
        })
        .map(str::to_string)
}

/// Balanced span of `text`, which starts with `{`.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if in_string {
            match ch {
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[..=index]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a phase answer. The object must be non-empty and carry every
/// expected key before it is deserialized.
pub(crate) fn parse_phase<T: DeserializeOwned>(output: &str, expected_keys: &[&str]) -> Result<T> {
    let json = extract_json_object(output)
        .ok_or_else(|| AppError::MalformedResponse("No JSON object in response".to_string()))?;
    let value: Value = serde_json::from_str(&json)
        .map_err(|e| AppError::MalformedResponse(format!("Invalid JSON: {}", e)))?;

    let object = value
        .as_object()
        .filter(|object| !object.is_empty())
        .ok_or_else(|| AppError::MalformedResponse("Empty JSON object".to_string()))?;
    if let Some(missing) = expected_keys.iter().find(|key| !object.contains_key(**key)) {
        return Err(AppError::MalformedResponse(format!(
            "Missing key: {}",
            missing
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::MalformedResponse(format!("Unexpected shape: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::insight_synthesizer::types::{
        NegativePhase, SummaryPhase,
    };

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let output = "นี่คือผลลัพธ์:\n```json\n{\n  \"executive_summary\": \"ดี {มาก}\"\n}\n```\nขอบคุณครับ";
        assert_eq!(
            extract_json_object(output).unwrap(),
            "{\n  \"executive_summary\": \"ดี {มาก}\"\n}"
        );
    }

    #[test]
    fn stops_at_balanced_close_on_same_line() {
        let output = "prefix {\"a\": {\"b\": 1}} trailing {\"c\": 2}";
        assert_eq!(extract_json_object(output).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn skips_braces_in_leading_prose() {
        let output = "สรุปจาก {ข้อมูล} ทั้งหมด\n{\"executive_summary\": \"ดี\"}";
        assert_eq!(
            extract_json_object(output).unwrap(),
            "{\"executive_summary\": \"ดี\"}"
        );
        let parsed: SummaryPhase = parse_phase(output, &["executive_summary"]).unwrap();
        assert_eq!(parsed.executive_summary, "ดี");
    }

    #[test]
    fn unbalanced_output_has_no_object() {
        assert!(extract_json_object("{\"a\": 1").is_none());
        assert!(extract_json_object("no json here").is_none());
    }

    #[test]
    fn parses_complete_phase_answer() {
        let output = r#"{"executive_summary": "ระบบใช้งานได้ดี"}"#;
        let parsed: SummaryPhase = parse_phase(output, &["executive_summary"]).unwrap();
        assert_eq!(parsed.executive_summary, "ระบบใช้งานได้ดี");
    }

    #[test]
    fn missing_any_expected_key_is_malformed() {
        let output = r#"{"negative_aspects": ["ช้า"], "improvement_areas": []}"#;
        let result: Result<NegativePhase> = parse_phase(
            output,
            &["negative_aspects", "improvement_areas", "user_pain_points"],
        );
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn empty_object_is_malformed() {
        let result: Result<SummaryPhase> = parse_phase("{}", &["executive_summary"]);
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let result: Result<SummaryPhase> =
            parse_phase(r#"{"executive_summary": ["list"]}"#, &["executive_summary"]);
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }
}
