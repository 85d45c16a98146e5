//! LLM structuring stage.
//!
//! The collaborator's output shape is not contractually guaranteed, so the
//! completion is treated as an untyped document first: scan out the JSON
//! object, normalize the shapes the model is known to vary, then
//! deserialize into the fixed schema. Every failure mode degrades to the
//! canonical empty `StructuredResume` — this stage never raises.

use serde_json::{json, Value};
use tracing::warn;

use crate::ingest::prompts::STRUCTURE_PROMPT;
use crate::llm_client::LlmClient;
use crate::models::structured::StructuredResume;

/// Asks the LLM to structure `raw_text` and parses the completion.
/// Collaborator failures are absorbed: the result is always well-formed.
pub async fn structure_resume(llm: &LlmClient, raw_text: &str) -> StructuredResume {
    let prompt = STRUCTURE_PROMPT.replace("{raw_text}", raw_text);

    match llm.complete(&prompt).await {
        Ok(completion) => parse_completion(&completion),
        Err(e) => {
            warn!("LLM structuring call failed, substituting empty resume: {e}");
            StructuredResume::default()
        }
    }
}

/// Parses an LLM completion into a `StructuredResume`. Never fails: if no
/// JSON object is found, or it does not parse, or it does not fit the
/// schema after normalization, the canonical empty value is returned.
pub fn parse_completion(completion: &str) -> StructuredResume {
    let Some(json_text) = extract_json_object(completion) else {
        warn!("No JSON object found in LLM completion, substituting empty resume");
        return StructuredResume::default();
    };

    let mut value: Value = match serde_json::from_str(json_text) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse LLM JSON, substituting empty resume: {e}");
            return StructuredResume::default();
        }
    };

    normalize(&mut value);

    match serde_json::from_value(value) {
        Ok(resume) => resume,
        Err(e) => {
            warn!("LLM JSON did not fit the resume schema, substituting empty resume: {e}");
            StructuredResume::default()
        }
    }
}

/// Returns the substring from the first `{` to the last `}`, inclusive.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Repairs the shapes the collaborator is known to vary:
/// a flat `skills` list becomes a single `technical` category, and a
/// single-object `experiences`/`education` becomes a one-element sequence.
pub fn normalize(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };

    if let Some(skills) = obj.get_mut("skills") {
        if skills.is_array() {
            let flat = skills.take();
            *skills = json!({ "technical": flat });
        }
    }

    for key in ["experiences", "education"] {
        if let Some(field) = obj.get_mut(key) {
            if field.is_object() {
                let single = field.take();
                *field = Value::Array(vec![single]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_from_surrounding_prose() {
        let completion = "Here is the extracted data:\n{\"skills\": []}\nLet me know!";
        assert_eq!(extract_json_object(completion), Some("{\"skills\": []}"));
    }

    #[test]
    fn test_extract_json_object_spans_first_open_to_last_close() {
        let completion = "x {\"a\": {\"b\": 1}} y {\"c\": 2} z";
        assert_eq!(
            extract_json_object(completion),
            Some("{\"a\": {\"b\": 1}} y {\"c\": 2}")
        );
    }

    #[test]
    fn test_extract_json_object_without_braces() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn test_extract_json_object_with_reversed_braces() {
        assert_eq!(extract_json_object("} before {"), None);
    }

    #[test]
    fn test_parse_completion_with_embedded_json() {
        let completion = r#"Sure, here is the JSON:
            {"personal_information": {"name": "Jane Doe"},
             "experiences": [{"title": "Engineer", "company": "Acme"}]}
            Anything else?"#;
        let resume = parse_completion(completion);
        assert_eq!(resume.personal_information.name, "Jane Doe");
        assert_eq!(resume.experiences.len(), 1);
        assert_eq!(resume.experiences[0].company, "Acme");
    }

    #[test]
    fn test_parse_completion_without_json_degrades_to_empty() {
        let resume = parse_completion("I could not read this document, sorry.");
        assert_eq!(resume, StructuredResume::default());
    }

    #[test]
    fn test_parse_completion_with_unparseable_braces_degrades_to_empty() {
        let resume = parse_completion("{this is not json}");
        assert_eq!(resume, StructuredResume::default());
    }

    #[test]
    fn test_flat_skills_list_wrapped_under_technical() {
        let resume = parse_completion(r#"{"skills": ["Rust", "PostgreSQL"]}"#);
        assert_eq!(resume.skills["technical"], vec!["Rust", "PostgreSQL"]);
    }

    #[test]
    fn test_categorized_skills_left_untouched() {
        let resume =
            parse_completion(r#"{"skills": {"soft": ["Communication"], "technical": ["Rust"]}}"#);
        assert_eq!(resume.skills["soft"], vec!["Communication"]);
        assert_eq!(resume.skills["technical"], vec!["Rust"]);
    }

    #[test]
    fn test_single_experience_object_wrapped_in_sequence() {
        let resume =
            parse_completion(r#"{"experiences": {"title": "Engineer", "company": "Acme"}}"#);
        assert_eq!(resume.experiences.len(), 1);
        assert_eq!(resume.experiences[0].title, "Engineer");
    }

    #[test]
    fn test_single_education_object_wrapped_in_sequence() {
        let resume = parse_completion(r#"{"education": {"degree": "MSc", "institution": "MIT"}}"#);
        assert_eq!(resume.education.len(), 1);
        assert_eq!(resume.education[0].degree, "MSc");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut value = json!({
            "skills": ["Rust"],
            "experiences": {"title": "Engineer"}
        });
        normalize(&mut value);
        let once = value.clone();
        normalize(&mut value);
        assert_eq!(value, once);
        assert_eq!(value["skills"]["technical"][0], "Rust");
        assert!(value["experiences"].is_array());
    }

    #[test]
    fn test_non_object_completion_degrades_to_empty() {
        // A bare JSON array has no `{`, so the scan finds nothing.
        let resume = parse_completion(r#"["not", "an", "object"]"#);
        assert_eq!(resume, StructuredResume::default());
    }
}
