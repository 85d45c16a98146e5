//! Typed schema for LLM-structured resume data.
//!
//! Every field carries a serde default so a record deserialized from
//! partial collaborator output is still well-formed. The canonical empty
//! value (`StructuredResume::default()`) has every top-level key present
//! with empty contents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredResume {
    #[serde(default)]
    pub personal_information: PersonalInformation,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    /// Skill category → skills. A flat list in collaborator output is
    /// normalized to a single `technical` category before deserialization.
    #[serde(default)]
    pub skills: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub languages: Vec<LanguageEntry>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInformation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    /// Dates are free-form strings; collaborator output is not guaranteed
    /// to be ISO formatted.
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageEntry {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: String,
    #[serde(default)]
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_serializes_with_all_top_level_keys() {
        let value = serde_json::to_value(StructuredResume::default()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "personal_information",
            "experiences",
            "education",
            "skills",
            "languages",
            "certifications",
            "projects",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert!(obj["experiences"].as_array().unwrap().is_empty());
        assert!(obj["skills"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_deserializes_full_record() {
        let json = r#"{
            "personal_information": {
                "name": "Jane Doe",
                "email": "jane@example.com",
                "phone": "+33 6 00 00 00 00",
                "address": "Paris, France",
                "linkedin": "https://linkedin.com/in/janedoe"
            },
            "experiences": [
                {
                    "title": "Backend Engineer",
                    "company": "Acme",
                    "start_date": "2021-03",
                    "end_date": "Present",
                    "description": "Built ingestion services."
                }
            ],
            "education": [
                {
                    "degree": "MSc Computer Science",
                    "institution": "ENSIMAG",
                    "location": "Grenoble",
                    "start_date": "2016",
                    "end_date": "2019",
                    "description": ""
                }
            ],
            "skills": {"technical": ["Rust", "PostgreSQL"], "soft": ["Communication"]},
            "languages": [{"language": "French", "level": "Native"}],
            "certifications": [{"name": "CKA", "issuer": "CNCF", "date": "2022"}],
            "projects": [
                {"name": "cv-parser", "description": "OCR pipeline", "technologies": "Rust, S3", "date": "2023"}
            ]
        }"#;

        let resume: StructuredResume = serde_json::from_str(json).unwrap();
        assert_eq!(resume.personal_information.name, "Jane Doe");
        assert_eq!(resume.experiences.len(), 1);
        assert_eq!(resume.experiences[0].company, "Acme");
        assert_eq!(resume.skills["technical"], vec!["Rust", "PostgreSQL"]);
        assert_eq!(resume.languages[0].level, "Native");
        assert_eq!(resume.projects[0].technologies, "Rust, S3");
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let json = r#"{"experiences": [{"title": "Intern"}]}"#;
        let resume: StructuredResume = serde_json::from_str(json).unwrap();
        assert_eq!(resume.experiences[0].title, "Intern");
        assert_eq!(resume.experiences[0].company, "");
        assert!(resume.personal_information.email.is_empty());
        assert!(resume.education.is_empty());
        assert!(resume.skills.is_empty());
    }
}
