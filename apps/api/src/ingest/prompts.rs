// Structuring-stage LLM prompt templates.
// All prompts for the ingest module are defined here.

pub const STRUCTURE_PROMPT: &str = r#"Analyze this resume and extract the information as structured JSON in exactly the following format:

{
    "personal_information": {
        "name": "Full name",
        "email": "email@example.com",
        "phone": "Phone number",
        "address": "Full address",
        "linkedin": "LinkedIn URL"
    },
    "experiences": [
        {
            "title": "Job title",
            "company": "Company name",
            "start_date": "Start date",
            "end_date": "End date",
            "description": "Full description"
        }
    ],
    "education": [
        {
            "degree": "Degree",
            "institution": "Institution",
            "location": "Location",
            "start_date": "Start date",
            "end_date": "End date",
            "description": "Description"
        }
    ],
    "skills": [
        "Skill 1",
        "Skill 2"
    ],
    "languages": [
        {
            "language": "English",
            "level": "Native"
        }
    ],
    "certifications": [
        {
            "name": "Certification name",
            "issuer": "Issuing body",
            "date": "Date"
        }
    ],
    "projects": [
        {
            "name": "Project name",
            "description": "Description",
            "technologies": "Technologies",
            "date": "Date"
        }
    ]
}

Return only valid JSON, with no comments and no extra text.

Resume to analyze:
{raw_text}"#;
