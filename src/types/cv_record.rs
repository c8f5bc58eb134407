// src/types/cv_record.rs
//! Flat CV record edited by the form and rendered by the template

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===== CV Record =====

/// Every field is plain text; an empty string means "not provided".
/// `image` holds a self-contained `data:` URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvRecord {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub summary: String,
    pub education: String,
    pub experience: String,
    pub skills: String,
    pub projects: String,
    pub certifications: String,
    pub image: String,
    pub linkedin: String,
}

impl CvRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: CvField) -> &str {
        match field {
            CvField::Name => &self.name,
            CvField::Title => &self.title,
            CvField::Email => &self.email,
            CvField::Phone => &self.phone,
            CvField::Address => &self.address,
            CvField::Summary => &self.summary,
            CvField::Education => &self.education,
            CvField::Experience => &self.experience,
            CvField::Skills => &self.skills,
            CvField::Projects => &self.projects,
            CvField::Certifications => &self.certifications,
            CvField::Image => &self.image,
            CvField::Linkedin => &self.linkedin,
        }
    }

    pub fn set(&mut self, field: CvField, value: String) {
        let slot = match field {
            CvField::Name => &mut self.name,
            CvField::Title => &mut self.title,
            CvField::Email => &mut self.email,
            CvField::Phone => &mut self.phone,
            CvField::Address => &mut self.address,
            CvField::Summary => &mut self.summary,
            CvField::Education => &mut self.education,
            CvField::Experience => &mut self.experience,
            CvField::Skills => &mut self.skills,
            CvField::Projects => &mut self.projects,
            CvField::Certifications => &mut self.certifications,
            CvField::Image => &mut self.image,
            CvField::Linkedin => &mut self.linkedin,
        };
        *slot = value;
    }

    /// Skills split on commas, trimmed, empty entries dropped, order kept.
    pub fn skill_list(&self) -> Vec<String> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// ===== Field identifiers =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvField {
    Name,
    Title,
    Email,
    Phone,
    Address,
    Summary,
    Education,
    Experience,
    Skills,
    Projects,
    Certifications,
    Image,
    Linkedin,
}

/// How a field is presented on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Tel,
    Url,
    TextArea,
    File,
}

impl CvField {
    pub const ALL: [CvField; 13] = [
        CvField::Name,
        CvField::Title,
        CvField::Image,
        CvField::Email,
        CvField::Phone,
        CvField::Address,
        CvField::Linkedin,
        CvField::Summary,
        CvField::Education,
        CvField::Experience,
        CvField::Skills,
        CvField::Projects,
        CvField::Certifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Title => "title",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Summary => "summary",
            Self::Education => "education",
            Self::Experience => "experience",
            Self::Skills => "skills",
            Self::Projects => "projects",
            Self::Certifications => "certifications",
            Self::Image => "image",
            Self::Linkedin => "linkedin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Full Name",
            Self::Title => "Professional Title",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Address => "Address",
            Self::Summary => "Professional Summary",
            Self::Education => "Education",
            Self::Experience => "Work Experience",
            Self::Skills => "Skills",
            Self::Projects => "Projects",
            Self::Certifications => "Certifications",
            Self::Image => "Profile Image",
            Self::Linkedin => "LinkedIn",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Name => "John Doe",
            Self::Title => "Software Engineer",
            Self::Email => "john.doe@example.com",
            Self::Phone => "+1 234 567 890",
            Self::Address => "123 Main St, City, Country",
            Self::Summary => {
                "Briefly describe your professional background and key qualifications..."
            }
            Self::Education => "Include your degrees, institutions, and dates attended...",
            Self::Experience => {
                "List your work history with company names, positions, and key achievements..."
            }
            Self::Skills => {
                "List your skills separated by commas (e.g., JavaScript, React, Project Management)"
            }
            Self::Projects => "Describe any significant projects you've worked on...",
            Self::Certifications => "List any professional certifications you've earned...",
            Self::Image => "",
            Self::Linkedin => "https://linkedin.com/in/john-doe",
        }
    }

    /// Marked with `*` on the form; never enforced.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Name | Self::Email | Self::Phone)
    }

    pub fn input_kind(&self) -> InputKind {
        match self {
            Self::Email => InputKind::Email,
            Self::Phone => InputKind::Tel,
            Self::Linkedin => InputKind::Url,
            Self::Image => InputKind::File,
            Self::Summary
            | Self::Education
            | Self::Experience
            | Self::Projects
            | Self::Certifications => InputKind::TextArea,
            Self::Name | Self::Title | Self::Address | Self::Skills => InputKind::Text,
        }
    }
}

impl fmt::Display for CvField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown CV field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for CvField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CvField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_every_field() {
        let mut record = CvRecord::new();
        for field in CvField::ALL {
            record.set(field, format!("value of {}", field));
        }
        for field in CvField::ALL {
            assert_eq!(record.get(field), format!("value of {}", field));
        }
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in CvField::ALL {
            assert_eq!(field.as_str().parse::<CvField>(), Ok(field));
        }
        assert_eq!("Email".parse::<CvField>(), Ok(CvField::Email));
        assert!("salary".parse::<CvField>().is_err());
    }

    #[test]
    fn test_skill_list_trims_and_drops_empty() {
        let record = CvRecord {
            skills: "A, B ,C".to_string(),
            ..Default::default()
        };
        assert_eq!(record.skill_list(), vec!["A", "B", "C"]);

        let record = CvRecord {
            skills: "Rust,, Go ,".to_string(),
            ..Default::default()
        };
        assert_eq!(record.skill_list(), vec!["Rust", "Go"]);

        assert!(CvRecord::new().skill_list().is_empty());
    }

    #[test]
    fn test_required_fields() {
        let required: Vec<_> = CvField::ALL.iter().filter(|f| f.is_required()).collect();
        assert_eq!(
            required,
            vec![&CvField::Name, &CvField::Email, &CvField::Phone]
        );
    }

    #[test]
    fn test_record_deserializes_partial_toml() {
        let record: CvRecord = toml::from_str("name = \"Jane Doe\"\nskills = \"Rust\"\n")
            .expect("partial record parses");
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.skills, "Rust");
        assert!(record.email.is_empty());
    }
}
