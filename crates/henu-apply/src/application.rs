//! Team application form and its validation rules.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use henu_core::{MAX_APPLICATION_SKILLS, MIN_APPLICATION_SKILLS};
use serde::{Deserialize, Serialize};

/// A submitted "join the team" form.
///
/// Photo and resume are uploaded to file storage first; the form carries
/// their URLs.
/// Missing fields deserialize empty and are reported by [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamApplication {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub skills: Vec<String>,
    pub photo_url: String,
    pub resume_url: String,
}

/// An application as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredApplication {
    pub id: String,
    /// Unix seconds.
    pub submitted_at: i64,
    #[serde(flatten)]
    pub application: TeamApplication,
}

/// Field name -> message, for every field that failed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    fn add(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for `field`, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl TeamApplication {
    /// Check every field, collecting all failures.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if self.phone.trim().is_empty() {
            errors.add("phone", "Phone number is required");
        }
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !looks_like_email(&self.email) {
            errors.add("email", "Please enter a valid email");
        }
        if self.address.trim().is_empty() {
            errors.add("address", "Address is required");
        }

        let skills = self.distinct_skills();
        if skills < MIN_APPLICATION_SKILLS {
            errors.add("skills", &format!("Minimum {MIN_APPLICATION_SKILLS} skills required"));
        } else if skills > MAX_APPLICATION_SKILLS {
            errors.add("skills", &format!("Maximum {MAX_APPLICATION_SKILLS} skills allowed"));
        }

        if self.photo_url.trim().is_empty() {
            errors.add("photo", "Photo is required");
        }
        if self.resume_url.trim().is_empty() {
            errors.add("resume", "Resume is required");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Non-blank skills, counted once each ignoring case and padding.
    fn distinct_skills(&self) -> usize {
        self.skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Skills joined for display and storage.
    pub fn skills_joined(&self) -> String {
        self.skills.join(", ")
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
pub(crate) fn sample() -> TeamApplication {
    TeamApplication {
        name: "Ada Lovelace".into(),
        phone: "+44 20 7946 0000".into(),
        email: "ada@example.org".into(),
        address: "12 St James's Square, London".into(),
        skills: [
            "Rust", "Linux", "Docker", "Kubernetes", "Git", "Python", "Networking",
        ]
        .map(String::from)
        .to_vec(),
        photo_url: "https://files.example.org/photos/ada.png".into(),
        resume_url: "https://files.example.org/resumes/ada.pdf".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_application() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = TeamApplication::default().validate().unwrap_err();
        for field in ["name", "phone", "email", "address", "skills", "photo", "resume"] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("skills"), Some("Minimum 7 skills required"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("a@b.co"));
        assert!(looks_like_email("first.last+tag@sub.example.org"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.org"));
        assert!(!looks_like_email("a@.org"));
        assert!(!looks_like_email("a@b."));
        assert!(!looks_like_email("a b@c.org"));
        assert!(!looks_like_email("a@b@c.org"));

        let mut app = sample();
        app.email = "not-an-email".into();
        assert_eq!(
            app.validate().unwrap_err().get("email"),
            Some("Please enter a valid email")
        );
    }

    #[test]
    fn test_skill_bounds() {
        let mut app = sample();
        app.skills.truncate(6);
        assert_eq!(
            app.validate().unwrap_err().get("skills"),
            Some("Minimum 7 skills required")
        );

        app.skills = (0..14).map(|i| format!("skill-{i}")).collect();
        assert!(app.validate().is_ok());

        app.skills.push("one too many".into());
        assert_eq!(
            app.validate().unwrap_err().get("skills"),
            Some("Maximum 14 skills allowed")
        );
    }

    #[test]
    fn test_repeated_skills_count_once() {
        let mut app = sample();
        app.skills = vec!["rust".to_string(); 7];
        assert_eq!(
            app.validate().unwrap_err().get("skills"),
            Some("Minimum 7 skills required")
        );

        // Six distinct plus a padded, differently cased repeat.
        app.skills = sample().skills[..6].to_vec();
        app.skills.push("  RUST ".into());
        assert!(app.validate().is_err());

        app.skills.push("Networking".into());
        assert!(app.validate().is_ok());
    }

    #[test]
    fn test_errors_serialize_as_map() {
        let mut app = sample();
        app.name = "  ".into();
        let errors = app.validate().unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Name is required"}));
        assert_eq!(errors.to_string(), "name: Name is required");
    }
}
