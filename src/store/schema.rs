use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::GlossaryEntry;

/// Key holding the list of lecture ids the user marked as studied.
pub const COMPLETED_LECTURES_KEY: &str = "completed_lectures";
/// Key holding the user-authored glossary entries, newest first.
pub const CUSTOM_TERMS_KEY: &str = "custom_terms";

pub type CompletedLectures = Vec<u32>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTerm {
    pub id: String,
    pub term: String,
    #[serde(default)]
    pub term_en: Option<String>,
    pub definition: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl CustomTerm {
    pub fn as_entry(&self) -> GlossaryEntry {
        GlossaryEntry {
            term: self.term.clone(),
            term_en: self.term_en.clone(),
            definition: self.definition.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_term_accepts_records_without_timestamp() {
        let json = r#"{"id":"1","term":"الطرح","definition":"..."}"#;
        let term: CustomTerm = serde_json::from_str(json).unwrap();
        assert_eq!(term.term_en, None);
        assert_eq!(term.as_entry().term, "الطرح");
    }
}
