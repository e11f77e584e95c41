//! Journalist and article records shared by the scraper, the store, and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A journalist candidate extracted from a byline.
///
/// `name` is the identity key. Bylines without profile links (agency
/// credits such as "Associated Press") produce a record with no
/// `profile_url`. The heuristic fields are filled in by an external
/// face-analysis step and are never written by the fetch pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalistRecord {
    pub name: String,
    pub profile_url: Option<String>,
    pub image_path: Option<String>,
    pub gender: Option<String>,
    pub gender_confidence: Option<f32>,
    pub age_range_low: Option<i32>,
    pub age_range_high: Option<i32>,
}

impl JournalistRecord {
    /// A record carrying only a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile_url: None,
            image_path: None,
            gender: None,
            gender_confidence: None,
            age_range_low: None,
            age_range_high: None,
        }
    }

    /// A record for a journalist with a profile page.
    #[must_use]
    pub fn with_profile(name: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self {
            profile_url: Some(profile_url.into()),
            ..Self::named(name)
        }
    }

    /// `true` when the record has a profile page but no stored headshot yet.
    #[must_use]
    pub fn needs_image(&self) -> bool {
        self.profile_url.is_some() && self.image_path.is_none()
    }

    pub fn apply_heuristics(&mut self, heuristics: &FaceHeuristics) {
        self.gender = Some(heuristics.gender.clone());
        self.gender_confidence = Some(heuristics.gender_confidence);
        self.age_range_low = Some(heuristics.age_range_low);
        self.age_range_high = Some(heuristics.age_range_high);
    }
}

/// Gender and age estimates produced by face analysis of a headshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceHeuristics {
    pub gender: String,
    pub gender_confidence: f32,
    pub age_range_low: i32,
    pub age_range_high: i32,
}

/// One article credited to one journalist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub published_at: DateTime<Utc>,
    pub web_url: String,
    pub journalist_name: String,
}
