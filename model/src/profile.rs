use std::fmt;

use serde::Serialize;

/// How a feature's value is constrained on top of its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Continuous,
    Integer,
    Binary,
}

/// One of the inputs describing a student profile.
///
/// The discriminants follow the canonical feature order, the same order the
/// training pipeline writes the dataset columns in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    GreScore,
    ToeflScore,
    UniversityRating,
    Sop,
    Lor,
    Cgpa,
    Research,
}

impl Feature {
    pub const COUNT: usize = 7;

    /// Every feature, in canonical order.
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::GreScore,
        Feature::ToeflScore,
        Feature::UniversityRating,
        Feature::Sop,
        Feature::Lor,
        Feature::Cgpa,
        Feature::Research,
    ];

    /// Returns the wire name of this feature.
    ///
    /// # Returns
    /// The field name used in request bodies and in the model artifact.
    pub fn name(self) -> &'static str {
        match self {
            Feature::GreScore => "GRE_Score",
            Feature::ToeflScore => "TOEFL_Score",
            Feature::UniversityRating => "University_Rating",
            Feature::Sop => "SOP",
            Feature::Lor => "LOR",
            Feature::Cgpa => "CGPA",
            Feature::Research => "Research",
        }
    }

    /// Looks a feature up by its wire name.
    ///
    /// # Arguments
    /// * `name` - A wire name such as `"CGPA"`.
    ///
    /// # Returns
    /// The matching feature, or `None` if the name is unknown.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| feature.name() == name)
    }

    /// Returns the inclusive `(min, max)` bounds of this feature.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Feature::GreScore => (260.0, 340.0),
            Feature::ToeflScore => (80.0, 120.0),
            Feature::UniversityRating => (1.0, 5.0),
            Feature::Sop | Feature::Lor => (1.0, 5.0),
            Feature::Cgpa => (6.0, 10.0),
            Feature::Research => (0.0, 1.0),
        }
    }

    pub fn kind(self) -> FeatureKind {
        match self {
            Feature::UniversityRating => FeatureKind::Integer,
            Feature::Research => FeatureKind::Binary,
            _ => FeatureKind::Continuous,
        }
    }

    /// Position of this feature in canonical order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated student profile.
///
/// Only `validate` builds one, so every instance respects the feature bounds.
/// It serializes back with the wire names and is what responses echo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudentProfile {
    #[serde(rename = "GRE_Score")]
    gre_score: f64,
    #[serde(rename = "TOEFL_Score")]
    toefl_score: f64,
    #[serde(rename = "University_Rating")]
    university_rating: u8,
    #[serde(rename = "SOP")]
    sop: f64,
    #[serde(rename = "LOR")]
    lor: f64,
    #[serde(rename = "CGPA")]
    cgpa: f64,
    #[serde(rename = "Research")]
    research: u8,
}

impl StudentProfile {
    /// Builds a profile from values already checked by the validator.
    ///
    /// `values` must be in canonical order and the integer and binary
    /// features must hold whole numbers within their bounds.
    pub(crate) fn from_checked(values: [f64; Feature::COUNT]) -> Self {
        Self {
            gre_score: values[Feature::GreScore.index()],
            toefl_score: values[Feature::ToeflScore.index()],
            university_rating: values[Feature::UniversityRating.index()] as u8,
            sop: values[Feature::Sop.index()],
            lor: values[Feature::Lor.index()],
            cgpa: values[Feature::Cgpa.index()],
            research: values[Feature::Research.index()] as u8,
        }
    }

    /// Returns the raw value of a single feature.
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::GreScore => self.gre_score,
            Feature::ToeflScore => self.toefl_score,
            Feature::UniversityRating => f64::from(self.university_rating),
            Feature::Sop => self.sop,
            Feature::Lor => self.lor,
            Feature::Cgpa => self.cgpa,
            Feature::Research => f64::from(self.research),
        }
    }

    /// Returns every feature value in canonical order.
    pub fn features(&self) -> [f64; Feature::COUNT] {
        Feature::ALL.map(|feature| self.value(feature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_matches_indices() {
        for (i, feature) in Feature::ALL.into_iter().enumerate() {
            assert_eq!(feature.index(), i);
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(Feature::from_name("gre_score"), None);
        assert_eq!(Feature::from_name("Chance_of_Admit"), None);
    }

    #[test]
    fn profile_serializes_with_wire_names() {
        let profile = StudentProfile::from_checked([320.0, 110.0, 4.0, 4.5, 4.0, 8.5, 1.0]);
        let json = serde_json::to_value(profile).unwrap();

        assert_eq!(json["GRE_Score"], 320.0);
        assert_eq!(json["University_Rating"], 4);
        assert_eq!(json["Research"], 1);
        assert_eq!(profile.features(), [320.0, 110.0, 4.0, 4.5, 4.0, 8.5, 1.0]);
    }
}
