use std::fmt;

use serde::Serialize;

/// Discrete tier of an admission chance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    #[serde(rename = "Medium-High")]
    MediumHigh,
    High,
}

impl ConfidenceLevel {
    /// Every tier, from lowest to highest.
    pub const ALL: [ConfidenceLevel; 5] = [
        ConfidenceLevel::VeryLow,
        ConfidenceLevel::Low,
        ConfidenceLevel::Medium,
        ConfidenceLevel::MediumHigh,
        ConfidenceLevel::High,
    ];

    /// Maps a chance in `[0, 1]` to its tier. Lower bounds are inclusive.
    pub fn from_chance(chance: f64) -> Self {
        if chance >= 0.8 {
            ConfidenceLevel::High
        } else if chance >= 0.6 {
            ConfidenceLevel::MediumHigh
        } else if chance >= 0.4 {
            ConfidenceLevel::Medium
        } else if chance >= 0.2 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::MediumHigh => "Medium-High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::VeryLow => "Very Low",
        }
    }

    /// Advice shown next to the tier.
    pub fn advice(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "Excellent admission chances! Your profile is very strong.",
            ConfidenceLevel::MediumHigh => {
                "Good admission chances. Consider strengthening weak areas."
            }
            ConfidenceLevel::Medium => {
                "Moderate admission chances. Focus on improving your profile."
            }
            ConfidenceLevel::Low => "Lower admission chances. Significant improvement needed.",
            ConfidenceLevel::VeryLow => {
                "Very low admission chances. Consider alternative options."
            }
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Returns the tier of `chance` and its advice.
pub fn interpret(chance: f64) -> (ConfidenceLevel, &'static str) {
    let level = ConfidenceLevel::from_chance(chance);
    (level, level.advice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_the_upper_tier() {
        let cases = [
            (1.0, ConfidenceLevel::High),
            (0.8, ConfidenceLevel::High),
            (0.79999, ConfidenceLevel::MediumHigh),
            (0.6, ConfidenceLevel::MediumHigh),
            (0.59999, ConfidenceLevel::Medium),
            (0.4, ConfidenceLevel::Medium),
            (0.39999, ConfidenceLevel::Low),
            (0.2, ConfidenceLevel::Low),
            (0.19999, ConfidenceLevel::VeryLow),
            (0.0, ConfidenceLevel::VeryLow),
        ];

        for (chance, expected) in cases {
            assert_eq!(ConfidenceLevel::from_chance(chance), expected, "{chance}");
        }
    }

    #[test]
    fn advice_follows_the_tier() {
        let (level, text) = interpret(0.85);
        assert_eq!(level, ConfidenceLevel::High);
        assert_eq!(text, "Excellent admission chances! Your profile is very strong.");

        let (level, text) = interpret(0.1);
        assert_eq!(level, ConfidenceLevel::VeryLow);
        assert_eq!(text, "Very low admission chances. Consider alternative options.");
    }

    #[test]
    fn serializes_with_display_labels() {
        for level in ConfidenceLevel::ALL {
            let json = serde_json::to_value(level).unwrap();
            assert_eq!(json, level.label());
        }
    }
}
