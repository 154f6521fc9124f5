use serde_json::Value;

use crate::{Feature, FeatureKind, StudentProfile, ValidationErr};

/// Validates an untyped student profile.
///
/// Presence of every field is checked first, then numeric conversion, then
/// the bounds. The first failure is returned.
///
/// # Arguments
/// * `raw` - The profile as received, a JSON object keyed by wire names.
///
/// # Returns
/// A `StudentProfile` whose values are all within bounds.
///
/// # Errors
/// Returns the `ValidationErr` describing the first offending field.
pub fn validate(raw: &Value) -> Result<StudentProfile, ValidationErr> {
    let object = raw.as_object().ok_or(ValidationErr::NotAnObject)?;

    let mut fields = Vec::with_capacity(Feature::COUNT);
    for feature in Feature::ALL {
        let value = object
            .get(feature.name())
            .ok_or(ValidationErr::MissingField(feature))?;
        fields.push((feature, value));
    }

    let mut values = [0.0; Feature::COUNT];
    for (feature, value) in fields {
        values[feature.index()] = to_number(feature, value)?;
    }

    for feature in Feature::ALL {
        check_bounds(feature, values[feature.index()])?;
    }

    Ok(StudentProfile::from_checked(values))
}

fn to_number(feature: Feature, value: &Value) -> Result<f64, ValidationErr> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    let number = number
        .filter(|n| n.is_finite())
        .ok_or(ValidationErr::TypeError {
            field: feature,
            expected: "a number",
        })?;

    if feature.kind() == FeatureKind::Integer && number.fract() != 0.0 {
        return Err(ValidationErr::TypeError {
            field: feature,
            expected: "an integer",
        });
    }

    Ok(number)
}

fn check_bounds(feature: Feature, value: f64) -> Result<(), ValidationErr> {
    let (min, max) = feature.bounds();
    let valid = match feature.kind() {
        FeatureKind::Binary => value == min || value == max,
        FeatureKind::Integer | FeatureKind::Continuous => (min..=max).contains(&value),
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationErr::RangeError {
            field: feature,
            min,
            max,
            got: value,
        })
    }
}
