//! Maps a loosely keyed profile object (as typed into a form or left behind by
//! older saves) onto the canonical [`Profile`]. Free text is turned into the
//! closed enums here and nowhere else.

use serde_json::{Map, Value};

use super::repo_types::{ActivityTier, Goal, Profile, Sex};
use crate::error::DiaryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Age,
    Sex,
    Height,
    Weight,
    Activity,
    Goal,
}

impl ProfileField {
    pub const ALL: [Self; 6] = [
        Self::Age,
        Self::Sex,
        Self::Height,
        Self::Weight,
        Self::Activity,
        Self::Goal,
    ];

    /// Recognized keys, canonical first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Age => &["age", "years", "Age", "Years"],
            Self::Sex => &["sex", "gender", "Sex", "Gender"],
            Self::Height => &["height_cm", "height", "heightCm", "Height"],
            Self::Weight => &["weight_kg", "weight", "weightKg", "Weight"],
            Self::Activity => &["activity", "exercise", "Activity", "Exercise"],
            Self::Goal => &["goal", "target", "Goal", "Target"],
        }
    }

    fn lookup(self, raw: &Map<String, Value>) -> Option<&Value> {
        self.aliases()
            .iter()
            .filter_map(|k| raw.get(*k))
            .find(|v| !is_blank(v))
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}

fn text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Sex {
    pub fn from_text(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "male" | "m" | "man" | "男" | "男性" | "男生" => Self::Male,
            _ => Self::Female,
        }
    }
}

impl ActivityTier {
    pub fn from_text(raw: &str) -> Self {
        const DAILY: &[&str] = &["daily", "every day", "everyday", "每天", "天天", "每日"];
        const MODERATE: &[&str] = &["3-5", "3", "5", "三", "五"];

        let t = raw.trim().to_lowercase();
        match t.as_str() {
            "low" => return Self::Low,
            "moderate" => return Self::Moderate,
            "daily" => return Self::Daily,
            _ => {}
        }
        if DAILY.iter().any(|k| t.contains(k)) {
            Self::Daily
        } else if MODERATE.iter().any(|k| t.contains(k)) {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl Goal {
    pub fn from_text(raw: &str) -> Self {
        const LOSE: &[&str] = &["lose", "loss", "cut", "減", "瘦"];
        const GAIN: &[&str] = &["gain", "bulk", "增"];

        let t = raw.trim().to_lowercase();
        if LOSE.iter().any(|k| t.contains(k)) {
            Self::Lose
        } else if GAIN.iter().any(|k| t.contains(k)) {
            Self::Gain
        } else {
            Self::Maintain
        }
    }
}

pub fn normalize(raw: &Map<String, Value>) -> Profile {
    let num = |f: ProfileField| f.lookup(raw).and_then(number);
    let txt = |f: ProfileField| f.lookup(raw).and_then(text);

    Profile {
        age: num(ProfileField::Age).map_or(0, |a| a.round() as u32),
        sex: txt(ProfileField::Sex).map_or_else(Sex::default, |t| Sex::from_text(&t)),
        height_cm: num(ProfileField::Height).unwrap_or(0.0),
        weight_kg: num(ProfileField::Weight).unwrap_or(0.0),
        activity: txt(ProfileField::Activity)
            .map_or_else(ActivityTier::default, |t| ActivityTier::from_text(&t)),
        goal: txt(ProfileField::Goal).map_or_else(Goal::default, |t| Goal::from_text(&t)),
    }
}

/// Keys in `raw` that map to no profile field.
pub fn unrecognized_keys(raw: &Map<String, Value>) -> Vec<String> {
    raw.keys()
        .filter(|k| {
            !ProfileField::ALL
                .iter()
                .any(|f| f.aliases().contains(&k.as_str()))
        })
        .cloned()
        .collect()
}

/// The object actually persisted: canonical keys only.
pub fn to_canonical(profile: &Profile) -> Result<Map<String, Value>, DiaryError> {
    match serde_json::to_value(profile) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(anyhow::anyhow!("profile serialized to {}", other).into()),
        Err(e) => Err(anyhow::Error::new(e).context("serialize profile").into()),
    }
}

#[cfg(test)]
mod normalize_tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn canonical_keys_read_back() {
        let p = normalize(&obj(json!({
            "age": 20, "sex": "female", "height_cm": 165, "weight_kg": 60,
            "activity": "low", "goal": "maintain"
        })));
        assert_eq!(p.age, 20);
        assert_eq!(p.sex, Sex::Female);
        assert_eq!(p.height_cm, 165.0);
        assert_eq!(p.weight_kg, 60.0);
        assert_eq!(p.activity, ActivityTier::Low);
        assert_eq!(p.goal, Goal::Maintain);
        assert_eq!(normalize(&to_canonical(&p).unwrap()), p);
    }

    #[test]
    fn alternate_spellings_and_string_numbers() {
        let p = normalize(&obj(json!({
            "years": "31", "Gender": "男", "Height": "172.5", "weight": "70",
            "exercise": "每週3-5次", "target": "減重"
        })));
        assert_eq!(p.age, 31);
        assert_eq!(p.sex, Sex::Male);
        assert_eq!(p.height_cm, 172.5);
        assert_eq!(p.weight_kg, 70.0);
        assert_eq!(p.activity, ActivityTier::Moderate);
        assert_eq!(p.goal, Goal::Lose);
    }

    #[test]
    fn blank_canonical_value_falls_through_to_alias() {
        let p = normalize(&obj(json!({ "height": "", "Height": 180, "weight": null, "weightKg": 80 })));
        assert_eq!(p.height_cm, 180.0);
        assert_eq!(p.weight_kg, 80.0);
    }

    #[test]
    fn missing_measurements_are_zero() {
        let p = normalize(&Map::new());
        assert_eq!(p.height_cm, 0.0);
        assert_eq!(p.weight_kg, 0.0);
        assert_eq!(p.sex, Sex::Female);
    }

    #[test]
    fn sex_tokens() {
        assert_eq!(Sex::from_text("M"), Sex::Male);
        assert_eq!(Sex::from_text("Male"), Sex::Male);
        assert_eq!(Sex::from_text("female"), Sex::Female);
        assert_eq!(Sex::from_text("女"), Sex::Female);
        assert_eq!(Sex::from_text("other"), Sex::Female);
    }

    #[test]
    fn activity_tiers() {
        assert_eq!(ActivityTier::from_text("0-2"), ActivityTier::Low);
        assert_eq!(ActivityTier::from_text("3-5 times a week"), ActivityTier::Moderate);
        assert_eq!(ActivityTier::from_text("5x"), ActivityTier::Moderate);
        assert_eq!(ActivityTier::from_text("Every day"), ActivityTier::Daily);
        assert_eq!(ActivityTier::from_text("每天運動"), ActivityTier::Daily);
        assert_eq!(ActivityTier::from_text("moderate"), ActivityTier::Moderate);
        assert_eq!(ActivityTier::from_text("rarely"), ActivityTier::Low);
    }

    #[test]
    fn goals() {
        assert_eq!(Goal::from_text("lose weight"), Goal::Lose);
        assert_eq!(Goal::from_text("Gain muscle"), Goal::Gain);
        assert_eq!(Goal::from_text("增肌"), Goal::Gain);
        assert_eq!(Goal::from_text("maintain"), Goal::Maintain);
        assert_eq!(Goal::from_text(""), Goal::Maintain);
    }

    #[test]
    fn unknown_keys_are_reported() {
        let extra = unrecognized_keys(&obj(json!({ "age": 1, "shoe_size": 42 })));
        assert_eq!(extra, vec!["shoe_size".to_string()]);
    }
}
