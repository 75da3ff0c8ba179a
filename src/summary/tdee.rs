//! Daily calorie target from the saved profile.
//!
//! BMR follows Mifflin-St Jeor (1990):
//! `10 x weight_kg + 6.25 x height_cm - 5 x age + s`, with `s = +5` for men and
//! `s = -161` for women. TDEE is BMR times the activity factor, then shifted by
//! the goal (-300 to lose, +300 to gain).

use crate::profile::repo_types::{Profile, Sex};

const MSJ_WEIGHT_COEF: f64 = 10.0;
const MSJ_HEIGHT_COEF: f64 = 6.25;
const MSJ_AGE_COEF: f64 = -5.0;
const MSJ_MALE_CONSTANT: f64 = 5.0;
const MSJ_FEMALE_CONSTANT: f64 = -161.0;

pub fn bmr_mifflin_st_jeor(profile: &Profile) -> f64 {
    let sex_constant = match profile.sex {
        Sex::Male => MSJ_MALE_CONSTANT,
        Sex::Female => MSJ_FEMALE_CONSTANT,
    };
    MSJ_WEIGHT_COEF * profile.weight_kg
        + MSJ_HEIGHT_COEF * profile.height_cm
        + MSJ_AGE_COEF * f64::from(profile.age)
        + sex_constant
}

/// Unrounded estimate; `None` until height and weight are known.
pub fn estimate_tdee(profile: &Profile) -> Option<f64> {
    if profile.height_cm <= 0.0 || profile.weight_kg <= 0.0 {
        return None;
    }
    let bmr = bmr_mifflin_st_jeor(profile);
    Some(bmr * profile.activity.factor() + profile.goal.adjustment())
}

/// The kcal/day limit the status check compares against.
pub fn estimate_daily_target(profile: &Profile) -> Option<u32> {
    estimate_tdee(profile).map(|t| t.round().max(0.0) as u32)
}

#[cfg(test)]
mod tdee_tests {
    use super::*;
    use crate::profile::repo_types::{ActivityTier, Goal};

    fn profile() -> Profile {
        Profile {
            age: 20,
            sex: Sex::Female,
            height_cm: 165.0,
            weight_kg: 60.0,
            activity: ActivityTier::Low,
            goal: Goal::Maintain,
        }
    }

    #[test]
    fn female_low_activity_maintain() {
        let p = profile();
        assert!((bmr_mifflin_st_jeor(&p) - 1370.25).abs() < 1e-9);
        assert_eq!(estimate_daily_target(&p), Some(1644));
    }

    #[test]
    fn male_constant_adds_166_over_female() {
        let female = profile();
        let male = Profile { sex: Sex::Male, ..profile() };
        let diff = bmr_mifflin_st_jeor(&male) - bmr_mifflin_st_jeor(&female);
        assert!((diff - 166.0).abs() < 1e-9);
    }

    #[test]
    fn activity_and_goal_shift_the_target() {
        let moderate_lose = Profile {
            activity: ActivityTier::Moderate,
            goal: Goal::Lose,
            ..profile()
        };
        // 1370.25 * 1.55 - 300 = 1823.8875
        assert_eq!(estimate_daily_target(&moderate_lose), Some(1824));

        let daily_gain = Profile {
            activity: ActivityTier::Daily,
            goal: Goal::Gain,
            ..profile()
        };
        // 1370.25 * 1.75 + 300 = 2697.9375
        assert_eq!(estimate_daily_target(&daily_gain), Some(2698));
    }

    #[test]
    fn missing_height_or_weight_gives_no_target() {
        assert_eq!(estimate_daily_target(&Profile { height_cm: 0.0, ..profile() }), None);
        assert_eq!(estimate_daily_target(&Profile { weight_kg: 0.0, ..profile() }), None);
        assert_eq!(
            estimate_daily_target(&Profile {
                height_cm: 0.0,
                sex: Sex::Male,
                goal: Goal::Gain,
                ..profile()
            }),
            None
        );
    }
}
