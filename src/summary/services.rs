use serde::Serialize;
use time::Date;

use super::tdee::estimate_daily_target;
use crate::error::DiaryError;
use crate::logs::{repo as logs_repo, repo_types::MealLogEntry};
use crate::profile::repo::load_profile;
use crate::state::AppState;
use crate::week::calendar::iso_date;

pub const COLD_TIP_THRESHOLD: usize = 3;
pub const HIGH_CALORIE_THRESHOLD: u64 = 2000;

/// Advisory shown under the day's totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tip {
    Fine,
    TooManyColdFoods,
    CaloriesTooHigh,
    NoEntries,
}

impl Tip {
    pub fn message(self) -> &'static str {
        match self {
            Self::Fine => "diet looks fine.",
            Self::TooManyColdFoods => "too many cooling foods, balance with warming foods.",
            Self::CaloriesTooHigh => "calories too high today",
            Self::NoEntries => "no entries yet, log your meals",
        }
    }
}

/// Later rules win: no entries beats high calories beats cold foods.
pub fn pick_tip(entry_count: usize, total: u64, cold_count: usize) -> Tip {
    let mut tip = Tip::Fine;
    if cold_count >= COLD_TIP_THRESHOLD {
        tip = Tip::TooManyColdFoods;
    }
    if total > HIGH_CALORIE_THRESHOLD {
        tip = Tip::CaloriesTooHigh;
    }
    if entry_count == 0 {
        tip = Tip::NoEntries;
    }
    tip
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub total: u64,
    pub cold_count: usize,
    pub tip: Tip,
    pub tip_message: &'static str,
    pub entries: Vec<MealLogEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayStatus {
    #[serde(flatten)]
    pub summary: DaySummary,
    pub limit: Option<u32>,
    pub over: bool,
    pub over_by: u64,
}

pub fn summarize(entries: &[MealLogEntry], date: Date) -> DaySummary {
    let entries: Vec<MealLogEntry> = entries.iter().filter(|e| e.date == date).cloned().collect();
    let total = entries.iter().map(|e| u64::from(e.calories)).sum();
    let cold_count = entries.iter().filter(|e| e.cold).count();
    let tip = pick_tip(entries.len(), total, cold_count);
    DaySummary {
        date,
        total,
        cold_count,
        tip,
        tip_message: tip.message(),
        entries,
    }
}

/// With no limit the day is never over budget.
pub fn resolve_status(summary: DaySummary, limit: Option<u32>) -> DayStatus {
    let over_by = limit.map_or(0, |l| summary.total.saturating_sub(u64::from(l)));
    DayStatus {
        summary,
        limit,
        over: over_by > 0,
        over_by,
    }
}

pub async fn summary_for(st: &AppState, date: Date) -> Result<DaySummary, DiaryError> {
    let entries = logs_repo::list_all(st.store.as_ref()).await?;
    Ok(summarize(&entries, date))
}

pub async fn status_for(st: &AppState, date: Date) -> Result<DayStatus, DiaryError> {
    let summary = summary_for(st, date).await?;
    let profile = load_profile(st.store.as_ref()).await?;
    Ok(resolve_status(summary, estimate_daily_target(&profile)))
}

#[cfg(test)]
mod summary_tests {
    use super::*;
    use crate::logs::services::{build_entry, NewLogEntry};
    use time::macros::date;

    fn entry(date: Date, food: &str, calories: i64) -> MealLogEntry {
        build_entry(NewLogEntry {
            date,
            meal: "Lunch".into(),
            food: food.into(),
            calories,
            photo: None,
        })
        .unwrap()
    }

    #[test]
    fn empty_day_says_no_entries() {
        let s = summarize(&[], date!(2025 - 01 - 06));
        assert_eq!(s.total, 0);
        assert_eq!(s.tip, Tip::NoEntries);
        assert_eq!(pick_tip(0, 2500, 4), Tip::NoEntries);
    }

    #[test]
    fn high_calories_beat_cold_foods() {
        assert_eq!(pick_tip(4, 2500, 4), Tip::CaloriesTooHigh);
        assert_eq!(pick_tip(4, 2000, 4), Tip::TooManyColdFoods);
        assert_eq!(pick_tip(2, 1500, 2), Tip::Fine);
    }

    #[test]
    fn totals_only_count_the_requested_day() {
        let d = date!(2025 - 01 - 06);
        let entries = vec![
            entry(d, "watermelon", 100),
            entry(d, "iced tea", 150),
            entry(date!(2025 - 01 - 07), "salad", 900),
            entry(d, "cucumber", 50),
            entry(d, "beef stew", 1900),
        ];
        let s = summarize(&entries, d);
        assert_eq!(s.total, 2200);
        assert_eq!(s.cold_count, 3);
        assert_eq!(s.entries.len(), 4);
        assert_eq!(s.tip, Tip::CaloriesTooHigh);
        assert_eq!(s.tip_message, "calories too high today");
    }

    #[test]
    fn totals_track_surviving_entries() {
        let d = date!(2025 - 01 - 06);
        let mut entries: Vec<MealLogEntry> = Vec::new();
        let foods = [("salad", 300), ("rice", 500), ("crab", 200), ("noodles", 700)];
        for (food, kcal) in foods {
            entries.push(entry(d, food, kcal));
            let s = summarize(&entries, d);
            assert_eq!(s.total, entries.iter().map(|e| u64::from(e.calories)).sum::<u64>());
            assert_eq!(s.cold_count, entries.iter().filter(|e| e.cold).count());
        }
        entries.remove(0);
        let s = summarize(&entries, d);
        assert_eq!(s.total, 1400);
        assert_eq!(s.cold_count, 1);
    }

    #[test]
    fn over_budget_status() {
        let d = date!(2025 - 01 - 06);
        let s = summarize(&[entry(d, "hot pot", 2200)], d);
        let status = resolve_status(s, Some(1644));
        assert!(status.over);
        assert_eq!(status.over_by, 556);
    }

    #[test]
    fn under_budget_and_unknown_limit() {
        let d = date!(2025 - 01 - 06);
        let s = summarize(&[entry(d, "rice", 1200)], d);
        let under = resolve_status(s.clone(), Some(1644));
        assert!(!under.over);
        assert_eq!(under.over_by, 0);

        let unknown = resolve_status(s, None);
        assert_eq!(unknown.limit, None);
        assert!(!unknown.over);
        assert_eq!(unknown.over_by, 0);
    }

    #[tokio::test]
    async fn status_uses_saved_profile() {
        use crate::profile::{repo::save_profile, repo_types::*};

        let st = AppState::fake();
        let d = date!(2025 - 01 - 06);
        crate::logs::repo::append(st.store.as_ref(), entry(d, "hot pot", 2200))
            .await
            .unwrap();

        let before = status_for(&st, d).await.unwrap();
        assert_eq!(before.limit, None);
        assert!(!before.over);

        let profile = Profile {
            age: 20,
            sex: Sex::Female,
            height_cm: 165.0,
            weight_kg: 60.0,
            activity: ActivityTier::Low,
            goal: Goal::Maintain,
        };
        save_profile(st.store.as_ref(), &profile).await.unwrap();
        let after = status_for(&st, d).await.unwrap();
        assert_eq!(after.limit, Some(1644));
        assert_eq!(after.over_by, 556);
    }
}
