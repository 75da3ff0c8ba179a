use lazy_static::lazy_static;
use regex::Regex;

/// Foods with a "cooling" dietary property.
const COLD_FOODS: &[&str] = &[
    "冰水", "冰飲", "西瓜", "哈密瓜", "梨子", "香蕉", "火龍果",
    "苦瓜", "小黃瓜", "冬瓜", "白蘿蔔", "綠豆", "薏仁", "海帶", "紫菜",
    "螃蟹", "蛤蜊", "牡蠣", "生魚片", "沙拉",
    "ice water", "iced drink", "watermelon", "cantaloupe", "pear", "banana",
    "dragon fruit", "bitter melon", "cucumber", "winter melon", "daikon",
    "mung bean", "job's tears", "kelp", "seaweed", "nori", "crab", "clam",
    "oyster", "sashimi", "salad",
];

/// Decided once, when the entry is created.
pub fn is_cold_food(food: &str) -> bool {
    lazy_static! {
        static ref COLD_KEYWORDS: Regex =
            Regex::new(r"(?i)冰|涼|\b(?:ice|iced|cold|chilled|frozen)\b").unwrap();
    }
    let name = food.trim().to_lowercase();
    if name.is_empty() {
        return false;
    }
    COLD_FOODS.iter().any(|f| name.contains(f)) || COLD_KEYWORDS.is_match(&name)
}

#[cfg(test)]
mod cold_tests {
    use super::*;

    #[test]
    fn listed_foods_are_cold() {
        assert!(is_cold_food("西瓜"));
        assert!(is_cold_food("Watermelon"));
        assert!(is_cold_food("chicken salad"));
        assert!(is_cold_food("烤螃蟹"));
    }

    #[test]
    fn keywords_mark_cold() {
        assert!(is_cold_food("冰咖啡"));
        assert!(is_cold_food("Iced latte"));
        assert!(is_cold_food("frozen yogurt"));
        assert!(is_cold_food("涼麵"));
    }

    #[test]
    fn warm_foods_are_not_cold() {
        assert!(!is_cold_food("beef noodle soup"));
        assert!(!is_cold_food("薑母鴨"));
        assert!(!is_cold_food("rice"));
        assert!(!is_cold_food("   "));
    }
}
