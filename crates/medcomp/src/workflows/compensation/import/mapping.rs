use super::normalizer::normalize_alias;
use crate::workflows::compensation::domain::PracticeCategory;
use std::collections::HashMap;
use std::sync::OnceLock;

static CATEGORY_ALIASES: OnceLock<HashMap<String, PracticeCategory>> = OnceLock::new();

pub(crate) fn category_for_backend(value: &str) -> Option<PracticeCategory> {
    category_aliases().get(&normalize_alias(value)).copied()
}

fn category_aliases() -> &'static HashMap<String, PracticeCategory> {
    CATEGORY_ALIASES.get_or_init(|| {
        const ALIASES: &[(&str, PracticeCategory)] = &[
            // Backend employment_categories.name values
            ("academic_medicine", PracticeCategory::Academia),
            ("hospital_based", PracticeCategory::Hospital),
            ("private_practice", PracticeCategory::PrivatePractice),
            ("research", PracticeCategory::Research),
            // Display keys
            ("academia", PracticeCategory::Academia),
            ("hospital", PracticeCategory::Hospital),
            // Display names
            ("Academic Medicine", PracticeCategory::Academia),
            ("Hospital-Based", PracticeCategory::Hospital),
            ("Hospital Practice", PracticeCategory::Hospital),
            ("Private", PracticeCategory::PrivatePractice),
        ];

        let mut map = HashMap::with_capacity(ALIASES.len());
        for (alias, category) in ALIASES {
            map.insert(normalize_alias(alias), *category);
        }
        map
    })
}
