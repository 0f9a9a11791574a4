/// Modules: ordered groups of activities behind a star threshold.

use serde::Deserialize;

use crate::domain::activity::Activity;

#[derive(Clone, Debug, Deserialize)]
pub struct Module {
    pub title: String,
    pub description: String,
    pub introduction: String,
    /// Short code listing shown with the introduction.
    #[serde(default)]
    pub example_code: Vec<String>,
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub stars_required: u32,
}

impl Module {
    pub fn activity(&self, idx: usize) -> Option<&Activity> {
        self.activities.get(idx)
    }

    pub fn is_unlocked(&self, total_stars: u32) -> bool {
        is_unlocked(self, total_stars)
    }
}

/// Unlock gate. Always derived from the star count, never stored.
pub fn is_unlocked(module: &Module, total_stars: u32) -> bool {
    total_stars >= module.stars_required
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gated(stars_required: u32) -> Module {
        Module {
            title: "Control Flow".into(),
            description: String::new(),
            introduction: String::new(),
            example_code: vec![],
            activities: vec![],
            stars_required,
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let m = gated(2);
        assert!(!m.is_unlocked(0));
        assert!(!m.is_unlocked(1));
        assert!(m.is_unlocked(2));
        assert!(m.is_unlocked(3));
    }

    #[test]
    fn zero_threshold_always_open() {
        assert!(gated(0).is_unlocked(0));
    }

    proptest! {
        #[test]
        fn unlock_is_monotonic(required in 0u32..1000, stars in 0u32..1000, extra in 0u32..1000) {
            let m = gated(required);
            if is_unlocked(&m, stars) {
                prop_assert!(is_unlocked(&m, stars + extra));
            }
        }
    }
}
