use rand::Rng;

use flagquiz_core::model::{Catalog, MasterySet, QuizItem};

/// Knobs for weighted sampling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionPolicy {
    /// Ceiling on any single item's weight so one populous item cannot dominate.
    /// `None` leaves weights unbounded.
    pub capacity: Option<f64>,
}

impl SelectionPolicy {
    #[must_use]
    pub fn unbounded() -> Self {
        Self { capacity: None }
    }

    #[must_use]
    pub fn capped(capacity: f64) -> Self {
        Self {
            capacity: Some(capacity),
        }
    }

    fn capped_weight(&self, item: &QuizItem) -> f64 {
        match self.capacity {
            Some(cap) => item.weight().min(cap),
            None => item.weight(),
        }
    }
}

/// Outcome of a draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    Item(&'a QuizItem),
    /// Every candidate has zero effective weight.
    Exhausted,
}

impl<'a> Selection<'a> {
    #[must_use]
    pub fn item(self) -> Option<&'a QuizItem> {
        match self {
            Selection::Item(item) => Some(item),
            Selection::Exhausted => None,
        }
    }
}

/// Picks the next item, weighting unmastered items by (capped) weight.
///
/// Mastered items are never returned. When nothing has positive weight left
/// the result is `Selection::Exhausted`.
pub fn pick_next<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    mastered: &MasterySet,
    policy: &SelectionPolicy,
    rng: &mut R,
) -> Selection<'a> {
    weighted_pick(catalog, rng, |item| {
        if mastered.contains(item.id().as_str()) {
            0.0
        } else {
            policy.capped_weight(item)
        }
    })
}

/// Picks by capped weight, ignoring mastery.
pub fn pick_any<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    policy: &SelectionPolicy,
    rng: &mut R,
) -> Selection<'a> {
    weighted_pick(catalog, rng, |item| policy.capped_weight(item))
}

fn weighted_pick<'a, R, F>(catalog: &'a Catalog, rng: &mut R, effective: F) -> Selection<'a>
where
    R: Rng + ?Sized,
    F: Fn(&QuizItem) -> f64,
{
    let weights: Vec<f64> = catalog.items().iter().map(&effective).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Selection::Exhausted;
    }

    let mut x = rng.random::<f64>() * total;
    let mut last_positive = None;
    for (item, weight) in catalog.items().iter().zip(&weights) {
        if *weight <= 0.0 {
            continue;
        }
        x -= weight;
        if x < 0.0 {
            return Selection::Item(item);
        }
        last_positive = Some(item);
    }

    // Rounding can leave x at or just above zero after the last item.
    last_positive.map_or(Selection::Exhausted, Selection::Item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagquiz_core::model::{CatalogDraft, ItemId, QuizItemDraft};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn catalog(items: &[(&str, f64)]) -> Catalog {
        CatalogDraft {
            reference_total: None,
            items: items
                .iter()
                .map(|(id, weight)| QuizItemDraft {
                    id: (*id).to_string(),
                    weight: *weight,
                    coordinates: [0.0, 0.0],
                })
                .collect(),
        }
        .validate()
        .unwrap()
    }

    fn mastered(ids: &[&str]) -> MasterySet {
        ids.iter().map(|id| ItemId::new(*id).unwrap()).collect()
    }

    #[test]
    fn mastered_item_is_never_picked() {
        let catalog = catalog(&[("A", 10.0), ("B", 5.0)]);
        let mastered = mastered(&["A"]);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..500 {
            let pick = pick_next(&catalog, &mastered, &SelectionPolicy::default(), &mut rng);
            assert_eq!(pick.item().unwrap().id().as_str(), "B");
        }
    }

    #[test]
    fn all_mastered_is_exhausted() {
        let catalog = catalog(&[("A", 10.0), ("B", 5.0)]);
        let mastered = mastered(&["A", "B"]);
        let mut rng = StdRng::seed_from_u64(2);

        let pick = pick_next(&catalog, &mastered, &SelectionPolicy::default(), &mut rng);
        assert_eq!(pick, Selection::Exhausted);
    }

    #[test]
    fn zero_weight_catalog_is_exhausted() {
        let catalog = catalog(&[("A", 0.0), ("B", 0.0)]);
        let mut rng = StdRng::seed_from_u64(3);

        let pick = pick_next(&catalog, &MasterySet::new(), &SelectionPolicy::default(), &mut rng);
        assert_eq!(pick, Selection::Exhausted);
    }

    #[test]
    fn zero_weight_items_are_never_picked() {
        let catalog = catalog(&[("A", 0.0), ("B", 3.0), ("C", 0.0)]);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..200 {
            let pick = pick_next(&catalog, &MasterySet::new(), &SelectionPolicy::default(), &mut rng);
            assert_eq!(pick.item().unwrap().id().as_str(), "B");
        }
    }

    #[test]
    fn frequencies_follow_weights() {
        let catalog = catalog(&[("A", 3.0), ("B", 1.0)]);
        let mut rng = StdRng::seed_from_u64(5);
        let mut counts: HashMap<String, u32> = HashMap::new();

        for _ in 0..20_000 {
            let pick = pick_next(&catalog, &MasterySet::new(), &SelectionPolicy::default(), &mut rng);
            *counts
                .entry(pick.item().unwrap().id().to_string())
                .or_default() += 1;
        }

        let share_a = f64::from(counts["A"]) / 20_000.0;
        assert!((share_a - 0.75).abs() < 0.02, "share of A was {share_a}");
    }

    #[test]
    fn capacity_flattens_dominant_item() {
        let catalog = catalog(&[("Big", 1_000.0), ("Small", 10.0)]);
        let policy = SelectionPolicy::capped(10.0);
        let mut rng = StdRng::seed_from_u64(6);
        let mut big = 0_u32;

        for _ in 0..10_000 {
            let pick = pick_next(&catalog, &MasterySet::new(), &policy, &mut rng);
            if pick.item().unwrap().id().as_str() == "Big" {
                big += 1;
            }
        }

        let share_big = f64::from(big) / 10_000.0;
        assert!((share_big - 0.5).abs() < 0.03, "share of Big was {share_big}");
    }

    #[test]
    fn pick_any_ignores_mastery() {
        let catalog = catalog(&[("A", 1.0)]);
        let mut rng = StdRng::seed_from_u64(7);

        let pick = pick_any(&catalog, &SelectionPolicy::default(), &mut rng);
        assert_eq!(pick.item().unwrap().id().as_str(), "A");
    }
}
