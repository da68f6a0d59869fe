use flagquiz_core::model::{Catalog, ItemId, MasterySet};

/// Aggregated view of mastery, useful for a progress indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct MasteryProgress {
    /// Catalog items that are mastered.
    pub mastered: usize,
    pub total: usize,
    /// Summed weight of mastered items.
    pub mastered_weight: f64,
    pub reference_total: f64,
}

impl MasteryProgress {
    /// Identifiers in `mastered` that are not in the catalog are not counted.
    #[must_use]
    pub fn compute(catalog: &Catalog, mastered: &MasterySet) -> Self {
        let (count, weight) = catalog
            .items()
            .iter()
            .filter(|item| mastered.contains(item.id().as_str()))
            .fold((0_usize, 0.0_f64), |(count, weight), item| {
                (count + 1, weight + item.weight())
            });

        Self {
            mastered: count,
            total: catalog.len(),
            mastered_weight: weight,
            reference_total: catalog.reference_total(),
        }
    }

    /// Share of the reference total covered by mastered items, in percent.
    #[must_use]
    pub fn weight_percent(&self) -> f64 {
        if self.reference_total > 0.0 {
            100.0 * self.mastered_weight / self.reference_total
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.mastered == self.total
    }
}

/// One entry of the answer list, flagged when already mastered.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerChoice {
    pub id: ItemId,
    pub weight: f64,
    pub mastered: bool,
}

/// Answer list in catalog order, each entry marked with its mastery state.
#[must_use]
pub fn answer_choices(catalog: &Catalog, mastered: &MasterySet) -> Vec<AnswerChoice> {
    catalog
        .items()
        .iter()
        .map(|item| AnswerChoice {
            id: item.id().clone(),
            weight: item.weight(),
            mastered: mastered.contains(item.id().as_str()),
        })
        .collect()
}
