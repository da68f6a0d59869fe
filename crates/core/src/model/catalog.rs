use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::ItemId;
use crate::model::item::{ItemError, QuizItem, QuizItemDraft};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog must contain at least one item")]
    Empty,

    #[error("duplicate item identifier `{0}`")]
    DuplicateItem(ItemId),

    #[error("item #{index} is invalid: {source}")]
    InvalidItem {
        index: usize,
        #[source]
        source: ItemError,
    },

    #[error("reference total must be finite and > 0, got {0}")]
    InvalidReferenceTotal(f64),
}

/// Unvalidated catalog as read from a file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDraft {
    #[serde(default)]
    pub reference_total: Option<f64>,
    pub items: Vec<QuizItemDraft>,
}

impl CatalogDraft {
    /// # Errors
    ///
    /// Returns `CatalogError` for invalid items, duplicate identifiers, or a bad reference total.
    pub fn validate(self) -> Result<Catalog, CatalogError> {
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| CatalogError::InvalidItem { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = Catalog::new(items)?;
        match self.reference_total {
            Some(total) => catalog.with_reference_total(total),
            None => Ok(catalog),
        }
    }
}

/// Ordered, read-only collection of quiz items.
///
/// Order matters: weighted sampling walks items in catalog order.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<QuizItem>,
    index: HashMap<ItemId, usize>,
    reference_total: Option<f64>,
}

impl Catalog {
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list, or
    /// `CatalogError::DuplicateItem` if two items share an identifier.
    pub fn new(items: Vec<QuizItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if index.insert(item.id().clone(), pos).is_some() {
                return Err(CatalogError::DuplicateItem(item.id().clone()));
            }
        }

        Ok(Self {
            items,
            index,
            reference_total: None,
        })
    }

    /// Sets the total that progress shares are measured against (e.g. world population).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidReferenceTotal` unless `total` is finite and positive.
    pub fn with_reference_total(mut self, total: f64) -> Result<Self, CatalogError> {
        if !total.is_finite() || total <= 0.0 {
            return Err(CatalogError::InvalidReferenceTotal(total));
        }
        self.reference_total = Some(total);
        Ok(self)
    }

    #[must_use]
    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&QuizItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Sum of raw item weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(QuizItem::weight).sum()
    }

    /// Reference total if one was configured, otherwise the sum of weights.
    #[must_use]
    pub fn reference_total(&self) -> f64 {
        self.reference_total
            .unwrap_or_else(|| self.total_weight())
    }
}
