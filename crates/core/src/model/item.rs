use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::{ItemId, ItemIdError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ItemError {
    #[error(transparent)]
    InvalidId(#[from] ItemIdError),

    #[error("weight must be finite and >= 0, got {0}")]
    InvalidWeight(f64),

    #[error("latitude must be within [-90, 90], got {0}")]
    InvalidLatitude(f64),

    #[error("longitude must be within [-180, 180], got {0}")]
    InvalidLongitude(f64),
}

//
// ─── COORDINATES ───────────────────────────────────────────────────────────────
//

/// Point the visualization centers on when an item is focused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    /// # Errors
    ///
    /// Returns `ItemError` if either component is out of range or not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, ItemError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ItemError::InvalidLatitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(ItemError::InvalidLongitude(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

//
// ─── QUIZ ITEM ─────────────────────────────────────────────────────────────────
//

/// Unvalidated item shape as it arrives from a catalog file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuizItemDraft {
    pub id: String,
    pub weight: f64,
    pub coordinates: [f64; 2],
}

impl QuizItemDraft {
    /// # Errors
    ///
    /// Returns `ItemError` if the identifier, weight, or coordinates are invalid.
    pub fn validate(self) -> Result<QuizItem, ItemError> {
        let [lat, lng] = self.coordinates;
        QuizItem::new(ItemId::new(self.id)?, self.weight, Coordinates::new(lat, lng)?)
    }
}

/// One thing the user can be quizzed on.
///
/// `weight` is a population proxy that drives how often the item is drawn.
/// Equality is by identifier only.
#[derive(Debug, Clone)]
pub struct QuizItem {
    id: ItemId,
    weight: f64,
    coordinates: Coordinates,
}

impl QuizItem {
    /// # Errors
    ///
    /// Returns `ItemError::InvalidWeight` for negative, NaN, or infinite weights.
    pub fn new(id: ItemId, weight: f64, coordinates: Coordinates) -> Result<Self, ItemError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ItemError::InvalidWeight(weight));
        }
        Ok(Self {
            id,
            weight,
            coordinates,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

impl PartialEq for QuizItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for QuizItem {}
