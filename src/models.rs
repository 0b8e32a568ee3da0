use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Store-assigned recipe identifier
pub type RecipeId = i64;

/// A recipe as read from storage.
///
/// `ingredients` keeps the spelling the user typed. Duplicates are allowed and
/// the order is preserved. A payload without an `ingredients` field
/// deserializes to an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

/// One inventory line. `name` is matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: u32,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// Macro nutrients of one reference serving of an ingredient (grams)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientFact {
    pub carbohydrates: f64,
    pub protein: f64,
    pub fat: f64,
}

impl NutrientFact {
    pub fn new(carbohydrates: f64, protein: f64, fat: f64) -> Self {
        Self {
            carbohydrates,
            protein,
            fat,
        }
    }
}

/// Summed macro nutrients across a recipe collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub carbohydrates: f64,
    pub protein: f64,
    pub fat: f64,
}

/// Percentage share of each macro in a [`NutritionTotals`], for pie charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroShares {
    pub carbohydrates: f64,
    pub protein: f64,
    pub fat: f64,
}

impl NutritionTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Total grams across all three macros
    pub fn grams(&self) -> f64 {
        self.carbohydrates + self.protein + self.fat
    }

    /// True when nothing was accumulated. Callers use this to show an
    /// empty-state message instead of an all-zero chart.
    pub fn is_zero(&self) -> bool {
        self.grams() == 0.0
    }

    /// Percentage of the total each macro accounts for.
    ///
    /// Returns `None` for all-zero totals since there is nothing to divide.
    pub fn shares(&self) -> Option<MacroShares> {
        let grams = self.grams();
        if grams <= 0.0 {
            return None;
        }
        Some(MacroShares {
            carbohydrates: self.carbohydrates / grams * 100.0,
            protein: self.protein / grams * 100.0,
            fat: self.fat / grams * 100.0,
        })
    }
}

impl AddAssign<&NutrientFact> for NutritionTotals {
    fn add_assign(&mut self, fact: &NutrientFact) {
        self.carbohydrates += fact.carbohydrates;
        self.protein += fact.protein;
        self.fat += fact.fat;
    }
}

impl Add for NutritionTotals {
    type Output = NutritionTotals;

    fn add(self, other: NutritionTotals) -> NutritionTotals {
        NutritionTotals {
            carbohydrates: self.carbohydrates + other.carbohydrates,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
        }
    }
}

impl std::iter::Sum for NutritionTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutritionTotals::zero(), |acc, t| acc + t)
    }
}
