//! Nutrition aggregation over recipe collections.
//!
//! The nutrient table is a fixed resource: either the built-in one shipped in
//! `data/nutrients.json` or a user file with the same layout.

use crate::error::{PantryError, Result};
use crate::models::{NutrientFact, NutritionTotals, Recipe};
use crate::normalize::fold_name;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_NUTRIENTS: &str = include_str!("../data/nutrients.json");
const NUTRIENT_FILE_VERSION: u32 = 1;

/// One row of a nutrient table file
#[derive(Debug, Deserialize, Clone)]
pub struct NutrientEntry {
    pub name: String,
    pub carbohydrates: f64,
    pub protein: f64,
    pub fat: f64,
}

/// Nutrient table file structure
#[derive(Debug, Deserialize)]
struct NutrientFile {
    version: u32,
    nutrients: Vec<NutrientEntry>,
}

/// Nutrient facts keyed by folded ingredient name
#[derive(Debug, Clone, Default)]
pub struct NutrientTable {
    facts: HashMap<String, NutrientFact>,
}

impl NutrientTable {
    /// Build a table from `(name, fact)` pairs. Names are folded on insert;
    /// a later pair overwrites an earlier one with the same folded name.
    pub fn from_facts<I, S>(facts: I) -> Self
    where
        I: IntoIterator<Item = (S, NutrientFact)>,
        S: AsRef<str>,
    {
        Self {
            facts: facts
                .into_iter()
                .map(|(name, fact)| (fold_name(name.as_ref()), fact))
                .collect(),
        }
    }

    /// The table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_NUTRIENTS)
    }

    /// Load a nutrient table file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let table = Self::from_json(&contents)?;
        log::info!(
            "Loaded {} nutrient facts from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse a nutrient table document, rejecting negative or non-finite values
    pub fn from_json(json: &str) -> Result<Self> {
        let file: NutrientFile = serde_json::from_str(json)?;
        if file.version > NUTRIENT_FILE_VERSION {
            return Err(PantryError::Validation(format!(
                "nutrient table version {} is newer than supported version {}",
                file.version, NUTRIENT_FILE_VERSION
            )));
        }

        let mut problems = Vec::new();
        for entry in &file.nutrients {
            if entry.name.trim().is_empty() {
                problems.push("nutrient entry with empty name".to_string());
            }
            for (label, value) in [
                ("carbohydrates", entry.carbohydrates),
                ("protein", entry.protein),
                ("fat", entry.fat),
            ] {
                if !value.is_finite() || value < 0.0 {
                    problems.push(format!("{}: invalid {} value {}", entry.name, label, value));
                }
            }
        }
        if !problems.is_empty() {
            return Err(PantryError::Validation(problems.join("; ")));
        }

        Ok(Self::from_facts(file.nutrients.into_iter().map(|e| {
            (
                e.name.trim().to_string(),
                NutrientFact::new(e.carbohydrates, e.protein, e.fat),
            )
        })))
    }

    /// Look up the fact for an ingredient, folding the name first
    pub fn get(&self, ingredient: &str) -> Option<&NutrientFact> {
        self.facts.get(&fold_name(ingredient))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterate over `(folded name, fact)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NutrientFact)> {
        self.facts.iter().map(|(name, fact)| (name.as_str(), fact))
    }
}

/// Sums the macros of every ingredient occurrence across `recipes`.
///
/// Ingredients missing from the table add nothing. An ingredient listed in
/// five recipes counts five times.
pub fn compute_totals(recipes: &[Recipe], table: &NutrientTable) -> NutritionTotals {
    let mut totals = NutritionTotals::zero();
    let mut unmatched = 0usize;

    for ingredient in recipes.iter().flat_map(|r| r.ingredients.iter()) {
        match table.get(ingredient) {
            Some(fact) => totals += fact,
            None => unmatched += 1,
        }
    }

    log::debug!(
        "Aggregated nutrition over {} recipes ({} ingredients without facts)",
        recipes.len(),
        unmatched
    );
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(ingredients: &[&str]) -> Recipe {
        Recipe {
            id: 1,
            title: "Test".to_string(),
            content: String::new(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn egg_table() -> NutrientTable {
        NutrientTable::from_facts([("egg", NutrientFact::new(0.6, 12.6, 10.6))])
    }

    fn assert_close(actual: NutritionTotals, carbs: f64, protein: f64, fat: f64) {
        assert!((actual.carbohydrates - carbs).abs() < 1e-9, "{actual:?}");
        assert!((actual.protein - protein).abs() < 1e-9, "{actual:?}");
        assert!((actual.fat - fat).abs() < 1e-9, "{actual:?}");
    }

    #[test]
    fn each_occurrence_counts() {
        let totals = compute_totals(&[recipe(&["egg", "egg"])], &egg_table());
        assert_close(totals, 1.2, 25.2, 21.2);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let totals = compute_totals(&[recipe(&["EGG"]), recipe(&["Egg"])], &egg_table());
        assert_close(totals, 1.2, 25.2, 21.2);
    }

    #[test]
    fn unknown_ingredient_is_ignored() {
        let totals = compute_totals(&[recipe(&["unknown-item"])], &egg_table());
        assert_eq!(totals, NutritionTotals::zero());
    }

    #[test]
    fn no_recipes_gives_zero() {
        assert_eq!(compute_totals(&[], &egg_table()), NutritionTotals::zero());
    }

    #[test]
    fn from_facts_folds_and_last_wins() {
        let table = NutrientTable::from_facts([
            ("Milk", NutrientFact::new(1.0, 1.0, 1.0)),
            ("MILK", NutrientFact::new(4.8, 3.4, 3.6)),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("milk"), Some(&NutrientFact::new(4.8, 3.4, 3.6)));
    }

    #[test]
    fn builtin_table_parses() {
        let table = NutrientTable::builtin().unwrap();
        assert!(!table.is_empty());
        let egg = table.get("Egg").unwrap();
        assert!((egg.protein - 12.6).abs() < 1e-9);
    }

    #[test]
    fn from_json_rejects_negative_values() {
        let json = r#"{"version": 1, "nutrients": [
            {"name": "bad", "carbohydrates": -1.0, "protein": 0.0, "fat": 0.0}
        ]}"#;
        let err = NutrientTable::from_json(json).unwrap_err();
        assert!(matches!(err, PantryError::Validation(_)));
        assert!(err.to_string().contains("carbohydrates"));
    }

    #[test]
    fn from_json_trims_entry_names() {
        let json = r#"{"version": 1, "nutrients": [
            {"name": "  Egg ", "carbohydrates": 0.6, "protein": 12.6, "fat": 10.6}
        ]}"#;
        let table = NutrientTable::from_json(json).unwrap();
        assert!(table.get("egg").is_some());
        assert_close(compute_totals(&[recipe(&["Egg"])], &table), 0.6, 12.6, 10.6);
    }

    #[test]
    fn from_json_rejects_newer_version() {
        let err = NutrientTable::from_json(r#"{"version": 2, "nutrients": []}"#).unwrap_err();
        assert!(matches!(err, PantryError::Validation(_)));
        assert!(err.to_string().contains("version 2"));
    }

    #[test]
    fn from_json_rejects_malformed_document() {
        let err = NutrientTable::from_json("{ not json").unwrap_err();
        assert!(matches!(err, PantryError::Parse(_)));
    }
}
