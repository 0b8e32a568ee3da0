//! Shopping-list derivation.
//!
//! Reconciles recipes against an inventory snapshot. The policy is binary:
//! an ingredient with any stock at all is never bought, one with zero stock
//! (or no inventory entry) is bought once per occurrence in the recipes.

use crate::models::{InventoryItem, Recipe};
use crate::normalize::fold_name;
use std::collections::HashMap;

/// Ingredient name as written in a recipe -> number of times it must be bought
pub type ShoppingNeeds = HashMap<String, u32>;

/// Builds the folded-name stock lookup.
///
/// Names that fold to the same key resolve to the last entry in snapshot
/// order.
pub fn stock_lookup(inventory: &[InventoryItem]) -> HashMap<String, u32> {
    inventory
        .iter()
        .map(|item| (fold_name(&item.name), item.quantity))
        .collect()
}

/// Computes which ingredients must be purchased.
///
/// Every occurrence of an ingredient whose folded stock is zero increments the
/// counter keyed by the original spelling, so "Egg" and "egg" in two recipes
/// become two separate entries.
pub fn compute_shopping_needs(recipes: &[Recipe], inventory: &[InventoryItem]) -> ShoppingNeeds {
    let stock = stock_lookup(inventory);
    let mut needs = ShoppingNeeds::new();

    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            let in_stock = stock.get(&fold_name(ingredient)).copied().unwrap_or(0);
            if in_stock == 0 {
                *needs.entry(ingredient.clone()).or_insert(0) += 1;
            }
        }
    }

    log::debug!(
        "Resolved {} shopping needs from {} recipes and {} inventory items",
        needs.len(),
        recipes.len(),
        inventory.len()
    );
    needs
}
