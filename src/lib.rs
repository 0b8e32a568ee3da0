//! Pantry Planner - recipes, inventory and shopping lists
//!
//! Keeps recipes and kitchen stock in a local SQLite database, derives the
//! shopping list from what is out of stock and sums macro nutrients across
//! the recipe collection.

pub mod database;
pub mod error;
pub mod formatters;
pub mod io;
pub mod models;
pub mod normalize;
pub mod nutrition;
pub mod shopping;
pub mod validation;
pub mod web;

pub use database::{init_schema, open_database, Snapshot};
pub use error::{PantryError, Result};
pub use formatters::{format_nutrition, format_shopping_list};
pub use models::{InventoryItem, MacroShares, NutrientFact, NutritionTotals, Recipe, RecipeId};
pub use nutrition::{compute_totals, NutrientTable};
pub use shopping::{compute_shopping_needs, ShoppingNeeds};
pub use validation::{InventoryDraft, NewRecipe, RecipeDraft};
