//! Validation at the storage boundary.
//!
//! Untyped input (CLI arguments, JSON bodies, CSV rows) arrives as drafts and
//! is checked here before it can be written. Nothing downstream re-validates.

use crate::error::{PantryError, Result};
use crate::models::InventoryItem;
use log::warn;
use serde::{Deserialize, Serialize};

/// Recipe fields as submitted, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

/// A recipe that passed validation and can be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    title: String,
    content: String,
    ingredients: Vec<String>,
}

impl NewRecipe {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }
}

impl RecipeDraft {
    /// Checks the draft and returns a storable recipe.
    ///
    /// Title and ingredients are trimmed. Blank ingredient lines are dropped,
    /// duplicates and ordering are kept.
    pub fn validate(&self) -> Result<NewRecipe> {
        let title = self.title.trim();
        if title.is_empty() {
            warn!("Rejected recipe draft: title is empty");
            return Err(PantryError::Validation("recipe title is empty".to_string()));
        }

        let ingredients: Vec<String> = self
            .ingredients
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();

        let dropped = self.ingredients.len() - ingredients.len();
        if dropped > 0 {
            log::debug!("Dropped {} blank ingredient lines from '{}'", dropped, title);
        }

        Ok(NewRecipe {
            title: title.to_string(),
            content: self.content.clone(),
            ingredients,
        })
    }
}

/// Inventory fields as submitted, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryDraft {
    pub name: String,
    pub quantity: i64,
}

impl InventoryDraft {
    pub fn validate(&self) -> Result<InventoryItem> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("inventory name is empty".to_string());
        }

        let quantity = match u32::try_from(self.quantity) {
            Ok(q) => Some(q),
            Err(_) => {
                errors.push(format!(
                    "quantity for '{}' must be a whole number between 0 and {}, got {}",
                    name,
                    u32::MAX,
                    self.quantity
                ));
                None
            }
        };

        match quantity {
            Some(quantity) if errors.is_empty() => Ok(InventoryItem::new(name, quantity)),
            _ => {
                let message = errors.join("; ");
                warn!("Rejected inventory draft: {message}");
                Err(PantryError::Validation(message))
            }
        }
    }
}

/// Parses a textual quantity (CSV cell, CLI argument) into an inventory draft
pub fn parse_inventory_fields(name: &str, quantity: &str) -> Result<InventoryDraft> {
    let quantity = quantity.trim().parse::<i64>().map_err(|_| {
        PantryError::Validation(format!(
            "quantity for '{}' is not a whole number: '{}'",
            name.trim(),
            quantity.trim()
        ))
    })?;
    Ok(InventoryDraft {
        name: name.to_string(),
        quantity,
    })
}
