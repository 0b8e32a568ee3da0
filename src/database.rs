//! SQLite storage for recipes and inventory
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Ingredient lists are stored as a JSON array in a TEXT column.
//! Inventory names are unique by their folded form, so an upsert of "EGG"
//! updates the row stored as "egg" and takes over the new spelling.

use crate::error::Result;
use crate::models::{InventoryItem, Recipe, RecipeId};
use crate::normalize::fold_name;
use crate::validation::NewRecipe;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result type for database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Recipes and inventory read together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub recipes: Vec<Recipe>,
    pub inventory: Vec<InventoryItem>,
}

/// Opens (or creates) the database at `path` and initialises the schema.
///
/// The parent directory is created if it does not exist yet.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            log::info!("Created directory: {}", parent.display());
        }
    }
    let conn = Connection::open(path)?;
    log::info!("Opened database: {}", path.display());
    init_schema(&conn)?;
    Ok(conn)
}

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `recipes`: title, free-text content and the ingredient list
/// - `inventory`: stock per ingredient, one row per folded name
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            ingredients TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- name_key holds the folded name and is the identity of an item
        CREATE TABLE IF NOT EXISTS inventory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL UNIQUE,
            quantity INTEGER NOT NULL CHECK (quantity >= 0),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

fn encode_ingredients(ingredients: &[String]) -> DbResult<String> {
    serde_json::to_string(ingredients)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Decodes a stored ingredient list. Anything unreadable becomes an empty list.
fn decode_ingredients(id: RecipeId, raw: &str) -> Vec<String> {
    match serde_json::from_str(raw) {
        Ok(ingredients) => ingredients,
        Err(e) => {
            log::warn!(
                "Recipe {} has malformed ingredient data ({}), treating as empty",
                id,
                e
            );
            Vec::new()
        }
    }
}

fn recipe_from_row(row: &Row<'_>) -> DbResult<Recipe> {
    let id: RecipeId = row.get(0)?;
    let raw: Option<String> = row.get(3)?;
    Ok(Recipe {
        id,
        title: row.get(1)?,
        content: row.get(2)?,
        ingredients: raw
            .map(|raw| decode_ingredients(id, &raw))
            .unwrap_or_default(),
    })
}

// ── Recipes ────────────────────────────────────────────────────────────────

/// Insert a validated recipe and return it with its assigned id
pub fn create_recipe(conn: &Connection, recipe: &NewRecipe) -> DbResult<Recipe> {
    conn.execute(
        "INSERT INTO recipes (title, content, ingredients) VALUES (?1, ?2, ?3)",
        params![
            recipe.title(),
            recipe.content(),
            encode_ingredients(recipe.ingredients())?
        ],
    )?;
    let id = conn.last_insert_rowid();
    log::info!("Created recipe {} '{}'", id, recipe.title());

    Ok(Recipe {
        id,
        title: recipe.title().to_string(),
        content: recipe.content().to_string(),
        ingredients: recipe.ingredients().to_vec(),
    })
}

/// Replace a recipe's fields. Returns `None` if no recipe has this id.
pub fn update_recipe(
    conn: &Connection,
    id: RecipeId,
    recipe: &NewRecipe,
) -> DbResult<Option<Recipe>> {
    let changed = conn.execute(
        "UPDATE recipes
         SET title = ?1, content = ?2, ingredients = ?3, updated_at = datetime('now')
         WHERE id = ?4",
        params![
            recipe.title(),
            recipe.content(),
            encode_ingredients(recipe.ingredients())?,
            id
        ],
    )?;

    if changed == 0 {
        return Ok(None);
    }
    log::info!("Updated recipe {} '{}'", id, recipe.title());
    get_recipe(conn, id)
}

/// Delete a recipe. Returns whether a row was removed.
pub fn delete_recipe(conn: &Connection, id: RecipeId) -> DbResult<bool> {
    let removed = conn.execute("DELETE FROM recipes WHERE id = ?1", params![id])? > 0;
    if removed {
        log::info!("Deleted recipe {}", id);
    }
    Ok(removed)
}

pub fn get_recipe(conn: &Connection, id: RecipeId) -> DbResult<Option<Recipe>> {
    conn.query_row(
        "SELECT id, title, content, ingredients FROM recipes WHERE id = ?1",
        params![id],
        recipe_from_row,
    )
    .optional()
}

/// All recipes in creation order
pub fn list_recipes(conn: &Connection) -> DbResult<Vec<Recipe>> {
    let mut stmt =
        conn.prepare("SELECT id, title, content, ingredients FROM recipes ORDER BY id ASC")?;
    let recipes = stmt
        .query_map([], recipe_from_row)?
        .collect::<DbResult<Vec<_>>>()?;
    Ok(recipes)
}

pub fn recipe_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))
}

// ── Inventory ──────────────────────────────────────────────────────────────

const UPSERT_INVENTORY: &str = "INSERT INTO inventory (name, name_key, quantity, updated_at)
     VALUES (?1, ?2, ?3, datetime('now'))
     ON CONFLICT(name_key) DO UPDATE SET
         name = excluded.name,
         quantity = excluded.quantity,
         updated_at = excluded.updated_at";

/// Insert or update an inventory item by its folded name
pub fn upsert_inventory_item(conn: &Connection, item: &InventoryItem) -> DbResult<()> {
    conn.execute(
        UPSERT_INVENTORY,
        params![&item.name, fold_name(&item.name), item.quantity],
    )?;
    log::info!("Set inventory '{}' to {}", item.name, item.quantity);
    Ok(())
}

/// Upsert many items in one transaction
pub fn upsert_inventory_items(conn: &mut Connection, items: &[InventoryItem]) -> DbResult<usize> {
    let tx = conn.transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare_cached(UPSERT_INVENTORY)?;
        for item in items {
            stmt.execute(params![&item.name, fold_name(&item.name), item.quantity])?;
            count += 1;
        }
    }
    tx.commit()?;

    log::info!("Upserted {} inventory items", count);
    Ok(count)
}

/// Delete an inventory item, matching the name case-insensitively
pub fn delete_inventory_item(conn: &Connection, name: &str) -> DbResult<bool> {
    let removed = conn.execute(
        "DELETE FROM inventory WHERE name_key = ?1",
        params![fold_name(name)],
    )? > 0;
    if removed {
        log::info!("Deleted inventory item '{}'", name);
    }
    Ok(removed)
}

pub fn get_inventory_item(conn: &Connection, name: &str) -> DbResult<Option<InventoryItem>> {
    conn.query_row(
        "SELECT name, quantity FROM inventory WHERE name_key = ?1",
        params![fold_name(name)],
        |row| {
            Ok(InventoryItem {
                name: row.get(0)?,
                quantity: row.get(1)?,
            })
        },
    )
    .optional()
}

/// All inventory items in insertion order
pub fn list_inventory(conn: &Connection) -> DbResult<Vec<InventoryItem>> {
    let mut stmt = conn.prepare("SELECT name, quantity FROM inventory ORDER BY id ASC")?;
    let items = stmt
        .query_map([], |row| {
            Ok(InventoryItem {
                name: row.get(0)?,
                quantity: row.get(1)?,
            })
        })?
        .collect::<DbResult<Vec<_>>>()?;
    Ok(items)
}

pub fn inventory_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM inventory", [], |row| row.get(0))
}

/// Read recipes and inventory inside one transaction so both lists describe
/// the same moment.
pub fn snapshot(conn: &mut Connection) -> DbResult<Snapshot> {
    let tx = conn.transaction()?;
    let snapshot = Snapshot {
        recipes: list_recipes(&tx)?,
        inventory: list_inventory(&tx)?,
    };
    tx.commit()?;
    Ok(snapshot)
}

/// Write a snapshot in one transaction: recipes are appended with new ids,
/// inventory items are upserted.
pub fn restore_snapshot(
    conn: &mut Connection,
    recipes: &[NewRecipe],
    inventory: &[InventoryItem],
) -> DbResult<(usize, usize)> {
    let tx = conn.transaction()?;
    for recipe in recipes {
        create_recipe(&tx, recipe)?;
    }
    for item in inventory {
        upsert_inventory_item(&tx, item)?;
    }
    tx.commit()?;

    log::info!(
        "Restored {} recipes and {} inventory items",
        recipes.len(),
        inventory.len()
    );
    Ok((recipes.len(), inventory.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RecipeDraft;

    /// Create an in-memory database for testing
    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn new_recipe(title: &str, ingredients: &[&str]) -> NewRecipe {
        RecipeDraft {
            title: title.to_string(),
            content: String::new(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn init_schema_creates_tables() {
        let conn = test_db();
        for table in ["recipes", "inventory"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    params![table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = test_db();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn create_and_get_recipe() {
        let conn = test_db();
        let created = create_recipe(&conn, &new_recipe("Pancakes", &["Egg", "Milk", "Egg"])).unwrap();

        let fetched = get_recipe(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.ingredients, vec!["Egg", "Milk", "Egg"]);
    }

    #[test]
    fn list_recipes_in_creation_order() {
        let conn = test_db();
        create_recipe(&conn, &new_recipe("B", &[])).unwrap();
        create_recipe(&conn, &new_recipe("A", &[])).unwrap();

        let titles: Vec<String> = list_recipes(&conn)
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert_eq!(recipe_count(&conn).unwrap(), 2);
    }

    #[test]
    fn update_recipe_replaces_fields() {
        let conn = test_db();
        let created = create_recipe(&conn, &new_recipe("Soup", &["Onion"])).unwrap();

        let updated = update_recipe(&conn, created.id, &new_recipe("Onion Soup", &["Onion", "Butter"]))
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Onion Soup");
        assert_eq!(updated.ingredients, vec!["Onion", "Butter"]);
    }

    #[test]
    fn update_missing_recipe_returns_none() {
        let conn = test_db();
        assert!(update_recipe(&conn, 42, &new_recipe("X", &[])).unwrap().is_none());
    }

    #[test]
    fn delete_recipe_removes_row() {
        let conn = test_db();
        let created = create_recipe(&conn, &new_recipe("Toast", &["Bread"])).unwrap();

        assert!(delete_recipe(&conn, created.id).unwrap());
        assert!(!delete_recipe(&conn, created.id).unwrap());
        assert!(get_recipe(&conn, created.id).unwrap().is_none());
    }

    #[test]
    fn malformed_ingredient_json_reads_as_empty() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO recipes (title, content, ingredients) VALUES ('Broken', '', 'not json')",
            [],
        )
        .unwrap();

        let recipes = list_recipes(&conn).unwrap();
        assert_eq!(recipes.len(), 1);
        assert!(recipes[0].ingredients.is_empty());
    }

    #[test]
    fn upsert_inventory_is_case_insensitive() {
        let conn = test_db();
        upsert_inventory_item(&conn, &InventoryItem::new("egg", 2)).unwrap();
        upsert_inventory_item(&conn, &InventoryItem::new("EGG", 6)).unwrap();

        assert_eq!(inventory_count(&conn).unwrap(), 1);
        let item = get_inventory_item(&conn, "Egg").unwrap().unwrap();
        assert_eq!(item, InventoryItem::new("EGG", 6));
    }

    #[test]
    fn upsert_inventory_items_in_transaction() {
        let mut conn = test_db();
        let count = upsert_inventory_items(
            &mut conn,
            &[
                InventoryItem::new("Flour", 1),
                InventoryItem::new("Sugar", 0),
                InventoryItem::new("flour", 3),
            ],
        )
        .unwrap();
        assert_eq!(count, 3);

        let items = list_inventory(&conn).unwrap();
        assert_eq!(
            items,
            vec![InventoryItem::new("flour", 3), InventoryItem::new("Sugar", 0)]
        );
    }

    #[test]
    fn delete_inventory_item_matches_any_case() {
        let conn = test_db();
        upsert_inventory_item(&conn, &InventoryItem::new("Olive Oil", 1)).unwrap();

        assert!(delete_inventory_item(&conn, "olive oil").unwrap());
        assert_eq!(inventory_count(&conn).unwrap(), 0);
        assert!(!delete_inventory_item(&conn, "olive oil").unwrap());
    }

    #[test]
    fn negative_quantity_is_rejected_by_schema() {
        let conn = test_db();
        let result = conn.execute(
            "INSERT INTO inventory (name, name_key, quantity) VALUES ('x', 'x', -1)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn snapshot_reads_both_collections() {
        let mut conn = test_db();
        create_recipe(&conn, &new_recipe("Omelette", &["Egg"])).unwrap();
        upsert_inventory_item(&conn, &InventoryItem::new("Egg", 0)).unwrap();

        let snap = snapshot(&mut conn).unwrap();
        assert_eq!(snap.recipes.len(), 1);
        assert_eq!(snap.inventory, vec![InventoryItem::new("Egg", 0)]);
    }

    #[test]
    fn restore_snapshot_appends_and_upserts() {
        let mut conn = test_db();
        upsert_inventory_item(&conn, &InventoryItem::new("Egg", 1)).unwrap();

        let (recipes, items) = restore_snapshot(
            &mut conn,
            &[new_recipe("Omelette", &["Egg"])],
            &[InventoryItem::new("egg", 12), InventoryItem::new("Milk", 1)],
        )
        .unwrap();
        assert_eq!((recipes, items), (1, 2));
        assert_eq!(recipe_count(&conn).unwrap(), 1);
        assert_eq!(inventory_count(&conn).unwrap(), 2);
        assert_eq!(get_inventory_item(&conn, "EGG").unwrap().unwrap().quantity, 12);
    }

    #[test]
    fn open_database_creates_parent_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("pantry.db");

        let conn = open_database(&path).unwrap();
        assert!(path.exists());
        assert_eq!(recipe_count(&conn).unwrap(), 0);
    }
}
