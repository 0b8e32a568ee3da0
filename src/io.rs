//! File import and export.
//!
//! - Inventory CSV (`name,quantity` header) for bulk stock updates
//! - JSON backups holding every recipe and inventory item

use crate::database::{restore_snapshot, snapshot, upsert_inventory_items};
use crate::error::{PantryError, Result};
use crate::models::InventoryItem;
use crate::validation::{parse_inventory_fields, InventoryDraft, RecipeDraft};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

const BACKUP_VERSION: u32 = 1;

/// Outcome of a CSV import
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    /// Rows that were valid and written
    pub imported: usize,
    /// Rows rejected (bad quantity, empty name, unreadable)
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct InventoryCsvRow {
    name: String,
    quantity: Option<String>,
}

/// Parses inventory rows from CSV. Invalid rows are skipped with a warning.
///
/// The header must name a `name` column; without it no row could be read,
/// so the whole file is rejected instead.
pub fn parse_inventory_csv<R: Read>(reader: R) -> Result<(Vec<InventoryItem>, ImportStats)> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?;
    if !headers.iter().any(|h| h == "name") {
        return Err(PantryError::Validation(format!(
            "inventory CSV header must contain a 'name' column (found: {})",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut items = Vec::new();
    let mut stats = ImportStats::default();

    for (index, result) in rdr.deserialize::<InventoryCsvRow>().enumerate() {
        let line_num = index + 2; // 1-indexed plus header
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Line {line_num}: unreadable row: {e}");
                stats.skipped += 1;
                continue;
            }
        };

        let quantity = row.quantity.unwrap_or_default();
        match parse_inventory_fields(&row.name, &quantity).and_then(|d| d.validate()) {
            Ok(item) => {
                items.push(item);
                stats.imported += 1;
            }
            Err(e) => {
                log::warn!("Line {line_num}: {e}");
                stats.skipped += 1;
            }
        }
    }

    Ok((items, stats))
}

/// Reads an inventory CSV file from disk
pub fn read_inventory_csv(path: &Path) -> Result<(Vec<InventoryItem>, ImportStats)> {
    let file = File::open(path)?;
    parse_inventory_csv(BufReader::new(file))
}

/// Reads an inventory CSV and upserts every valid row in one transaction
pub fn import_inventory_csv(conn: &mut Connection, path: &Path) -> Result<ImportStats> {
    let (items, stats) = read_inventory_csv(path)?;
    upsert_inventory_items(conn, &items)?;
    log::info!(
        "Imported {} inventory rows from {} ({} skipped)",
        stats.imported,
        path.display(),
        stats.skipped
    );
    Ok(stats)
}

/// On-disk backup layout. Recipe ids are not kept; they are reassigned on
/// import.
#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    pub version: u32,
    #[serde(default)]
    pub exported_at: String,
    #[serde(default)]
    pub recipes: Vec<RecipeDraft>,
    #[serde(default)]
    pub inventory: Vec<InventoryDraft>,
}

/// Writes every recipe and inventory item to `path` as pretty JSON
pub fn export_backup(conn: &mut Connection, path: &Path) -> Result<(usize, usize)> {
    let snap = snapshot(conn)?;
    let backup = Backup {
        version: BACKUP_VERSION,
        exported_at: chrono::Utc::now().to_rfc3339(),
        recipes: snap
            .recipes
            .into_iter()
            .map(|r| RecipeDraft {
                title: r.title,
                content: r.content,
                ingredients: r.ingredients,
            })
            .collect(),
        inventory: snap
            .inventory
            .into_iter()
            .map(|i| InventoryDraft {
                name: i.name,
                quantity: i64::from(i.quantity),
            })
            .collect(),
    };

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &backup)?;

    log::info!(
        "Exported {} recipes and {} inventory items to {}",
        backup.recipes.len(),
        backup.inventory.len(),
        path.display()
    );
    Ok((backup.recipes.len(), backup.inventory.len()))
}

/// Restores a backup file. The whole file is validated first; any invalid
/// entry rejects the import and nothing is written.
pub fn import_backup(conn: &mut Connection, path: &Path) -> Result<(usize, usize)> {
    let file = File::open(path)?;
    let backup: Backup = serde_json::from_reader(BufReader::new(file))?;

    if backup.version > BACKUP_VERSION {
        return Err(PantryError::Validation(format!(
            "backup version {} is newer than supported version {}",
            backup.version, BACKUP_VERSION
        )));
    }

    let mut errors = Vec::new();
    let mut recipes = Vec::with_capacity(backup.recipes.len());
    for (index, draft) in backup.recipes.iter().enumerate() {
        match draft.validate() {
            Ok(recipe) => recipes.push(recipe),
            Err(e) => errors.push(format!("recipe #{}: {}", index + 1, e)),
        }
    }
    let mut inventory = Vec::with_capacity(backup.inventory.len());
    for (index, draft) in backup.inventory.iter().enumerate() {
        match draft.validate() {
            Ok(item) => inventory.push(item),
            Err(e) => errors.push(format!("inventory #{}: {}", index + 1, e)),
        }
    }
    if !errors.is_empty() {
        return Err(PantryError::Validation(errors.join("; ")));
    }

    Ok(restore_snapshot(conn, &recipes, &inventory)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_rows() {
        let csv = "name,quantity\nEgg,12\nMilk , 0\n";
        let (items, stats) = parse_inventory_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            items,
            vec![InventoryItem::new("Egg", 12), InventoryItem::new("Milk", 0)]
        );
        assert_eq!(
            stats,
            ImportStats {
                imported: 2,
                skipped: 0
            }
        );
    }

    #[test]
    fn skips_invalid_rows() {
        let csv = "name,quantity\nEgg,-1\n,3\nFlour,lots\nSugar\nButter,2\n";
        let (items, stats) = parse_inventory_csv(csv.as_bytes()).unwrap();
        assert_eq!(items, vec![InventoryItem::new("Butter", 2)]);
        assert_eq!(stats.imported, 1);
        assert_eq!(stats.skipped, 4);
    }

    #[test]
    fn rejects_file_without_name_column() {
        let err = parse_inventory_csv("Item,Qty\nEgg,12\nMilk,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PantryError::Validation(_)));
        assert!(err.to_string().contains("Item,Qty"));
    }

    #[test]
    fn header_columns_may_be_reordered() {
        let csv = "quantity,name\n4,Egg\n";
        let (items, stats) = parse_inventory_csv(csv.as_bytes()).unwrap();
        assert_eq!(items, vec![InventoryItem::new("Egg", 4)]);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn empty_file_imports_nothing() {
        let (items, stats) = parse_inventory_csv("name,quantity\n".as_bytes()).unwrap();
        assert!(items.is_empty());
        assert_eq!(stats, ImportStats::default());
    }
}
