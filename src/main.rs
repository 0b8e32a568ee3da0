//! Pantry Planner CLI
//!
//! Manages recipes and inventory in a local SQLite database and prints the
//! derived shopping list and nutrition report. `serve` exposes the same data
//! over HTTP.

use clap::{Parser, Subcommand};
use pantry_planner::database::{
    create_recipe, delete_inventory_item, delete_recipe, get_recipe, list_inventory,
    list_recipes, snapshot, update_recipe, upsert_inventory_item,
};
use pantry_planner::io::{export_backup, import_backup, import_inventory_csv};
use pantry_planner::{
    compute_shopping_needs, compute_totals, format_nutrition, format_shopping_list,
    open_database, InventoryDraft, NutrientTable, PantryError, RecipeDraft, RecipeId, Result,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Local recipe, inventory and shopping-list manager
#[derive(Parser, Debug)]
#[command(name = "pantry")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// JSON nutrient table to use instead of the built-in one
    #[arg(long)]
    nutrients: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage recipes
    #[command(subcommand)]
    Recipe(RecipeCommand),
    /// Manage inventory
    #[command(subcommand)]
    Inventory(InventoryCommand),
    /// Print what needs to be bought
    Shopping,
    /// Print macro nutrient totals across all recipes
    Nutrition,
    /// Write all recipes and inventory to a JSON backup
    Export { file: PathBuf },
    /// Restore recipes and inventory from a JSON backup
    Import { file: PathBuf },
    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

#[derive(Subcommand, Debug)]
enum RecipeCommand {
    /// Add a recipe
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Ingredient name, repeat for each ingredient
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
    },
    /// List all recipes
    List,
    /// Show one recipe
    Show { id: RecipeId },
    /// Change a recipe; omitted fields keep their value
    Edit {
        id: RecipeId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Replaces the whole ingredient list when given
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
        /// Remove every ingredient
        #[arg(long, conflicts_with = "ingredients")]
        clear_ingredients: bool,
    },
    /// Delete a recipe
    Remove { id: RecipeId },
}

#[derive(Subcommand, Debug)]
enum InventoryCommand {
    /// Set the stock of an item (creates it if needed)
    Set {
        name: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// List inventory
    List,
    /// Delete an item
    Remove { name: String },
    /// Import a `name,quantity` CSV file
    Import { file: PathBuf },
}

/// Returns the default database path: ~/.local/share/pantry_planner/pantry.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pantry_planner")
        .join("pantry.db")
        .to_string_lossy()
        .to_string()
}

fn load_nutrients(path: Option<&Path>) -> Result<NutrientTable> {
    match path {
        Some(path) => NutrientTable::load(path),
        None => NutrientTable::builtin(),
    }
}

#[tokio::main]
async fn main() {
    // Set RUST_LOG to control verbosity, e.g. RUST_LOG=pantry_planner=debug
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let db_path = PathBuf::from(&args.database);
    log::debug!("Database path: {}", db_path.display());
    let mut conn = open_database(&db_path)?;

    match args.command {
        Command::Recipe(cmd) => run_recipe(&conn, cmd)?,
        Command::Inventory(cmd) => run_inventory(&mut conn, cmd)?,
        Command::Shopping => {
            let snap = snapshot(&mut conn)?;
            let needs = compute_shopping_needs(&snap.recipes, &snap.inventory);
            print!("{}", format_shopping_list(&needs));
        }
        Command::Nutrition => {
            let table = load_nutrients(args.nutrients.as_deref())?;
            let recipes = list_recipes(&conn)?;
            print!("{}", format_nutrition(&compute_totals(&recipes, &table)));
        }
        Command::Export { file } => {
            let (recipes, items) = export_backup(&mut conn, &file)?;
            println!(
                "Exported {} recipes and {} inventory items to {}",
                recipes,
                items,
                file.display()
            );
        }
        Command::Import { file } => {
            let (recipes, items) = import_backup(&mut conn, &file)?;
            println!("Imported {} recipes and {} inventory items", recipes, items);
        }
        Command::Serve { addr } => {
            let table = Arc::new(load_nutrients(args.nutrients.as_deref())?);
            let db = Arc::new(Mutex::new(conn));
            pantry_planner::web::serve(db, table, addr).await?;
        }
    }
    Ok(())
}

fn run_recipe(conn: &rusqlite::Connection, cmd: RecipeCommand) -> Result<()> {
    match cmd {
        RecipeCommand::Add {
            title,
            content,
            ingredients,
        } => {
            let recipe = RecipeDraft {
                title,
                content,
                ingredients,
            }
            .validate()?;
            let created = create_recipe(conn, &recipe)?;
            println!("Added recipe {}: {}", created.id, created.title);
        }
        RecipeCommand::List => {
            let recipes = list_recipes(conn)?;
            if recipes.is_empty() {
                println!("No recipes yet.");
            }
            for recipe in recipes {
                println!(
                    "{:>4}  {} ({} ingredients)",
                    recipe.id,
                    recipe.title,
                    recipe.ingredients.len()
                );
            }
        }
        RecipeCommand::Show { id } => {
            let recipe = get_recipe(conn, id)?
                .ok_or_else(|| PantryError::NotFound(format!("recipe {id}")))?;
            println!("{}", recipe.title);
            println!("{}", "-".repeat(recipe.title.chars().count()));
            for ingredient in &recipe.ingredients {
                println!("  - {ingredient}");
            }
            if !recipe.content.trim().is_empty() {
                println!();
                println!("{}", recipe.content);
            }
        }
        RecipeCommand::Edit {
            id,
            title,
            content,
            ingredients,
            clear_ingredients,
        } => {
            let current = get_recipe(conn, id)?
                .ok_or_else(|| PantryError::NotFound(format!("recipe {id}")))?;
            let ingredients = if clear_ingredients {
                Vec::new()
            } else if ingredients.is_empty() {
                current.ingredients
            } else {
                ingredients
            };
            let recipe = RecipeDraft {
                title: title.unwrap_or(current.title),
                content: content.unwrap_or(current.content),
                ingredients,
            }
            .validate()?;
            let updated = update_recipe(conn, id, &recipe)?
                .ok_or_else(|| PantryError::NotFound(format!("recipe {id}")))?;
            println!("Updated recipe {}: {}", updated.id, updated.title);
        }
        RecipeCommand::Remove { id } => {
            if !delete_recipe(conn, id)? {
                return Err(PantryError::NotFound(format!("recipe {id}")));
            }
            println!("Removed recipe {id}");
        }
    }
    Ok(())
}

fn run_inventory(conn: &mut rusqlite::Connection, cmd: InventoryCommand) -> Result<()> {
    match cmd {
        InventoryCommand::Set { name, quantity } => {
            let item = InventoryDraft { name, quantity }.validate()?;
            upsert_inventory_item(conn, &item)?;
            println!("{}: {}", item.name, item.quantity);
        }
        InventoryCommand::List => {
            let items = list_inventory(conn)?;
            if items.is_empty() {
                println!("Inventory is empty.");
            }
            for item in items {
                println!("{:>6}  {}", item.quantity, item.name);
            }
        }
        InventoryCommand::Remove { name } => {
            if !delete_inventory_item(conn, &name)? {
                return Err(PantryError::NotFound(format!("inventory item '{name}'")));
            }
            println!("Removed {name}");
        }
        InventoryCommand::Import { file } => {
            let stats = import_inventory_csv(conn, &file)?;
            println!(
                "Imported {} items ({} rows skipped)",
                stats.imported, stats.skipped
            );
        }
    }
    Ok(())
}
