use crate::models::NutritionTotals;
use crate::shopping::ShoppingNeeds;
use serde::Serialize;

pub const EMPTY_SHOPPING_LIST: &str = "Nothing to buy: every ingredient is in stock.";
pub const EMPTY_NUTRITION: &str =
    "No nutrition data: no recipe ingredient matched the nutrient table.";

/// A shopping need ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingLine {
    pub name: String,
    pub count: u32,
}

/// Sorts shopping needs for display: case-insensitive by name, then by exact
/// spelling so "Egg" and "egg" always appear in the same order.
pub fn sorted_shopping_lines(needs: &ShoppingNeeds) -> Vec<ShoppingLine> {
    let mut lines: Vec<ShoppingLine> = needs
        .iter()
        .map(|(name, count)| ShoppingLine {
            name: name.clone(),
            count: *count,
        })
        .collect();
    lines.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    lines
}

pub fn format_shopping_list(needs: &ShoppingNeeds) -> String {
    if needs.is_empty() {
        return format!("{EMPTY_SHOPPING_LIST}\n");
    }

    let mut output = String::new();
    output.push_str("Shopping List\n");
    output.push_str("-------------\n");
    for line in sorted_shopping_lines(needs) {
        output.push_str(&format!("{} x {}\n", line.count, line.name));
    }
    output
}

pub fn format_nutrition(totals: &NutritionTotals) -> String {
    let Some(shares) = totals.shares() else {
        return format!("{EMPTY_NUTRITION}\n");
    };

    let mut output = String::new();
    output.push_str("Nutrition Totals\n");
    output.push_str("----------------\n");
    for (label, grams, share) in [
        ("Carbohydrates", totals.carbohydrates, shares.carbohydrates),
        ("Protein", totals.protein, shares.protein),
        ("Fat", totals.fat, shares.fat),
    ] {
        output.push_str(&format!("{label:<14}{grams:>9.1} g  ({share:.1}%)\n"));
    }
    output
}
