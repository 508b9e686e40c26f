use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use pantry_core::models::{Recipe, RecipeCard};

const FAVORITE_MARK: &str = "★";

pub(crate) fn recipe_table(cards: &[RecipeCard<'_>]) -> String {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Ingredients")]
        ingredients: String,
        #[tabled(rename = "Fav")]
        favorite: &'static str,
    }

    let rows: Vec<RecipeRow> = cards
        .iter()
        .map(|c| RecipeRow {
            id: c.recipe.id,
            name: truncate(&c.recipe.name, 30),
            ingredients: truncate(&c.recipe.ingredients.join(", "), 45),
            favorite: if c.favorite { FAVORITE_MARK } else { "" },
        })
        .collect();

    Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(3)).with(Alignment::center()))
        .to_string()
}

pub(crate) fn favorites_table(recipes: &[&Recipe]) -> String {
    #[derive(Tabled)]
    struct FavoriteRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Description")]
        description: String,
    }

    let rows: Vec<FavoriteRow> = recipes
        .iter()
        .enumerate()
        .map(|(i, r)| FavoriteRow {
            idx: i + 1,
            id: r.id,
            name: truncate(&r.name, 30),
            description: truncate(&r.description, 50),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}

pub(crate) fn print_recipe_detail(card: &RecipeCard<'_>) {
    let recipe = card.recipe;
    let name = &recipe.name;
    let id = recipe.id;
    let marker = if card.favorite { " ★" } else { "" };
    println!("=== {name}{marker} ===");
    println!("  id: {id}");
    if !recipe.description.is_empty() {
        let description = &recipe.description;
        println!("  {description}");
    }
    println!("\n  INGREDIENTS:");
    for ingredient in &recipe.ingredients {
        println!("    {ingredient}");
    }
    if !recipe.image.is_empty() {
        let image = &recipe.image;
        println!("\n  Image: {image}");
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
