use anyhow::Result;
use std::process;

use pantry_core::matcher::MatchOptions;
use pantry_core::service::PantryService;
use pantry_core::store::SettingsStore;

use super::helpers::{json_error, print_recipe_detail, recipe_table};

pub(crate) fn cmd_search<S: SettingsStore>(
    svc: &PantryService<S>,
    query: &str,
    lenient: bool,
    json: bool,
) -> Result<()> {
    let options = if lenient {
        MatchOptions::lenient()
    } else {
        svc.match_options()
    };
    let cards = svc.search_with(query, options);

    if cards.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found for '{query}'. Try different ingredients!");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else {
        println!("{}", recipe_table(&cards));
    }

    Ok(())
}

pub(crate) fn cmd_list<S: SettingsStore>(svc: &PantryService<S>, json: bool) -> Result<()> {
    let cards = svc.search("");

    if cards.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("The catalog is empty");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else {
        println!("{}", recipe_table(&cards));
    }

    Ok(())
}

pub(crate) fn cmd_show<S: SettingsStore>(
    svc: &PantryService<S>,
    id: i64,
    json: bool,
) -> Result<()> {
    let Some(card) = svc.recipe(id) else {
        if json {
            println!("{}", json_error(&format!("Recipe {id} not found")));
        } else {
            eprintln!("Recipe {id} not found");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&card)?);
    } else {
        print_recipe_detail(&card);
    }

    Ok(())
}
