use anyhow::Result;
use serde::Serialize;
use std::process;

use pantry_core::models::Recipe;
use pantry_core::service::PantryService;
use pantry_core::store::SettingsStore;

use super::helpers::favorites_table;

#[derive(Serialize)]
struct FavoriteChange {
    id: i64,
    favorite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

pub(crate) fn cmd_favorites_list<S: SettingsStore>(
    svc: &PantryService<S>,
    json: bool,
) -> Result<()> {
    let recipes = svc.favorite_recipes();

    let Some(output) = favorites_output(&recipes, json)? else {
        if json {
            println!("[]");
        } else {
            eprintln!("No favorite recipes yet.");
        }
        process::exit(2);
    };

    println!("{output}");
    Ok(())
}

/// Rendered `favorites list` output, or `None` when there is nothing to show
/// in either format.
fn favorites_output(recipes: &[&Recipe], json: bool) -> Result<Option<String>> {
    if recipes.is_empty() {
        return Ok(None);
    }
    let output = if json {
        serde_json::to_string_pretty(recipes)?
    } else {
        favorites_table(recipes)
    };
    Ok(Some(output))
}

pub(crate) fn cmd_favorite_toggle<S: SettingsStore>(
    svc: &mut PantryService<S>,
    id: i64,
    json: bool,
) -> Result<()> {
    warn_if_unknown(svc, id, json);
    let favorite = svc.toggle_favorite(id);
    report(svc, id, favorite, json)
}

pub(crate) fn cmd_favorite_add<S: SettingsStore>(
    svc: &mut PantryService<S>,
    id: i64,
    json: bool,
) -> Result<()> {
    warn_if_unknown(svc, id, json);
    svc.add_favorite(id);
    report(svc, id, true, json)
}

pub(crate) fn cmd_favorite_remove<S: SettingsStore>(
    svc: &mut PantryService<S>,
    id: i64,
    json: bool,
) -> Result<()> {
    svc.remove_favorite(id);
    report(svc, id, false, json)
}

fn warn_if_unknown<S: SettingsStore>(svc: &PantryService<S>, id: i64, json: bool) {
    if !json && !svc.catalog().contains(id) {
        eprintln!("Warning: no recipe with id {id} in the catalog");
    }
}

fn report<S: SettingsStore>(
    svc: &mut PantryService<S>,
    id: i64,
    favorite: bool,
    json: bool,
) -> Result<()> {
    let warning = svc.take_write_error().map(|e| e.to_string());

    if json {
        let change = FavoriteChange {
            id,
            favorite,
            warning,
        };
        println!("{}", serde_json::to_string_pretty(&change)?);
        return Ok(());
    }

    if let Some(warning) = warning {
        eprintln!("Warning: {warning} (change kept for this run only)");
    }
    let name = svc
        .catalog()
        .get(id)
        .map_or_else(|| format!("Recipe {id}"), |r| r.name.clone());
    if favorite {
        println!("Added {name} to favorites");
    } else {
        println!("Removed {name} from favorites");
    }
    Ok(())
}
