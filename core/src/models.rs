use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl Recipe {
    /// Exact membership test against the (already lower-cased) ingredient list.
    #[must_use]
    pub fn has_ingredient(&self, ingredient: &str) -> bool {
        self.ingredients.iter().any(|i| i == ingredient)
    }
}

/// A recipe annotated with the caller's favorite state, as shown in result views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeCard<'a> {
    #[serde(flatten)]
    pub recipe: &'a Recipe,
    pub favorite: bool,
}

/// Lower-case and trim a single ingredient name.
#[must_use]
pub fn normalize_ingredient(ingredient: &str) -> String {
    ingredient.trim().to_lowercase()
}

pub fn validate_recipe(recipe: &Recipe) -> Result<()> {
    if recipe.id <= 0 {
        bail!(
            "Recipe '{}' has invalid id {}: ids must be positive",
            recipe.name,
            recipe.id
        );
    }
    if recipe.name.trim().is_empty() {
        bail!("Recipe {} has an empty name", recipe.id);
    }
    if recipe.ingredients.iter().any(|i| i.trim().is_empty()) {
        bail!("Recipe {} has a blank ingredient", recipe.id);
    }
    Ok(())
}
