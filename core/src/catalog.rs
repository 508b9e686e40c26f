use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::models::{Recipe, normalize_ingredient, validate_recipe};

/// The read-only set of recipes known for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    /// Build a catalog, normalizing ingredients and rejecting duplicate or invalid ids.
    pub fn new(recipes: Vec<Recipe>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(recipes.len());
        let mut normalized = Vec::with_capacity(recipes.len());
        for mut recipe in recipes {
            validate_recipe(&recipe)?;
            if !seen.insert(recipe.id) {
                bail!("Duplicate recipe id {} in catalog", recipe.id);
            }
            recipe.ingredients = recipe
                .ingredients
                .iter()
                .map(|i| normalize_ingredient(i))
                .collect();
            normalized.push(recipe);
        }
        Ok(Self {
            recipes: normalized,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let recipes: Vec<Recipe> =
            serde_json::from_str(json).context("Catalog must be a JSON array of recipes")?;
        Self::new(recipes)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid catalog file: {}", path.display()))
    }

    /// The recipes shipped with pantry.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            recipes: builtin_recipes(),
        }
    }

    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn recipe(id: i64, name: &str, ingredients: &[&str], description: &str, image: &str) -> Recipe {
    Recipe {
        id,
        name: name.to_string(),
        ingredients: ingredients.iter().map(|i| (*i).to_string()).collect(),
        description: description.to_string(),
        image: image.to_string(),
    }
}

fn builtin_recipes() -> Vec<Recipe> {
    vec![
        recipe(
            1,
            "Margherita Pizza",
            &["tomato", "mozzarella", "basil"],
            "A classic Italian pizza with fresh ingredients.",
            "marg_pizza.jpeg?height=200&width=300",
        ),
        recipe(
            2,
            "Caprese Salad",
            &["tomato", "mozzarella", "basil", "olive oil"],
            "A simple and delicious salad from Capri.",
            "/caprese_salad.jpeg?height=200&width=300",
        ),
        recipe(
            3,
            "Grilled Cheese Sandwich",
            &["bread", "cheese", "butter"],
            "A comforting classic sandwich.",
            "/cheese.jpeg?height=200&width=300",
        ),
        recipe(
            4,
            "Tomato Soup",
            &["tomato", "onion", "garlic", "cream"],
            "A warm and creamy soup perfect for any day.",
            "/tomato.jpeg?height=200&width=300",
        ),
        recipe(
            5,
            "Vegetable Stir Fry",
            &["broccoli", "carrot", "bell pepper", "soy sauce", "garlic"],
            "A quick and healthy vegetable stir fry with Asian flavors.",
            "/stir.jpeg?height=200&width=300",
        ),
        recipe(
            6,
            "Chocolate Chip Cookies",
            &["flour", "butter", "sugar", "chocolate chips", "eggs"],
            "Classic homemade chocolate chip cookies, soft and chewy.",
            "/choco_cookie.jpeg?height=200&width=300",
        ),
        recipe(
            7,
            "Greek Salad",
            &["cucumber", "tomato", "red onion", "feta cheese", "olives"],
            "A refreshing Mediterranean salad with tangy feta cheese.",
            "/greek_salad.jpeg?height=200&width=300",
        ),
        recipe(
            8,
            "Mushroom Risotto",
            &["rice", "mushrooms", "onion", "garlic", "parmesan"],
            "Creamy Italian rice dish with savory mushrooms and parmesan.",
            "/mush.jpeg?height=200&width=300",
        ),
        recipe(
            9,
            "Avocado Toast",
            &["bread", "avocado", "lemon juice", "salt", "red pepper flakes"],
            "A trendy and nutritious breakfast or snack with creamy avocado on toasted bread.",
            "/avo.jpeg?height=200&width=300",
        ),
    ]
}
