use crate::models::{Recipe, normalize_ingredient};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Drop tokens that are empty after trimming (`"tomato,,basil"`).
    /// When false they are kept, and since no ingredient is `""` the query matches nothing.
    pub skip_empty_tokens: bool,
}

impl MatchOptions {
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            skip_empty_tokens: true,
        }
    }
}

/// Split a comma-separated ingredient query into trimmed, lower-cased tokens.
///
/// A query that is blank as a whole yields no tokens.
#[must_use]
pub fn normalize_query(query: &str, options: MatchOptions) -> Vec<String> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    query
        .split(',')
        .map(normalize_ingredient)
        .filter(|token| !(options.skip_empty_tokens && token.is_empty()))
        .collect()
}

/// Recipes containing every ingredient named in `query`, in input order.
///
/// A query with no tokens returns the input unchanged.
pub fn find_matches<'a, I>(query: &str, recipes: I, options: MatchOptions) -> Vec<&'a Recipe>
where
    I: IntoIterator<Item = &'a Recipe>,
{
    let tokens = normalize_query(query, options);
    if tokens.is_empty() {
        return recipes.into_iter().collect();
    }
    recipes
        .into_iter()
        .filter(|recipe| tokens.iter().all(|token| recipe.has_ingredient(token)))
        .collect()
}
