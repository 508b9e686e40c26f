use crate::catalog::Catalog;
use crate::favorites::{FavoritesStore, PersistError};
use crate::matcher::{MatchOptions, find_matches};
use crate::models::{Recipe, RecipeCard};
use crate::store::SettingsStore;

/// Application context: the catalog plus the user's favorites.
///
/// Built once at startup and handed to whichever front end is running.
pub struct PantryService<S> {
    catalog: Catalog,
    favorites: FavoritesStore<S>,
    match_options: MatchOptions,
}

impl<S: SettingsStore> PantryService<S> {
    pub fn new(catalog: Catalog, store: S) -> Self {
        Self {
            catalog,
            favorites: FavoritesStore::load(store),
            match_options: MatchOptions::default(),
        }
    }

    #[must_use]
    pub fn with_match_options(mut self, options: MatchOptions) -> Self {
        self.match_options = options;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn match_options(&self) -> MatchOptions {
        self.match_options
    }

    /// Recipes matching `query`, annotated with favorite state.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<RecipeCard<'_>> {
        self.search_with(query, self.match_options)
    }

    #[must_use]
    pub fn search_with(&self, query: &str, options: MatchOptions) -> Vec<RecipeCard<'_>> {
        find_matches(query, self.catalog.recipes(), options)
            .into_iter()
            .map(|recipe| self.card(recipe))
            .collect()
    }

    #[must_use]
    pub fn recipe(&self, id: i64) -> Option<RecipeCard<'_>> {
        self.catalog.get(id).map(|recipe| self.card(recipe))
    }

    #[must_use]
    pub fn is_favorite(&self, id: i64) -> bool {
        self.favorites.is_favorite(id)
    }

    /// Favorite ids in the order they were added, including ids the catalog
    /// no longer knows.
    #[must_use]
    pub fn favorite_ids(&self) -> &[i64] {
        self.favorites.list()
    }

    /// Favorite recipes in the order they were added. Dangling ids are skipped.
    #[must_use]
    pub fn favorite_recipes(&self) -> Vec<&Recipe> {
        self.favorites
            .list()
            .iter()
            .filter_map(|&id| self.catalog.get(id))
            .collect()
    }

    pub fn toggle_favorite(&mut self, id: i64) -> bool {
        self.favorites.toggle(id)
    }

    pub fn add_favorite(&mut self, id: i64) -> bool {
        self.favorites.add(id)
    }

    pub fn remove_favorite(&mut self, id: i64) -> bool {
        self.favorites.remove(id)
    }

    pub fn take_write_error(&mut self) -> Option<PersistError> {
        self.favorites.take_write_error()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        self.favorites.store()
    }

    fn card<'a>(&self, recipe: &'a Recipe) -> RecipeCard<'a> {
        RecipeCard {
            recipe,
            favorite: self.favorites.is_favorite(recipe.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::FAVORITES_KEY;
    use crate::store::MemoryStore;

    fn service() -> PantryService<MemoryStore> {
        PantryService::new(Catalog::builtin(), MemoryStore::new())
    }

    #[test]
    fn test_search_annotates_favorites() {
        let mut svc = service();
        svc.toggle_favorite(2);
        let cards = svc.search("tomato, basil");
        let flags: Vec<(i64, bool)> = cards.iter().map(|c| (c.recipe.id, c.favorite)).collect();
        assert_eq!(flags, [(1, false), (2, true)]);
    }

    #[test]
    fn test_search_uses_configured_options() {
        let strict = service();
        assert!(strict.search("tomato,,basil").is_empty());

        let lenient = service().with_match_options(MatchOptions::lenient());
        assert_eq!(lenient.search("tomato,,basil").len(), 2);
        // Per-call override wins
        assert!(
            lenient
                .search_with("tomato,,basil", MatchOptions::default())
                .is_empty()
        );
    }

    #[test]
    fn test_empty_query_lists_catalog() {
        let svc = service();
        assert_eq!(svc.search("").len(), svc.catalog().len());
    }

    #[test]
    fn test_favorite_recipes_skip_dangling_ids() {
        let store = MemoryStore::new().with_value(FAVORITES_KEY, "[3,99,1]");
        let svc = PantryService::new(Catalog::builtin(), store);
        assert_eq!(svc.favorite_ids(), [3, 99, 1]);
        let names: Vec<&str> = svc
            .favorite_recipes()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, ["Grilled Cheese Sandwich", "Margherita Pizza"]);
    }

    #[test]
    fn test_recipe_lookup() {
        let mut svc = service();
        svc.add_favorite(5);
        let card = svc.recipe(5).unwrap();
        assert_eq!(card.recipe.name, "Vegetable Stir Fry");
        assert!(card.favorite);
        assert!(svc.recipe(404).is_none());
    }

    #[test]
    fn test_mutations_persist_through_store() {
        let mut svc = service();
        svc.toggle_favorite(6);
        svc.add_favorite(1);
        assert!(svc.remove_favorite(6));
        assert!(!svc.remove_favorite(6));
        assert_eq!(
            svc.store().get(FAVORITES_KEY).unwrap().as_deref(),
            Some("[1]")
        );
    }
}
