use crate::favorites::PersistError;
use crate::models::{Recipe, RecipeCard};
use crate::service::PantryService;
use crate::store::SettingsStore;

/// User interactions reported by a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Raw text from the ingredients field.
    Search(String),
    Toggle(i64),
    Remove(i64),
}

/// Out-of-band messages for the user. None of them stop the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    FavoriteChanged { id: i64, favorite: bool },
    /// The id is not in the catalog; the favorites set was still updated.
    UnknownRecipe(i64),
    PersistFailed(PersistError),
}

/// Output side of a front end. An empty `show_results` slice is the
/// "no recipes found" state; an empty `show_favorites` slice means none yet.
pub trait Renderer {
    fn show_results(&mut self, cards: &[RecipeCard<'_>]);
    fn show_favorites(&mut self, favorites: &[&Recipe]);
    fn notify(&mut self, notice: &Notice);
}

/// Turns [`Event`]s into service calls and renderer commands.
///
/// Each event is handled to completion, persistence included, before
/// `handle` returns.
pub struct Controller<S> {
    service: PantryService<S>,
    query: String,
}

impl<S: SettingsStore> Controller<S> {
    pub fn new(service: PantryService<S>) -> Self {
        Self {
            service,
            query: String::new(),
        }
    }

    #[must_use]
    pub fn service(&self) -> &PantryService<S> {
        &self.service
    }

    /// The query the result view currently reflects.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Initial screen: the whole catalog and the saved favorites.
    pub fn start<R: Renderer>(&mut self, renderer: &mut R) {
        self.query.clear();
        self.render_results(renderer);
        self.render_favorites(renderer);
    }

    pub fn handle<R: Renderer>(&mut self, event: Event, renderer: &mut R) {
        match event {
            Event::Search(query) => {
                self.query = query;
                self.render_results(renderer);
            }
            Event::Toggle(id) => {
                let favorite = self.service.toggle_favorite(id);
                self.report_mutation(id, favorite, renderer);
                self.render_results(renderer);
                self.render_favorites(renderer);
            }
            Event::Remove(id) => {
                if self.service.remove_favorite(id) {
                    self.report_mutation(id, false, renderer);
                } else {
                    self.report_write_error(renderer);
                }
                self.render_results(renderer);
                self.render_favorites(renderer);
            }
        }
    }

    fn report_mutation<R: Renderer>(&mut self, id: i64, favorite: bool, renderer: &mut R) {
        if !self.service.catalog().contains(id) {
            renderer.notify(&Notice::UnknownRecipe(id));
        }
        renderer.notify(&Notice::FavoriteChanged { id, favorite });
        self.report_write_error(renderer);
    }

    fn report_write_error<R: Renderer>(&mut self, renderer: &mut R) {
        if let Some(err) = self.service.take_write_error() {
            renderer.notify(&Notice::PersistFailed(err));
        }
    }

    fn render_results<R: Renderer>(&self, renderer: &mut R) {
        let cards = self.service.search(&self.query);
        renderer.show_results(&cards);
    }

    fn render_favorites<R: Renderer>(&self, renderer: &mut R) {
        let favorites = self.service.favorite_recipes();
        renderer.show_favorites(&favorites);
    }
}
