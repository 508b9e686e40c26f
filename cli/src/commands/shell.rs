use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

use pantry_core::controller::{Controller, Event, Notice, Renderer};
use pantry_core::models::{Recipe, RecipeCard};
use pantry_core::store::SettingsStore;

use super::helpers::{favorites_table, recipe_table};

const HELP: &str = "\
Commands:
  <ingredients>        search, e.g. tomato, basil (empty line shows everything)
  search [ingredients] same as above
  toggle <id>          add or remove a favorite
  remove <id>          remove a favorite
  favorites            show favorites
  help                 show this help
  quit                 leave the shell";

/// Draws controller output as tables on a terminal (or any writer).
pub(crate) struct TerminalRenderer<W> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    fn line(&mut self, text: &str) {
        // A closed stdout leaves nothing useful to report to
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn show_results(&mut self, cards: &[RecipeCard<'_>]) {
        if cards.is_empty() {
            self.line("No recipes found. Try different ingredients!");
        } else {
            self.line(&recipe_table(cards));
        }
    }

    fn show_favorites(&mut self, favorites: &[&Recipe]) {
        self.line("Favorites:");
        if favorites.is_empty() {
            self.line("No favorite recipes yet.");
        } else {
            self.line(&favorites_table(favorites));
        }
    }

    fn notify(&mut self, notice: &Notice) {
        let text = match notice {
            Notice::FavoriteChanged { id, favorite: true } => {
                format!("Added recipe {id} to favorites")
            }
            Notice::FavoriteChanged {
                id,
                favorite: false,
            } => format!("Removed recipe {id} from favorites"),
            Notice::UnknownRecipe(id) => format!("Warning: no recipe with id {id} in the catalog"),
            Notice::PersistFailed(err) => {
                format!("Warning: {err} (change kept for this session only)")
            }
        };
        self.line(&text);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Event(Event),
    Favorites,
    Help,
    Quit,
}

pub(crate) fn parse_line(line: &str) -> Result<Input> {
    let trimmed = line.trim();
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));

    let input = match word {
        "quit" | "exit" => Input::Quit,
        "help" | "?" => Input::Help,
        "favorites" | "favs" if rest.is_empty() => Input::Favorites,
        "search" => Input::Event(Event::Search(rest.to_string())),
        "toggle" => Input::Event(Event::Toggle(parse_id(rest)?)),
        "remove" => Input::Event(Event::Remove(parse_id(rest)?)),
        _ => Input::Event(Event::Search(line.to_string())),
    };
    Ok(input)
}

fn parse_id(s: &str) -> Result<i64> {
    s.trim()
        .parse()
        .with_context(|| format!("Invalid recipe id: '{}'", s.trim()))
}

/// Run the interactive loop until `quit` or end of input.
pub(crate) fn run_shell<S, I, W>(controller: &mut Controller<S>, input: I, out: W) -> Result<()>
where
    S: SettingsStore,
    I: BufRead,
    W: Write,
{
    let mut renderer = TerminalRenderer::new(out);
    controller.start(&mut renderer);
    renderer.line("Type 'help' for commands.");

    let mut lines = input.lines();
    loop {
        eprint!("pantry> ");
        io::stderr().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;

        match parse_line(&line) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => renderer.line(HELP),
            Ok(Input::Favorites) => {
                let favorites = controller.service().favorite_recipes();
                renderer.show_favorites(&favorites);
            }
            Ok(Input::Event(event)) => controller.handle(event, &mut renderer),
            Err(e) => renderer.line(&format!("Error: {e:#}")),
        }
    }

    Ok(())
}

pub(crate) fn cmd_shell<S: SettingsStore>(controller: &mut Controller<S>) -> Result<()> {
    let stdin = io::stdin();
    run_shell(controller, stdin.lock(), io::stdout())
}
