mod favorites;
mod helpers;
mod search;
mod shell;

pub(crate) use favorites::{
    cmd_favorite_add, cmd_favorite_remove, cmd_favorite_toggle, cmd_favorites_list,
};
pub(crate) use search::{cmd_list, cmd_search, cmd_show};
pub(crate) use shell::cmd_shell;
