use crossterm::event::KeyEvent;

use super::Folder;
use super::Model;
use super::ModelMatch;

#[derive(Debug)]
pub enum Event {
    Keyboard(KeyEvent),
    KeyboardCTRLC,
    KeyboardPaste(String),
    UITick,
    UIScrollDown,
    UIScrollUp,
    TenantConnected(String),
    FoldersLoaded(String, Vec<Folder>),
    ModelsLoaded(String, ModelsQuery, Vec<Model>),
    MatchesLoaded(String, Model, Vec<ModelMatch>),
    BackendError(String, String),
}

/// What a model listing was requested for, so the UI can label the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelsQuery {
    Folder(Folder),
    Search(String),
    All,
}

impl ModelsQuery {
    pub fn describe(&self) -> String {
        match self {
            ModelsQuery::Folder(folder) => return format!("folder \"{}\"", folder.name),
            ModelsQuery::Search(text) => return format!("search \"{text}\""),
            ModelsQuery::All => return "all folders".to_string(),
        }
    }
}
