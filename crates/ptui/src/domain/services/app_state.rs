use anyhow::Result;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use tokio::sync::mpsc;

use super::Selection;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::Folder;
use crate::domain::models::HelpType;
use crate::domain::models::InputMode;
use crate::domain::models::Model;
use crate::domain::models::ModelMatch;
use crate::domain::models::ModelsQuery;
use crate::domain::models::Tenant;
use crate::domain::models::TextField;
use crate::infrastructure::logging::LogBuffer;

#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

pub struct AppStateProps {
    pub tenants: Vec<Tenant>,
    pub tenant_id: Option<String>,
    pub log_buffer: LogBuffer,
}

pub struct AppState {
    pub mode: InputMode,
    pub previous_mode: InputMode,
    pub tenants: Vec<Tenant>,
    pub tenant_selection: Selection,
    pub tenant: Option<Tenant>,
    pub search_field: TextField,
    pub folders: Vec<Folder>,
    pub folder_selection: Selection,
    pub models: Vec<Model>,
    pub models_query: Option<ModelsQuery>,
    pub model_selection: Selection,
    pub matches: Vec<ModelMatch>,
    pub matches_for: Option<Model>,
    pub match_selection: Selection,
    pub status_line: String,
    pub status_is_error: bool,
    pub help: Option<HelpType>,
    pub waiting_for_backend: bool,
    pub log_buffer: LogBuffer,
}

impl AppState {
    pub fn new(props: AppStateProps, tx: &mpsc::UnboundedSender<Action>) -> Result<AppState> {
        let mut tenant_selection = Selection::default();
        tenant_selection.set_len(props.tenants.len());

        let mut app_state = AppState {
            mode: InputMode::TenantSelect,
            previous_mode: InputMode::TenantSelect,
            tenants: props.tenants,
            tenant_selection,
            tenant: None,
            search_field: TextField::default(),
            folders: vec![],
            folder_selection: Selection::default(),
            models: vec![],
            models_query: None,
            model_selection: Selection::default(),
            matches: vec![],
            matches_for: None,
            match_selection: Selection::default(),
            status_line: String::new(),
            status_is_error: false,
            help: None,
            waiting_for_backend: false,
            log_buffer: props.log_buffer,
        };

        if let Some(tenant_id) = props.tenant_id.filter(|id| !id.is_empty()) {
            let position = app_state.tenants.iter().position(|t| t.id == tenant_id);
            if let Some(index) = position {
                app_state.tenant_selection.select(index);
                let tenant = app_state.tenants[index].clone();
                app_state.connect_tenant(tenant, tx)?;
            } else {
                tracing::warn!(tenant = tenant_id, "configured tenant is unknown");
                app_state.set_error(&format!(
                    "Unknown tenant '{tenant_id}', please choose one from the list"
                ));
            }
        }

        return Ok(app_state);
    }

    pub fn change_mode(&mut self, mode: InputMode) {
        self.previous_mode = self.mode;
        self.status_line.clear();
        self.status_is_error = false;
        self.mode = mode;

        tracing::debug!("Change mode from {} to {}", self.previous_mode, self.mode);
    }

    pub fn set_status(&mut self, text: &str) {
        self.status_line = text.to_string();
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, text: &str) {
        self.status_line = text.to_string();
        self.status_is_error = true;
    }

    pub fn show_help(&mut self, help_type: HelpType) {
        self.help = Some(help_type);
        self.change_mode(InputMode::Help);
    }

    pub fn hide_help(&mut self) {
        self.help = None;
    }

    pub fn selected_tenant(&self) -> Option<&Tenant> {
        return self.tenant_selection.selected(&self.tenants);
    }

    pub fn selected_folder(&self) -> Option<&Folder> {
        return self.folder_selection.selected(&self.folders);
    }

    pub fn selected_model(&self) -> Option<&Model> {
        return self.model_selection.selected(&self.models);
    }

    /// Applies a key press. Returns true when the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        match self.mode {
            InputMode::TenantSelect => return self.handle_tenant_key(key, tx),
            InputMode::Normal => return self.handle_normal_key(key, tx),
            InputMode::Search => self.handle_search_key(key, tx)?,
            InputMode::Folder => self.handle_folder_key(key, tx)?,
            InputMode::Model => self.handle_model_key(key, tx)?,
            InputMode::Match => self.handle_match_key(key),
            InputMode::Help => {
                if key.code == KeyCode::Esc {
                    let previous_mode = self.previous_mode;
                    self.hide_help();
                    self.change_mode(previous_mode);
                }
            }
        }

        return Ok(false);
    }

    /// Pasted text only goes to the search field, line breaks are dropped.
    pub fn handle_paste(&mut self, text: &str) {
        if self.mode != InputMode::Search {
            return;
        }

        let text = text.replace(['\r', '\n'], "");
        self.search_field.insert_string(&text);
    }

    pub fn handle_scroll(&mut self, up: bool) {
        let selection = match self.mode {
            InputMode::TenantSelect => &mut self.tenant_selection,
            InputMode::Folder => &mut self.folder_selection,
            InputMode::Model => &mut self.model_selection,
            InputMode::Match => &mut self.match_selection,
            _ => return,
        };

        if up {
            selection.up();
        } else {
            selection.down();
        }
    }

    pub fn handle_backend_event(&mut self, event: Event) {
        match event {
            Event::TenantConnected(tenant_id) => {
                if let Some(tenant) = self.active_tenant(&tenant_id) {
                    let text = format!("Connected to {}, loading folders...", tenant.display_name());
                    self.set_status(&text);
                }
            }
            Event::FoldersLoaded(tenant_id, folders) => {
                if self.active_tenant(&tenant_id).is_none() {
                    return;
                }
                self.folder_selection.reset(folders.len());
                self.set_status(&format!("Loaded {} folders", folders.len()));
                self.folders = folders;
                self.waiting_for_backend = false;
            }
            Event::ModelsLoaded(tenant_id, query, models) => {
                if self.active_tenant(&tenant_id).is_none() {
                    return;
                }
                self.model_selection.reset(models.len());
                self.set_status(&format!(
                    "Found {} models for {}",
                    models.len(),
                    query.describe()
                ));
                self.models = models;
                self.models_query = Some(query);
                self.waiting_for_backend = false;
            }
            Event::MatchesLoaded(tenant_id, model, matches) => {
                if self.active_tenant(&tenant_id).is_none() {
                    return;
                }
                self.match_selection.reset(matches.len());
                self.set_status(&format!(
                    "Found {} matches for \"{}\"",
                    matches.len(),
                    model.name
                ));
                self.matches = matches;
                self.matches_for = Some(model);
                self.waiting_for_backend = false;
            }
            Event::BackendError(tenant_id, message) => {
                if !tenant_id.is_empty() && self.active_tenant(&tenant_id).is_none() {
                    return;
                }
                self.set_error(&message);
                self.waiting_for_backend = false;
            }
            _ => {}
        }
    }

    fn active_tenant(&self, tenant_id: &str) -> Option<&Tenant> {
        return self.tenant.as_ref().filter(|tenant| tenant.id == tenant_id);
    }

    fn connect_tenant(&mut self, tenant: Tenant, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        tracing::info!(tenant = tenant.id, url = tenant.url, "selecting tenant");

        self.folders.clear();
        self.folder_selection.reset(0);
        self.models.clear();
        self.models_query = None;
        self.model_selection.reset(0);
        self.matches.clear();
        self.matches_for = None;
        self.match_selection.reset(0);

        let name = tenant.display_name();
        self.tenant = Some(tenant.clone());
        self.waiting_for_backend = true;
        tx.send(Action::SelectTenant(tenant))?;

        self.change_mode(InputMode::Normal);
        self.set_status(&format!("Connecting to {name}..."));

        return Ok(());
    }

    /// Sends a backend request for the active tenant. Returns false when there is none.
    fn request(&mut self, action: Action, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        if self.tenant.is_none() {
            self.set_error("No tenant selected, press <t> to choose one");
            return Ok(false);
        }

        self.waiting_for_backend = true;
        tx.send(action)?;

        return Ok(true);
    }

    fn handle_tenant_key(
        &mut self,
        key: KeyEvent,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('h') => self.show_help(HelpType::Tenant),
            KeyCode::Up => self.tenant_selection.up(),
            KeyCode::Down => self.tenant_selection.down(),
            KeyCode::Home => self.tenant_selection.first(),
            KeyCode::End => self.tenant_selection.last(),
            KeyCode::Enter => {
                if let Some(tenant) = self.selected_tenant().cloned() {
                    self.connect_tenant(tenant, tx)?;
                } else {
                    self.set_error("There are no tenants to connect to");
                }
            }
            KeyCode::Esc => {
                if self.tenant.is_some() {
                    let mode = match self.previous_mode {
                        InputMode::TenantSelect | InputMode::Help => InputMode::Normal,
                        mode => mode,
                    };
                    self.change_mode(mode);
                }
            }
            _ => self.set_status("Press <Enter> to connect, <h> for help or <q> to exit"),
        }

        return Ok(false);
    }

    fn handle_normal_key(
        &mut self,
        key: KeyEvent,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('s') => {
                self.change_mode(InputMode::Search);
                self.set_status("Press <Esc> to return to Normal mode");
            }
            KeyCode::Char('f') => {
                self.change_mode(InputMode::Folder);
                self.set_status("Press <Esc> to return to Normal mode");
            }
            KeyCode::Char('m') => self.change_mode(InputMode::Model),
            KeyCode::Char('c') => self.change_mode(InputMode::Match),
            KeyCode::Char('h') => self.show_help(HelpType::General),
            KeyCode::Char('t') => {
                if let Some(index) = self
                    .tenant
                    .as_ref()
                    .and_then(|active| self.tenants.iter().position(|t| t.id == active.id))
                {
                    self.tenant_selection.select(index);
                }
                self.change_mode(InputMode::TenantSelect);
            }
            KeyCode::Char('r') => self.reload_folders(tx)?,
            _ => {
                tracing::debug!(
                    "Unsupported key binding. Displaying the help message in the statusbar."
                );
                self.set_status("Press <h> for help or <q> to exit");
            }
        }

        return Ok(false);
    }

    fn handle_search_key(
        &mut self,
        key: KeyEvent,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.change_mode(InputMode::Normal),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.search_field.insert_character(c);
            }
            KeyCode::Backspace => self.search_field.backspace(),
            KeyCode::Delete => self.search_field.delete(),
            KeyCode::Left => self.search_field.left(),
            KeyCode::Right => self.search_field.right(),
            KeyCode::Home => self.search_field.home(),
            KeyCode::End => self.search_field.end(),
            KeyCode::Enter => {
                self.change_mode(InputMode::Normal);
                let text = self.search_field.text();
                tracing::debug!("Executing search on \"{}\"...", text);
                if self.request(Action::SearchModels(text.to_string()), tx)? {
                    self.set_status(&format!("Execute search on \"{}\"", text));
                }
            }
            _ => {}
        }

        return Ok(());
    }

    fn handle_folder_key(
        &mut self,
        key: KeyEvent,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.change_mode(InputMode::Normal),
            KeyCode::Char('h') => self.show_help(HelpType::Folder),
            KeyCode::Char('r') => self.reload_folders(tx)?,
            KeyCode::Up => self.folder_selection.up(),
            KeyCode::Down => self.folder_selection.down(),
            KeyCode::Home => self.folder_selection.first(),
            KeyCode::End => self.folder_selection.last(),
            KeyCode::Enter => {
                let Some(folder) = self.selected_folder().cloned() else {
                    self.set_error("No folder selected");
                    return Ok(());
                };

                if self.request(Action::LoadModels(Some(folder.clone())), tx)? {
                    self.change_mode(InputMode::Model);
                    self.set_status(&format!("Loading models of folder \"{}\"...", folder.name));
                }
            }
            _ => {}
        }

        return Ok(());
    }

    fn handle_model_key(
        &mut self,
        key: KeyEvent,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.change_mode(InputMode::Normal),
            KeyCode::Char('h') => self.show_help(HelpType::Model),
            KeyCode::Up => self.model_selection.up(),
            KeyCode::Down => self.model_selection.down(),
            KeyCode::Home => self.model_selection.first(),
            KeyCode::End => self.model_selection.last(),
            KeyCode::Enter | KeyCode::Char('c') => {
                let Some(model) = self.selected_model().cloned() else {
                    self.set_error("No model selected");
                    return Ok(());
                };

                if self.request(Action::LoadMatches(model.clone()), tx)? {
                    self.change_mode(InputMode::Match);
                    self.set_status(&format!("Finding matches for \"{}\"...", model.name));
                }
            }
            _ => {}
        }

        return Ok(());
    }

    fn handle_match_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.change_mode(InputMode::Model),
            KeyCode::Char('h') => self.show_help(HelpType::Match),
            KeyCode::Up => self.match_selection.up(),
            KeyCode::Down => self.match_selection.down(),
            KeyCode::Home => self.match_selection.first(),
            KeyCode::End => self.match_selection.last(),
            _ => {}
        }
    }

    fn reload_folders(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.request(Action::LoadFolders, tx)? {
            self.set_status("Reloading folders...");
        }

        return Ok(());
    }
}
