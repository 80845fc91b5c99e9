use strum::Display;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display)]
pub enum InputMode {
    #[default]
    #[strum(serialize = "Tenant")]
    TenantSelect,
    Normal,
    Search,
    Folder,
    Model,
    Match,
    Help,
}

impl InputMode {
    /// Fixed width name for the status bar badge.
    pub fn label(&self) -> String {
        return format!("{:<6}", self.to_string());
    }
}
