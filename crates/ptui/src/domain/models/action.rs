use super::Folder;
use super::Model;
use super::Tenant;

#[derive(Debug, Clone)]
pub enum Action {
    SelectTenant(Tenant),
    LoadFolders,
    LoadModels(Option<Folder>),
    SearchModels(String),
    LoadMatches(Model),
}
