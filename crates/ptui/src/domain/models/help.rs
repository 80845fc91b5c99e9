const TENANT_HELP: &str = r#"
<Up>/<Down>  Move the selection
<Home>/<End> Jump to the first or last tenant
<Enter>      Connect to the selected tenant
<Esc>        Return to the previous mode, if a tenant is active
<q>          Exit the program
"#;

const GENERAL_HELP: &str = r#"
<q>    Exit the program
<s>    Switch to Search mode
<f>    Switch to Folder mode
<m>    Switch to Model mode
<c>    Switch to Match mode
<t>    Choose another tenant
<r>    Reload the list of folders
<Ctrl+C> Exit from any mode

To exit this help, enter <Esc>.
"#;

const SEARCH_HELP: &str = r#"
<Esc>        Exit to Normal mode
<Backspace>  Delete the previous character
<Delete>     Delete the character under the cursor
<Left>/<Right>/<Home>/<End>  Move the cursor
<Enter>      Execute search
"#;

const FOLDER_HELP: &str = r#"
<Esc>        Exit to Normal mode
<Up>/<Down>  Select a folder
<Enter>      List the models of the selected folder
<r>          Reload the list of folders
"#;

const MODEL_HELP: &str = r#"
<Esc>        Exit to Normal mode
<Up>/<Down>  Select a model
<Enter>/<c>  Find matches for the selected model
"#;

const MATCH_HELP: &str = r#"
<Esc>        Return to Model mode
<Up>/<Down>  Select a match
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpType {
    Tenant,
    General,
    Search,
    Folder,
    Model,
    Match,
}

impl HelpType {
    pub fn text(&self) -> String {
        let text = match self {
            HelpType::Tenant => TENANT_HELP,
            HelpType::General => GENERAL_HELP,
            HelpType::Search => SEARCH_HELP,
            HelpType::Folder => FOLDER_HELP,
            HelpType::Model => MODEL_HELP,
            HelpType::Match => MATCH_HELP,
        };

        return text.trim().to_string();
    }
}
