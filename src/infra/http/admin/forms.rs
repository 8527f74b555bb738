use serde::Deserialize;

use crate::domain::selection::SelectionSets;

/// Settings form body. Checkbox groups submit one `kinds`/`taxonomies`/
/// `listings` field per checked box; unchecked groups are simply absent.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct SettingsForm {
    pub forgery_token: String,
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub taxonomies: Vec<String>,
    #[serde(default)]
    pub listings: Vec<String>,
}

impl SettingsForm {
    pub fn into_sets(self) -> SelectionSets {
        SelectionSets {
            kinds: self.kinds,
            taxonomies: self.taxonomies,
            listings: self.listings,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ClearCacheForm {
    pub forgery_token: String,
}
