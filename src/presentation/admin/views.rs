//! View models for the admin overview page.

use askama::Template;
use time::OffsetDateTime;
use time::macros::format_description;

#[derive(Clone)]
pub struct NoticeView {
    pub message: &'static str,
}

impl NoticeView {
    pub fn settings_saved() -> Self {
        Self {
            message: "Settings saved.",
        }
    }

    pub fn cache_cleared() -> Self {
        Self {
            message: "Cache cleared.",
        }
    }
}

/// One checkbox row in a selection group. `cached_entries` is the number of
/// live cache entries this identifier currently accounts for.
#[derive(Clone)]
pub struct SelectionEntryView {
    pub id: String,
    pub checked: bool,
    pub cached_entries: u64,
}

/// One of the three allow-list checkbox groups.
#[derive(Clone)]
pub struct SelectionGroupView {
    pub legend: &'static str,
    pub field_name: &'static str,
    pub entries: Vec<SelectionEntryView>,
}

#[derive(Clone)]
pub struct StatsView {
    pub total_queries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hit_percentage: String,
    pub cached_entries: u64,
    pub last_cleared: Option<String>,
}

#[derive(Clone)]
pub struct UncachedRowView {
    pub time: String,
    pub query: String,
    pub params: String,
}

pub struct OverviewContext {
    pub notice: Option<NoticeView>,
    pub caching_enabled: bool,
    pub ttl_hours_label: String,
    pub forgery_token: String,
    pub groups: Vec<SelectionGroupView>,
    pub stats: StatsView,
    pub uncached: Vec<UncachedRowView>,
}

#[derive(Template)]
#[template(path = "admin/overview.html")]
pub struct OverviewTemplate {
    pub view: OverviewContext,
}

pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    timestamp
        .format(&format)
        .unwrap_or_else(|_| timestamp.unix_timestamp().to_string())
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}
