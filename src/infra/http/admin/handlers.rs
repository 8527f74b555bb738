use std::error::Error as StdError;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::info;

use crate::application::error::HttpError;
use crate::cache::prefix_for;
use crate::domain::query::KindSpec;
use crate::domain::selection::{SelectionSets, Selector};
use crate::presentation::{admin::views as admin_views, views::render_template_response};

use super::{
    AdminState, auth,
    forms::{ClearCacheForm, SettingsForm},
};

#[derive(Debug, Deserialize)]
pub(super) struct OverviewQuery {
    settings_saved: Option<String>,
    cache_cleared: Option<String>,
}

pub(super) async fn admin_overview(
    State(state): State<AdminState>,
    Query(query): Query<OverviewQuery>,
) -> Response {
    let catalog = match state.engine.catalog().await {
        Ok(catalog) => catalog,
        Err(err) => return admin_error("infra::http::admin::admin_overview.catalog", &err).into_response(),
    };
    let sets = match state.selections.load().await {
        Ok(sets) => sets,
        Err(err) => return admin_error("infra::http::admin::admin_overview.selections", &err).into_response(),
    };
    let summary = match state.stats.summary().await {
        Ok(summary) => summary,
        Err(err) => return admin_error("infra::http::admin::admin_overview.stats", &err).into_response(),
    };
    let uncached = match state.stats.uncached_log().await {
        Ok(log) => log,
        Err(err) => return admin_error("infra::http::admin::admin_overview.uncached", &err).into_response(),
    };

    let mut cached_entries = 0u64;
    let mut groups = Vec::with_capacity(3);
    for (legend, field_name, ids, selected, to_selector) in [
        (
            "Query kinds",
            "kinds",
            &catalog.kinds,
            &sets.kinds,
            Selector::Kind as fn(String) -> Selector,
        ),
        (
            "Taxonomies",
            "taxonomies",
            &catalog.taxonomies,
            &sets.taxonomies,
            Selector::Taxonomy as fn(String) -> Selector,
        ),
        (
            "Listings",
            "listings",
            &catalog.listings,
            &sets.listings,
            Selector::Listing as fn(String) -> Selector,
        ),
    ] {
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let count = match state
                .store
                .count_prefix(&prefix_for(&to_selector(id.clone())))
                .await
            {
                Ok(count) => count,
                Err(err) => return admin_error("infra::http::admin::admin_overview.count", &err).into_response(),
            };
            cached_entries += count;
            entries.push(admin_views::SelectionEntryView {
                id: id.clone(),
                checked: selected.iter().any(|s| s == id),
                cached_entries: count,
            });
        }
        groups.push(admin_views::SelectionGroupView {
            legend,
            field_name,
            entries,
        });
    }

    // Queries for the `any` pseudo-kind cache under their own prefix.
    match state
        .store
        .count_prefix(&prefix_for(&Selector::Kind(KindSpec::ANY.to_string())))
        .await
    {
        Ok(count) => cached_entries += count,
        Err(err) => return admin_error("infra::http::admin::admin_overview.count_any", &err).into_response(),
    }

    let notice = if query.settings_saved.as_deref() == Some("1") {
        Some(admin_views::NoticeView::settings_saved())
    } else if query.cache_cleared.as_deref() == Some("1") {
        Some(admin_views::NoticeView::cache_cleared())
    } else {
        None
    };

    let mut uncached_rows: Vec<admin_views::UncachedRowView> = uncached
        .iter()
        .map(|entry| admin_views::UncachedRowView {
            time: admin_views::format_timestamp(entry.time),
            query: entry.query.clone(),
            params: serde_json::to_string(&entry.params).unwrap_or_default(),
        })
        .collect();
    uncached_rows.reverse();

    let ttl = state.cache_config.ttl();
    let view = admin_views::OverviewContext {
        notice,
        caching_enabled: state.cache_config.enabled,
        ttl_hours_label: format!("{:.1} hours", ttl.as_secs_f64() / 3600.0),
        forgery_token: state.forgery_token.to_string(),
        groups,
        stats: admin_views::StatsView {
            total_queries: summary.total_queries,
            cache_hits: summary.cache_hits,
            cache_misses: summary.cache_misses,
            hit_percentage: admin_views::format_percentage(summary.hit_percentage),
            cached_entries,
            last_cleared: summary.last_cleared.map(admin_views::format_timestamp),
        },
        uncached: uncached_rows,
    };

    render_template_response(admin_views::OverviewTemplate { view }, StatusCode::OK)
}

pub(super) async fn admin_settings_update(
    State(state): State<AdminState>,
    Form(form): Form<SettingsForm>,
) -> Response {
    if let Err(denied) = auth::verify_forgery_token(&state, &form.forgery_token) {
        return denied;
    }

    let catalog = match state.engine.catalog().await {
        Ok(catalog) => catalog,
        Err(err) => return admin_error("infra::http::admin::admin_settings_update.catalog", &err).into_response(),
    };

    match state.selections.save(form.into_sets(), &catalog).await {
        Ok(stored) => {
            info!(
                kinds = stored.kinds.len(),
                taxonomies = stored.taxonomies.len(),
                listings = stored.listings.len(),
                "selection sets updated"
            );
            Redirect::to("/?settings_saved=1").into_response()
        }
        Err(err) => admin_error("infra::http::admin::admin_settings_update.save", &err).into_response(),
    }
}

pub(super) async fn admin_clear_cache(
    State(state): State<AdminState>,
    Form(form): Form<ClearCacheForm>,
) -> Response {
    if let Err(denied) = auth::verify_forgery_token(&state, &form.forgery_token) {
        return denied;
    }

    let sets = match state.selections.load().await {
        Ok(sets) => sets,
        Err(err) => return admin_error("infra::http::admin::admin_clear_cache.selections", &err).into_response(),
    };

    let mut removed = 0u64;
    for prefix in clear_prefixes(&sets) {
        match state.store.delete_prefix(&prefix).await {
            Ok(count) => removed += count,
            Err(err) => return admin_error("infra::http::admin::admin_clear_cache.delete", &err).into_response(),
        }
    }

    if let Err(err) = state.stats.reset(OffsetDateTime::now_utc()).await {
        return admin_error("infra::http::admin::admin_clear_cache.reset", &err).into_response();
    }

    info!(removed, "cache cleared by administrator");
    Redirect::to("/?cache_cleared=1").into_response()
}

/// Prefixes a clear action must delete: one per selected identifier, plus
/// the `any` pseudo-kind prefix whenever any kind is selected (entries
/// cached under it were admitted because the kind list was non-empty).
fn clear_prefixes(sets: &SelectionSets) -> Vec<String> {
    let mut prefixes = Vec::new();
    for kind in &sets.kinds {
        prefixes.push(prefix_for(&Selector::Kind(kind.clone())));
    }
    if !sets.kinds.is_empty() {
        prefixes.push(prefix_for(&Selector::Kind(KindSpec::ANY.to_string())));
    }
    for taxonomy in &sets.taxonomies {
        prefixes.push(prefix_for(&Selector::Taxonomy(taxonomy.clone())));
    }
    for listing in &sets.listings {
        prefixes.push(prefix_for(&Selector::Listing(listing.clone())));
    }
    prefixes
}

fn admin_error(operation: &'static str, err: &dyn StdError) -> HttpError {
    HttpError::from_error(
        operation,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Admin request could not be processed",
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(kinds: &[&str], taxonomies: &[&str], listings: &[&str]) -> SelectionSets {
        SelectionSets {
            kinds: kinds.iter().map(|s| s.to_string()).collect(),
            taxonomies: taxonomies.iter().map(|s| s.to_string()).collect(),
            listings: listings.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn clear_covers_every_selected_identifier() {
        let prefixes = clear_prefixes(&sets(&["products"], &["region"], &["featured"]));
        assert!(prefixes.contains(&"riserva:q:kind=products:".to_string()));
        assert!(prefixes.contains(&"riserva:q:tax=region:".to_string()));
        assert!(prefixes.contains(&"riserva:q:listing=featured:".to_string()));
    }

    #[test]
    fn clear_includes_any_pseudo_kind_only_with_selected_kinds() {
        let with_kinds = clear_prefixes(&sets(&["products"], &[], &[]));
        assert!(with_kinds.contains(&"riserva:q:kind=any:".to_string()));

        let without_kinds = clear_prefixes(&sets(&[], &["region"], &[]));
        assert!(!without_kinds.iter().any(|p| p.contains("kind=any")));
    }
}
