//! Pure transforms from a [`MetricsSnapshot`] to markup.

use crate::html::DomId;
use crate::metrics::snapshot::{MetricsSnapshot, Profile, Window};
use maud::{html, Markup};

pub const PLACEHOLDER: &str = "-";
pub const ERROR_PREFIX: &str = "Metrikler alınamadı";
pub const EMPTY_PROFILES_HINT: &str = "No profiles reported yet.";
pub const EMPTY_WINDOWS_HINT: &str = "No windows reported for this profile.";

pub const PROFILES_TOGGLE_ID: &str = "metrics-profiles-toggle";
pub const PROFILES_PANEL_ID: &str = "metrics-profiles-panel";

pub fn profiles_toggle_id() -> DomId {
    DomId::from_static(PROFILES_TOGGLE_ID)
}

pub fn profiles_panel_id() -> DomId {
    DomId::from_static(PROFILES_PANEL_ID)
}

/// Id of a profile's clickable summary row.
pub fn profile_row_id(fragment: &DomId) -> DomId {
    DomId::prefixed("prof-row-", fragment)
}

/// Id of a profile's lazily built detail body.
pub fn profile_body_id(fragment: &DomId) -> DomId {
    DomId::prefixed("prof-body-", fragment)
}

fn expanded(open: bool) -> &'static str {
    if open { "true" } else { "false" }
}

pub fn badge(ready: bool) -> Markup {
    html! {
        @if ready {
            span class="badge ok" { "✅" }
        } @else {
            span class="badge bad" { "❌" }
        }
    }
}

fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => PLACEHOLDER,
    }
}

fn row(label: &str, value: Markup) -> Markup {
    html! {
        div class="metrics-row" {
            span class="label" { (label) }
            (value)
        }
    }
}

fn value(text: &str) -> Markup {
    html! { span class="value" { (text) } }
}

pub fn ready_ratio(snapshot: &MetricsSnapshot) -> String {
    format!("{}/{} ready", snapshot.prof_ready, snapshot.prof_total)
}

/// The always-visible card: readiness, profile ratio, job counters and the
/// button revealing the profiles panel.
pub fn summary_card(snapshot: &MetricsSnapshot, panel_open: bool) -> Markup {
    html! {
        div class="metrics-card" {
            (row("WhatsApp", badge(snapshot.wa_ready)))
            (row("Profiles", value(&ready_ratio(snapshot))))
            (row("Queued jobs", value(&snapshot.queued_jobs.to_string())))
            (row("Running jobs", value(&snapshot.running_jobs.to_string())))
            (row("Pending targets", value(&snapshot.pending_targets.to_string())))
            button class="btn toggle" id=(profiles_toggle_id()) type="button"
                aria-controls=(profiles_panel_id()) aria-expanded=(expanded(panel_open)) {
                "Profiles"
            }
        }
    }
}

/// Built content of the profiles panel.
///
/// Only the parts that never change after the first reveal are cached here;
/// per-profile expansion state is stitched in by [`profiles_panel`].
#[derive(Debug, Clone)]
pub enum PanelContent {
    Empty,
    /// Summary row content per profile, in snapshot order.
    Accordion(Vec<Markup>),
}

/// Expansion state of one profile body at render time.
#[derive(Debug, Clone, Copy)]
pub struct BodyView<'a> {
    pub fragment: &'a DomId,
    pub visible: bool,
    pub content: Option<&'a Markup>,
}

/// Runs once, on the first reveal of the panel.
pub fn build_profiles_panel(profiles: &[Profile]) -> PanelContent {
    if profiles.is_empty() {
        return PanelContent::Empty;
    }
    PanelContent::Accordion(profiles.iter().map(profile_summary).collect())
}

fn profile_summary(profile: &Profile) -> Markup {
    html! {
        span class="acc-key" { (profile.key) }
        (badge(profile.ready))
        span class="acc-meta" { (profile.windows.len()) " windows" }
    }
}

/// Accordion with one item per profile. Bodies that were never expanded
/// stay empty and hidden.
pub fn profiles_panel(content: &PanelContent, bodies: &[BodyView<'_>]) -> Markup {
    match content {
        PanelContent::Empty => html! {
            div class="hint empty" { (EMPTY_PROFILES_HINT) }
        },
        PanelContent::Accordion(summaries) => html! {
            div class="accordion" {
                @for (summary, body) in summaries.iter().zip(bodies) {
                    @let body_id = profile_body_id(body.fragment);
                    div class="acc-item" {
                        div class="acc-summary" id=(profile_row_id(body.fragment))
                            data-target=(body_id) role="button"
                            aria-expanded=(expanded(body.visible)) {
                            (summary)
                        }
                        div class={(if body.visible { "acc-body" } else { "acc-body hidden" })}
                            id=(body_id) {
                            @if let Some(detail) = body.content {
                                (detail)
                            }
                        }
                    }
                }
            }
        },
    }
}

/// Detail body of one profile, built on first expansion.
pub fn profile_body(profile: &Profile) -> Markup {
    let pid = profile.pid.map(|p| p.to_string());
    html! {
        div class="profile-detail" {
            (row("Ready", badge(profile.ready)))
            (row("Path", value(or_placeholder(profile.path.as_deref()))))
            (row("PID", value(or_placeholder(pid.as_deref()))))
            (row("Last seen", value(or_placeholder(profile.last_seen.as_deref()))))
            div class="subhead" { "Windows" }
            @if profile.windows.is_empty() {
                div class="hint empty" { (EMPTY_WINDOWS_HINT) }
            } @else {
                ul class="window-list" {
                    @for (i, window) in profile.windows.iter().enumerate() {
                        (window_entry(i, window))
                    }
                }
            }
        }
    }
}

/// `index` is 0-based; the fallback title is 1-based.
pub fn window_entry(index: usize, window: &Window) -> Markup {
    let title = match window.title.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => format!("Window {}", index + 1),
    };

    html! {
        li class="window" {
            div class="window-title" { (title) }
            div class="window-url" { (or_placeholder(window.url.as_deref())) }
            (row("WhatsApp", badge(window.wa_ready)))
            (row("Last seen", value(or_placeholder(window.last_seen.as_deref()))))
        }
    }
}

/// The whole dashboard: summary card plus the (possibly unbuilt) panel.
pub fn dashboard(
    snapshot: &MetricsSnapshot,
    panel_visible: bool,
    panel: Option<&PanelContent>,
    bodies: &[BodyView<'_>],
) -> Markup {
    html! {
        div class="metrics-dashboard" {
            (summary_card(snapshot, panel_visible))
            div class={(if panel_visible { "profiles-panel" } else { "profiles-panel hidden" })}
                id=(profiles_panel_id()) {
                @if let Some(content) = panel {
                    (profiles_panel(content, bodies))
                }
            }
        }
    }
}

pub fn error_hint(reason: &str) -> Markup {
    html! {
        div class="hint error" { (ERROR_PREFIX) ": " (reason) }
    }
}

pub fn loading_skeleton() -> Markup {
    html! {
        div class="skeleton" {
            div class="sk-line" {}
            div class="sk-line" {}
            div class="sk-line short" {}
        }
    }
}

/// Wraps region content in the container element.
pub fn live_region(container_id: &DomId, content: Markup) -> Markup {
    html! {
        div class="metrics-shell" id=(container_id) { (content) }
    }
}
