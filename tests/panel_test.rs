use metrics_panel::html::{is_dom_id, DomId};
use metrics_panel::render::{self, EMPTY_PROFILES_HINT, EMPTY_WINDOWS_HINT};
use metrics_panel::{ClickTarget, Dashboard, Error, LiveRegion, MetricsSnapshot, Toggle};
use serde_json::json;
use std::sync::Arc;

fn snapshot(value: serde_json::Value) -> MetricsSnapshot {
    serde_json::from_value(value).unwrap()
}

fn example() -> MetricsSnapshot {
    snapshot(json!({
        "wa_ready": true,
        "prof_ready": 2,
        "prof_total": 3,
        "queued_jobs": 5,
        "running_jobs": 1,
        "pending_targets": 0,
        "profiles": [{"key": "A", "ready": true, "windows": []}]
    }))
}

fn two_profiles() -> MetricsSnapshot {
    snapshot(json!({
        "wa_ready": false,
        "prof_ready": 1,
        "prof_total": 2,
        "queued_jobs": 0,
        "running_jobs": 0,
        "pending_targets": 3,
        "profiles": [
            {"key": "profile_01", "ready": true, "path": "Browser/profile_01", "pid": 1200,
             "last_seen": "2025-09-17 13:21:11",
             "windows": [
                {"url": "https://web.whatsapp.com/", "wa_ready": true},
                {"title": "Second", "wa_ready": false, "last_seen": "2025-09-17 13:20:00"}
             ]},
            {"key": "profile_02", "ready": false}
        ]
    }))
}

fn region() -> LiveRegion {
    LiveRegion::new(DomId::parse("live-metrics").unwrap())
}

/// Text of every `<tag class="class">...</tag>` leaf in `html`, in order.
fn texts(html: &str, tag: &str, class: &str) -> Vec<String> {
    let open = format!("<{} class=\"{}\">", tag, class);
    html.split(open.as_str())
        .skip(1)
        .map(|rest| rest.split('<').next().unwrap_or_default().to_string())
        .collect()
}

fn row_for(dashboard: &Dashboard, key: &str) -> ClickTarget {
    ClickTarget::ProfileRow(dashboard.profile_row(key).unwrap())
}

fn body_open_tag(id: &str, visible: bool) -> String {
    let class = if visible { "acc-body" } else { "acc-body hidden" };
    format!("<div class=\"{}\" id=\"{}\">", class, id)
}

fn body_is_empty(html: &str, id: &str) -> bool {
    html.contains(&format!("id=\"{}\"></div>", id))
}

#[test]
fn end_to_end_summary_and_profile_expansion() {
    let mut region = region();
    region.show_snapshot(example());

    let html = region.to_html();
    assert!(html.contains("<div class=\"metrics-card\">"));
    assert_eq!(texts(&html, "span", "value"), vec!["2/3 ready", "5", "1", "0"]);
    assert!(html.contains(
        "<div class=\"metrics-row\"><span class=\"label\">WhatsApp</span><span class=\"badge ok\">✅</span></div>"
    ));

    assert_eq!(region.click(&ClickTarget::ProfilesButton), Toggle::Built);
    let row = row_for(region.dashboard().unwrap(), "A");
    assert_eq!(region.click(&row), Toggle::Built);

    let html = region.to_html();
    assert!(html.contains(&body_open_tag("prof-body-A", true)));
    let detail = region
        .dashboard()
        .unwrap()
        .profile_section("A")
        .unwrap()
        .content()
        .unwrap()
        .0
        .clone();
    assert!(detail.contains("<span class=\"badge ok\">✅</span>"));
    assert!(detail.contains(EMPTY_WINDOWS_HINT));
    assert!(html.contains(&detail));
}

#[test]
fn empty_profile_list_renders_hint_without_accordion() {
    let mut region = region();
    region.show_snapshot(snapshot(json!({
        "wa_ready": false, "prof_ready": 0, "prof_total": 0,
        "queued_jobs": 0, "running_jobs": 0, "pending_targets": 0,
        "profiles": []
    })));
    region.click(&ClickTarget::ProfilesButton);

    let html = region.to_html();
    assert!(html.contains(&format!("<div class=\"hint empty\">{}</div>", EMPTY_PROFILES_HINT)));
    assert!(!html.contains("accordion"));
    assert!(!html.contains("acc-item"));
    assert_eq!(region.dashboard().unwrap().listener_count(), 0);
}

#[test]
fn panel_is_not_built_until_first_reveal() {
    let mut region = region();
    region.show_snapshot(two_profiles());

    let html = region.to_html();
    assert!(html.contains(
        "<div class=\"profiles-panel hidden\" id=\"metrics-profiles-panel\"></div>"
    ));
    assert!(html.contains("aria-expanded=\"false\">Profiles</button>"));
    assert!(!html.contains("acc-item"));
    assert!(!region.dashboard().unwrap().panel().is_built());

    region.click(&ClickTarget::ProfilesButton);
    let html = region.to_html();
    assert!(html.contains(
        "<div class=\"profiles-panel\" id=\"metrics-profiles-panel\"><div class=\"accordion\">"
    ));
    assert!(html.contains(&format!(
        "<button class=\"btn toggle\" id=\"{}\" type=\"button\" aria-controls=\"{}\" aria-expanded=\"true\">",
        render::PROFILES_TOGGLE_ID,
        render::PROFILES_PANEL_ID
    )));
}

#[test]
fn panel_content_identity_survives_toggles() {
    let mut dashboard = Dashboard::new(two_profiles());
    dashboard.click(&ClickTarget::ProfilesButton);
    let first = dashboard.panel().content().unwrap().clone();

    for _ in 0..4 {
        dashboard.click(&ClickTarget::ProfilesButton);
    }
    assert!(Arc::ptr_eq(&first, dashboard.panel().content().unwrap()));
    assert!(dashboard.panel().is_visible());
}

#[test]
fn profile_body_is_empty_until_clicked_and_built_once() {
    let mut dashboard = Dashboard::new(two_profiles());
    dashboard.click(&ClickTarget::ProfilesButton);

    let html = dashboard.render().into_string();
    assert!(body_is_empty(&html, "prof-body-profile_01"));
    assert!(!dashboard.profile_section("profile_01").unwrap().is_built());

    let row = row_for(&dashboard, "profile_01");
    assert_eq!(dashboard.click(&row), Toggle::Built);
    let built = dashboard
        .profile_section("profile_01")
        .unwrap()
        .content()
        .unwrap()
        .clone();

    assert_eq!(dashboard.click(&row), Toggle::Hidden);
    assert_eq!(dashboard.click(&row), Toggle::Shown);
    let again = dashboard.profile_section("profile_01").unwrap().content().unwrap();
    assert!(Arc::ptr_eq(&built, again));

    let html = dashboard.render().into_string();
    assert!(!body_is_empty(&html, "prof-body-profile_01"));
    assert!(html.contains("id=\"prof-row-profile_01\" data-target=\"prof-body-profile_01\" role=\"button\" aria-expanded=\"true\""));
    // The other profile is untouched.
    assert!(body_is_empty(&html, "prof-body-profile_02"));
}

#[test]
fn toggle_parity_decides_visibility() {
    for clicks in 1..=6 {
        let mut dashboard = Dashboard::new(two_profiles());
        dashboard.click(&ClickTarget::ProfilesButton);
        let row = row_for(&dashboard, "profile_02");
        for _ in 0..clicks {
            dashboard.click(&row);
        }
        let visible = dashboard.profile_section("profile_02").unwrap().is_visible();
        assert_eq!(visible, clicks % 2 == 1, "after {} clicks", clicks);

        let html = dashboard.render().into_string();
        assert!(
            html.contains(&body_open_tag("prof-body-profile_02", clicks % 2 == 1)),
            "after {} clicks",
            clicks
        );
    }
}

#[test]
fn rows_have_no_listener_before_panel_is_built() {
    let mut dashboard = Dashboard::new(two_profiles());
    let row = row_for(&dashboard, "profile_01");
    assert_eq!(dashboard.click(&row), Toggle::Ignored);
    assert_eq!(dashboard.listener_count(), 0);

    dashboard.click(&ClickTarget::ProfilesButton);
    assert_eq!(dashboard.listener_count(), 2);
    assert_eq!(dashboard.click(&row), Toggle::Built);

    let unknown = ClickTarget::ProfileRow(DomId::parse("prof-nope").unwrap());
    assert_eq!(dashboard.click(&unknown), Toggle::Ignored);
}

#[test]
fn window_without_title_is_labelled_by_position() {
    let mut dashboard = Dashboard::new(two_profiles());
    dashboard.click(&ClickTarget::ProfilesButton);
    let row = row_for(&dashboard, "profile_01");
    dashboard.click(&row);

    let html = dashboard.render().into_string();
    assert_eq!(texts(&html, "div", "window-title"), vec!["Window 1", "Second"]);
    assert_eq!(
        texts(&html, "div", "window-url"),
        vec!["https://web.whatsapp.com/", render::PLACEHOLDER]
    );
}

#[test]
fn missing_profile_fields_render_placeholder() {
    let mut dashboard = Dashboard::new(two_profiles());
    dashboard.click(&ClickTarget::ProfilesButton);
    let row = row_for(&dashboard, "profile_02");
    dashboard.click(&row);

    let body = dashboard
        .profile_section("profile_02")
        .unwrap()
        .content()
        .unwrap()
        .0
        .clone();
    assert_eq!(texts(&body, "span", "value"), vec!["-", "-", "-"]);
}

#[test]
fn failed_poll_replaces_dashboard_entirely() {
    let mut region = region();
    region.show_snapshot(two_profiles());
    region.click(&ClickTarget::ProfilesButton);
    assert!(region.to_html().contains("metrics-card"));

    region.apply(Err(Error::Status(500)));
    assert_eq!(
        region.to_html(),
        "<div class=\"metrics-shell\" id=\"live-metrics\">\
         <div class=\"hint error\">Metrikler alınamadı: HTTP 500</div></div>"
    );
}

#[test]
fn new_snapshot_resets_expansion_state() {
    let mut region = region();
    region.show_snapshot(two_profiles());
    region.click(&ClickTarget::ProfilesButton);
    assert!(region.dashboard().unwrap().panel().is_visible());

    region.apply(Ok(two_profiles()));
    let dashboard = region.dashboard().unwrap();
    assert!(!dashboard.panel().is_built());
    assert!(!dashboard.panel().is_visible());
}

#[test]
fn server_strings_are_escaped_and_ids_sanitized() {
    let mut dashboard = Dashboard::new(snapshot(json!({
        "wa_ready": true, "prof_ready": 1, "prof_total": 1,
        "queued_jobs": 0, "running_jobs": 0, "pending_targets": 0,
        "profiles": [{
            "key": "<img src=x onerror=alert(1)>",
            "ready": true,
            "path": "C:\\\"Browser\"",
            "windows": [{"title": "<b>chat</b>", "url": "https://x.test/?a=1&b=2"}]
        }]
    })));
    dashboard.click(&ClickTarget::ProfilesButton);
    let row = row_for(&dashboard, "<img src=x onerror=alert(1)>");
    assert!(is_dom_id(match &row {
        ClickTarget::ProfileRow(id) => id.as_str(),
        ClickTarget::ProfilesButton => unreachable!(),
    }));
    dashboard.click(&row);

    let html = dashboard.render().into_string();
    assert!(!html.contains("<img"));
    assert!(!html.contains("<b>chat"));
    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    assert!(html.contains("&lt;b&gt;chat&lt;/b&gt;"));
    assert!(html.contains("https://x.test/?a=1&amp;b=2"));
    assert!(html.contains("C:\\&quot;Browser&quot;"));
    assert!(html.contains("id=\"prof-row-_img_src_x_onerror_alert_1__\""));
}

#[test]
fn colliding_keys_get_distinct_ids() {
    let mut dashboard = Dashboard::new(snapshot(json!({
        "wa_ready": true, "prof_ready": 2, "prof_total": 2,
        "queued_jobs": 0, "running_jobs": 0, "pending_targets": 0,
        "profiles": [
            {"key": "team.a", "ready": true},
            {"key": "team a", "ready": false}
        ]
    })));
    dashboard.click(&ClickTarget::ProfilesButton);

    let first = row_for(&dashboard, "team.a");
    let second = row_for(&dashboard, "team a");
    assert_ne!(first, second);

    dashboard.click(&second);
    assert!(!dashboard.profile_section("team.a").unwrap().is_built());
    assert!(dashboard.profile_section("team a").unwrap().is_visible());

    let html = dashboard.render().into_string();
    assert!(body_is_empty(&html, "prof-body-team_a"));
    assert!(html.contains(&body_open_tag("prof-body-team_a-2", true)));
    assert!(!body_is_empty(&html, "prof-body-team_a-2"));
}
