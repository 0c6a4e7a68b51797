//! Live region state and the toggle controller.
//!
//! Sections are built lazily: the first expansion runs the builder and shows
//! the result, later clicks only flip visibility. Built content is held
//! behind an `Arc` so its identity survives any number of toggles.

use crate::error::Result;
use crate::html::{DomId, DomIdAllocator};
use crate::metrics::snapshot::MetricsSnapshot;
use crate::render::{self, BodyView, PanelContent};
use maud::Markup;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// First expansion: content was built and shown.
    Built,
    Shown,
    Hidden,
    /// No listener is attached for the clicked target.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    ProfilesButton,
    ProfileRow(DomId),
}

#[derive(Debug)]
pub struct LazySection<T> {
    content: Option<Arc<T>>,
    visible: bool,
}

impl<T> Default for LazySection<T> {
    fn default() -> Self {
        Self {
            content: None,
            visible: false,
        }
    }
}

impl<T> LazySection<T> {
    pub fn is_built(&self) -> bool {
        self.content.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> Option<&Arc<T>> {
        self.content.as_ref()
    }

    pub fn toggle_with<F>(&mut self, build: F) -> Toggle
    where
        F: FnOnce() -> T,
    {
        match self.content {
            None => {
                self.content = Some(Arc::new(build()));
                self.visible = true;
                Toggle::Built
            }
            Some(_) => {
                self.visible = !self.visible;
                if self.visible {
                    Toggle::Shown
                } else {
                    Toggle::Hidden
                }
            }
        }
    }
}

/// One rendered snapshot plus its expansion state.
#[derive(Debug)]
pub struct Dashboard {
    snapshot: MetricsSnapshot,
    fragments: Vec<DomId>,
    panel: LazySection<PanelContent>,
    bodies: Vec<LazySection<Markup>>,
    // Row id -> profile index. Populated when the panel content is built.
    listeners: HashMap<DomId, usize>,
}

impl Dashboard {
    pub fn new(snapshot: MetricsSnapshot) -> Self {
        let mut ids = DomIdAllocator::new();
        let fragments: Vec<DomId> = snapshot
            .profiles
            .iter()
            .map(|p| ids.allocate(&p.key))
            .collect();
        let bodies = fragments.iter().map(|_| LazySection::default()).collect();

        Self {
            snapshot,
            fragments,
            panel: LazySection::default(),
            bodies,
            listeners: HashMap::new(),
        }
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    pub fn panel(&self) -> &LazySection<PanelContent> {
        &self.panel
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn profile_index(&self, key: &str) -> Option<usize> {
        self.snapshot.profiles.iter().position(|p| p.key == key)
    }

    /// Row id for the first profile with `key`.
    pub fn profile_row(&self, key: &str) -> Option<DomId> {
        self.profile_index(key)
            .map(|i| render::profile_row_id(&self.fragments[i]))
    }

    pub fn profile_section(&self, key: &str) -> Option<&LazySection<Markup>> {
        self.profile_index(key).map(|i| &self.bodies[i])
    }

    pub fn click(&mut self, target: &ClickTarget) -> Toggle {
        match target {
            ClickTarget::ProfilesButton => {
                let profiles = &self.snapshot.profiles;
                let outcome = self
                    .panel
                    .toggle_with(|| render::build_profiles_panel(profiles));
                if outcome == Toggle::Built {
                    self.attach_listeners();
                }
                outcome
            }
            ClickTarget::ProfileRow(row_id) => {
                let Some(&index) = self.listeners.get(row_id) else {
                    log::debug!("No listener attached for {}", row_id);
                    return Toggle::Ignored;
                };
                let profile = &self.snapshot.profiles[index];
                self.bodies[index].toggle_with(|| render::profile_body(profile))
            }
        }
    }

    fn attach_listeners(&mut self) {
        self.listeners = self
            .fragments
            .iter()
            .enumerate()
            .map(|(i, fragment)| (render::profile_row_id(fragment), i))
            .collect();
    }

    pub fn render(&self) -> Markup {
        let bodies: Vec<BodyView<'_>> = self
            .fragments
            .iter()
            .zip(&self.bodies)
            .map(|(fragment, section)| BodyView {
                fragment,
                visible: section.is_visible(),
                content: section.content().map(|c| c.as_ref()),
            })
            .collect();

        render::dashboard(
            &self.snapshot,
            self.panel.is_visible(),
            self.panel.content().map(|c| c.as_ref()),
            &bodies,
        )
    }
}

#[derive(Debug)]
pub enum RegionState {
    Loading,
    Ready(Dashboard),
    Failed(String),
}

/// The container the panel renders into. Every poll outcome replaces its
/// content wholesale.
#[derive(Debug)]
pub struct LiveRegion {
    container_id: DomId,
    state: RegionState,
}

impl LiveRegion {
    pub fn new(container_id: DomId) -> Self {
        Self {
            container_id,
            state: RegionState::Loading,
        }
    }

    pub fn container_id(&self) -> &DomId {
        &self.container_id
    }

    pub fn state(&self) -> &RegionState {
        &self.state
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match &self.state {
            RegionState::Ready(d) => Some(d),
            _ => None,
        }
    }

    pub fn apply(&mut self, outcome: Result<MetricsSnapshot>) {
        match outcome {
            Ok(snapshot) => self.show_snapshot(snapshot),
            Err(e) => self.show_error(&e.to_string()),
        }
    }

    pub fn show_snapshot(&mut self, snapshot: MetricsSnapshot) {
        self.state = RegionState::Ready(Dashboard::new(snapshot));
    }

    pub fn show_error(&mut self, reason: &str) {
        self.state = RegionState::Failed(reason.to_string());
    }

    pub fn click(&mut self, target: &ClickTarget) -> Toggle {
        match &mut self.state {
            RegionState::Ready(dashboard) => dashboard.click(target),
            _ => Toggle::Ignored,
        }
    }

    pub fn render(&self) -> Markup {
        let content = match &self.state {
            RegionState::Loading => render::loading_skeleton(),
            RegionState::Ready(dashboard) => dashboard.render(),
            RegionState::Failed(reason) => render::error_hint(reason),
        };
        render::live_region(&self.container_id, content)
    }

    pub fn to_html(&self) -> String {
        self.render().into_string()
    }
}
