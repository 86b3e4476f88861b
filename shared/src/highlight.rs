use std::collections::HashSet;

use crate::bridge::BridgeMessage;
use crate::viewing::ViewingContext;

/// What the map frame currently shows as focused and selectable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    selected: Option<String>,
    reachable: HashSet<String>,
    destination: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationRole {
    /// The focused departure station.
    Origin,
    /// The chosen arrival station of a complete route.
    Destination,
    /// Selectable from the current focus.
    Reachable,
    Dimmed,
}

impl StationRole {
    /// How much larger than its base radius a station in this role is drawn.
    pub fn radius_scale(self) -> f64 {
        match self {
            Self::Origin | Self::Destination => FOCUS_RADIUS_SCALE,
            Self::Reachable | Self::Dimmed => 1.0,
        }
    }

    /// Undo this role's scaling on a radius read back from the map.
    pub fn base_radius(self, drawn: f64) -> f64 {
        drawn / self.radius_scale()
    }
}

impl HighlightState {
    pub fn new(selected: Option<String>, reachable: impl IntoIterator<Item = String>) -> Self {
        Self {
            selected: selected.filter(|s| !s.is_empty()),
            reachable: reachable.into_iter().collect(),
            destination: None,
        }
    }

    /// The roles the map page itself painted for `context`: its `from` drawn as
    /// the origin and its `to` as the destination, every other station unscaled.
    pub fn drawn_by_page(context: &ViewingContext) -> Self {
        Self {
            selected: context.from.clone().filter(|s| !s.is_empty()),
            reachable: HashSet::new(),
            destination: context.to.clone().filter(|s| !s.is_empty()),
        }
    }

    /// Replace the whole state from a highlight message. Returns `false` (and
    /// leaves the state alone) for any other message kind.
    pub fn apply(&mut self, message: &BridgeMessage) -> bool {
        match message {
            BridgeMessage::HighlightStations {
                selected,
                reachable,
                destination,
            } => {
                *self = Self::new(selected.clone(), reachable.iter().cloned());
                self.destination = destination.clone().filter(|s| !s.is_empty());
                true
            }
            BridgeMessage::StationClicked { .. } => false,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selectable(&self, name: &str) -> bool {
        self.reachable.contains(name)
    }

    pub fn selectable_count(&self) -> usize {
        self.reachable.len()
    }

    pub fn role_of(&self, name: &str) -> StationRole {
        if self.selected.as_deref() == Some(name) {
            StationRole::Origin
        } else if self.destination.as_deref() == Some(name) {
            StationRole::Destination
        } else if self.reachable.contains(name) {
            StationRole::Reachable
        } else {
            StationRole::Dimmed
        }
    }
}

/// Highlights received by the frame, held until its station circles are known.
#[derive(Debug, Clone, Default)]
pub struct HighlightInbox {
    latest: Option<HighlightState>,
    attached: bool,
}

impl HighlightInbox {
    /// Take in a message. Returns the state to paint when stations are attached.
    pub fn receive(&mut self, message: &BridgeMessage) -> Option<&HighlightState> {
        let mut next = HighlightState::default();
        if !next.apply(message) {
            return None;
        }
        self.latest = Some(next);
        self.paintable()
    }

    /// Stations are now on hand. `published` is the host's last highlight, used
    /// only if no message got here first.
    pub fn attach(&mut self, published: Option<&BridgeMessage>) -> Option<&HighlightState> {
        self.attached = true;
        if self.latest.is_none() {
            if let Some(message) = published {
                let mut next = HighlightState::default();
                if next.apply(message) {
                    self.latest = Some(next);
                }
            }
        }
        self.paintable()
    }

    pub fn latest(&self) -> Option<&HighlightState> {
        self.latest.as_ref()
    }

    fn paintable(&self) -> Option<&HighlightState> {
        if self.attached { self.latest.as_ref() } else { None }
    }
}

/// Circle-marker paint for one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationStyle {
    pub color: &'static str,
    pub fill_color: &'static str,
    pub weight: f64,
    pub radius: f64,
    pub fill_opacity: f64,
}

const STATION_STROKE: &str = "#000000";
const STATION_FILL: &str = "#f27b21";
const ORIGIN_COLOR: &str = "#ffffff";
const DESTINATION_COLOR: &str = "#00ff00";
const FOCUS_RADIUS_SCALE: f64 = 1.4;

impl StationStyle {
    /// `base_radius` is the station's unfocused radius as drawn by the map page.
    pub fn for_role(role: StationRole, base_radius: f64) -> Self {
        match role {
            StationRole::Origin => Self {
                color: ORIGIN_COLOR,
                fill_color: ORIGIN_COLOR,
                weight: 3.0,
                radius: base_radius * role.radius_scale(),
                fill_opacity: 1.0,
            },
            StationRole::Destination => Self {
                color: DESTINATION_COLOR,
                fill_color: DESTINATION_COLOR,
                weight: 3.0,
                radius: base_radius * role.radius_scale(),
                fill_opacity: 1.0,
            },
            StationRole::Reachable => Self {
                color: STATION_STROKE,
                fill_color: STATION_FILL,
                weight: 1.5,
                radius: base_radius,
                fill_opacity: 1.0,
            },
            StationRole::Dimmed => Self {
                color: STATION_STROKE,
                fill_color: STATION_FILL,
                weight: 1.0,
                radius: base_radius,
                fill_opacity: 0.2,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reachable_means_nothing_selectable() {
        let mut state = HighlightState::new(None, vec!["A".to_string()]);
        state.apply(&BridgeMessage::highlight(Some("A"), Vec::new()));
        assert_eq!(state.selectable_count(), 0);
        assert!(!state.is_selectable("A"));
        assert_eq!(state.role_of("B"), StationRole::Dimmed);
    }

    #[test]
    fn highlight_replaces_instead_of_merging() {
        let mut state = HighlightState::default();
        state.apply(&BridgeMessage::highlight(
            Some("A"),
            vec!["B".into(), "C".into()],
        ));
        state.apply(&BridgeMessage::highlight(None, vec!["D".into()]));

        assert_eq!(state.selected(), None);
        assert!(!state.is_selectable("B"));
        assert!(state.is_selectable("D"));
        assert_eq!(state.role_of("A"), StationRole::Dimmed);
    }

    #[test]
    fn click_message_does_not_touch_state() {
        let mut state = HighlightState::new(Some("A".into()), vec!["B".to_string()]);
        let before = state.clone();
        assert!(!state.apply(&BridgeMessage::station_clicked("B")));
        assert_eq!(state, before);
    }

    #[test]
    fn roles_and_styles() {
        let state = HighlightState::new(Some("A".into()), vec!["B".to_string()]);
        assert_eq!(state.role_of("A"), StationRole::Origin);
        assert_eq!(state.role_of("B"), StationRole::Reachable);

        let origin = StationStyle::for_role(StationRole::Origin, 10.0);
        assert_eq!(origin.fill_color, "#ffffff");
        assert!((origin.radius - 14.0).abs() < 1e-9);
        let dimmed = StationStyle::for_role(StationRole::Dimmed, 10.0);
        assert_eq!(dimmed.fill_opacity, 0.2);
    }

    #[test]
    fn destination_outranks_reachable() {
        let mut state = HighlightState::default();
        state.apply(&BridgeMessage::route("A", "B"));
        assert_eq!(state.role_of("A"), StationRole::Origin);
        assert_eq!(state.role_of("B"), StationRole::Destination);
        assert!(state.is_selectable("B"));
        assert_eq!(state.role_of("C"), StationRole::Dimmed);

        let style = StationStyle::for_role(StationRole::Destination, 5.0);
        assert_eq!(style.fill_color, "#00ff00");
        assert_eq!(style.weight, 3.0);
        assert!((style.radius - 7.0).abs() < 1e-9);

        state.apply(&BridgeMessage::highlight(Some("A"), vec!["B".into()]));
        assert_eq!(state.role_of("B"), StationRole::Reachable);
    }

    #[test]
    fn focused_circles_restyle_back_to_their_drawn_size() {
        let page = HighlightState::drawn_by_page(&ViewingContext::live(Some("A"), Some("B")));
        assert_eq!(page.role_of("A"), StationRole::Origin);
        assert_eq!(page.role_of("B"), StationRole::Destination);
        assert_eq!(page.role_of("C").radius_scale(), 1.0);

        // The page draws a 6px station focused at 8.4px.
        let base = page.role_of("A").base_radius(8.4);
        assert!((base - 6.0).abs() < 1e-9);
        let again = StationStyle::for_role(StationRole::Origin, base);
        assert!((again.radius - 8.4).abs() < 1e-9);
        let plain = StationStyle::for_role(StationRole::Reachable, base);
        assert!((plain.radius - 6.0).abs() < 1e-9);
        assert_eq!(page.role_of("C").base_radius(6.0), 6.0);
    }

    #[test]
    fn highlight_before_stations_is_held_until_attach() {
        let mut inbox = HighlightInbox::default();
        assert!(inbox.receive(&BridgeMessage::route("A", "B")).is_none());
        assert_eq!(inbox.latest().and_then(HighlightState::selected), Some("A"));

        let older = BridgeMessage::highlight(Some("Z"), Vec::new());
        let painted = inbox.attach(Some(&older)).expect("held highlight");
        assert_eq!(painted.role_of("B"), StationRole::Destination);

        let painted = inbox.receive(&BridgeMessage::highlight(None, vec!["C".into()]));
        assert_eq!(painted.map(HighlightState::selectable_count), Some(1));
    }

    #[test]
    fn published_highlight_fills_a_quiet_inbox() {
        let mut inbox = HighlightInbox::default();
        assert!(inbox.receive(&BridgeMessage::station_clicked("A")).is_none());
        assert!(inbox.latest().is_none());

        let published = BridgeMessage::highlight(Some("A"), vec!["B".into()]);
        let painted = inbox.attach(Some(&published)).expect("published highlight");
        assert_eq!(painted.role_of("A"), StationRole::Origin);

        let mut empty = HighlightInbox::default();
        assert!(empty.attach(None).is_none());
    }
}
