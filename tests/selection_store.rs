use wbi_atlas::selection::{SelectionStore, Toggle};
use wbi_atlas::{ChartType, DashboardState, Indicator, StateChange};

#[test]
fn toggle_twice_restores_previous_state() {
    let mut store = SelectionStore::new();
    store.toggle("DEU", "Germany");
    let before = store.clone();

    assert_eq!(store.toggle("FRA", "France"), Toggle::Selected);
    assert_eq!(store.toggle("FRA", "France"), Toggle::Deselected);
    assert_eq!(store, before);
}

#[test]
fn codes_stay_unique_and_ordered() {
    let mut store = SelectionStore::new();
    for (code, name) in [("USA", "United States"), ("DEU", "Germany"), ("JPN", "Japan")] {
        store.toggle(code, name);
    }
    store.toggle("DEU", "Germany");
    store.toggle("DEU", "Germany");

    // Re-adding moves the country to the end of the legend.
    assert_eq!(store.codes(), vec!["USA", "JPN", "DEU"]);
    assert_eq!(store.len(), 3);
    assert!(store.contains("JPN"));
    assert!(!store.contains("FRA"));
}

#[test]
fn clear_empties_the_store() {
    let mut store = SelectionStore::new();
    store.toggle("BRA", "Brazil");
    store.toggle("IND", "India");
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.iter().count(), 0);
    assert_eq!(store.toggle("BRA", "Brazil"), Toggle::Selected);
}

#[test]
fn panel_follows_selection() {
    let mut state = DashboardState::default();
    assert!(!state.panel_visible());

    state.toggle_country("DEU", "Germany");
    assert!(state.panel_visible());

    assert_eq!(state.close_panel(), StateChange::PanelClosed);
    assert!(!state.panel_visible());
    assert!(state.is_selected("DEU"), "closing keeps the selection");

    state.open_panel();
    assert!(state.panel_visible());

    state.toggle_country("DEU", "Germany");
    assert!(!state.panel_visible());
}

#[test]
fn only_real_changes_request_a_redraw() {
    let mut state = DashboardState::new(Indicator::Gdp, ChartType::Line);
    let rev = state.revision();

    assert_eq!(state.set_indicator(Indicator::Gdp), StateChange::Unchanged);
    assert_eq!(state.set_chart_type(ChartType::Line), StateChange::Unchanged);
    assert_eq!(state.clear_selection(), StateChange::Unchanged);
    assert_eq!(state.revision(), rev);

    let change = state.set_indicator(Indicator::Inflation);
    assert!(change.needs_redraw());
    assert!(state.revision() > rev);

    state.toggle_country("USA", "United States");
    let snap = state.snapshot();
    assert_eq!(snap.indicator, Indicator::Inflation);
    assert_eq!(snap.selection.len(), 1);
    assert_eq!(snap.revision, state.revision());

    assert!(!state.close_panel().needs_redraw());
    assert_eq!(state.clear_selection(), StateChange::Cleared);
    assert!(state.snapshot().revision > snap.revision);
}
