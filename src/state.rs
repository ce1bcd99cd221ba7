//! Dashboard view state: the selection plus the current indicator and chart type.
//!
//! Every mutation returns a [`StateChange`] so the view layer knows when to redraw,
//! and bumps a revision counter used to drop results of outdated background renders.

use crate::models::{ChartType, Indicator, SelectedCountry};
use crate::selection::{SelectionStore, Toggle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// A country was added (`Selected`) or removed (`Deselected`).
    Selection { code: String, toggle: Toggle },
    Cleared,
    IndicatorChanged(Indicator),
    ChartTypeChanged(ChartType),
    /// Chart panel hidden by the user; selection untouched.
    PanelClosed,
    /// The request did not change anything.
    Unchanged,
}

impl StateChange {
    /// Whether the chart must be rebuilt after this change.
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, StateChange::Unchanged | StateChange::PanelClosed)
    }
}

/// Immutable input for one chart render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub selection: Vec<SelectedCountry>,
    pub indicator: Indicator,
    pub chart_type: ChartType,
    pub revision: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    selection: SelectionStore,
    indicator: Indicator,
    chart_type: ChartType,
    panel_visible: bool,
    revision: u64,
}

impl DashboardState {
    pub fn new(indicator: Indicator, chart_type: ChartType) -> Self {
        Self {
            indicator,
            chart_type,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.selection.contains(code)
    }

    pub fn toggle_country(&mut self, code: &str, name: &str) -> StateChange {
        let toggle = self.selection.toggle(code, name);
        self.panel_visible = !self.selection.is_empty();
        self.revision += 1;
        StateChange::Selection {
            code: code.to_string(),
            toggle,
        }
    }

    pub fn clear_selection(&mut self) -> StateChange {
        if self.selection.is_empty() {
            self.panel_visible = false;
            return StateChange::Unchanged;
        }
        self.selection.clear();
        self.panel_visible = false;
        self.revision += 1;
        StateChange::Cleared
    }

    pub fn set_indicator(&mut self, indicator: Indicator) -> StateChange {
        if indicator == self.indicator {
            return StateChange::Unchanged;
        }
        self.indicator = indicator;
        self.revision += 1;
        StateChange::IndicatorChanged(indicator)
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) -> StateChange {
        if chart_type == self.chart_type {
            return StateChange::Unchanged;
        }
        self.chart_type = chart_type;
        self.revision += 1;
        StateChange::ChartTypeChanged(chart_type)
    }

    pub fn close_panel(&mut self) -> StateChange {
        if !self.panel_visible {
            return StateChange::Unchanged;
        }
        self.panel_visible = false;
        StateChange::PanelClosed
    }

    /// Re-open the panel for a non-empty selection.
    pub fn open_panel(&mut self) {
        self.panel_visible = !self.selection.is_empty();
    }

    pub fn snapshot(&self) -> RenderRequest {
        RenderRequest {
            selection: self.selection.as_slice().to_vec(),
            indicator: self.indicator,
            chart_type: self.chart_type,
            revision: self.revision,
        }
    }
}
