use crate::errors::AppError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum View {
    #[default]
    Account,
    Statistics,
    History,
    Planning,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Account,
        View::Statistics,
        View::History,
        View::Planning,
    ];

    pub fn name(self) -> &'static str {
        match self {
            View::Account => "account",
            View::Statistics => "statistics",
            View::History => "history",
            View::Planning => "planning",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Account => "Account",
            View::Statistics => "Statistics",
            View::History => "History",
            View::Planning => "Planning",
        }
    }
}

impl FromStr for View {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|view| view.name() == s.trim())
            .ok_or_else(|| AppError::bad_request(format!("unknown view '{s}'")))
    }
}

/// Which view is showing.
///
/// Owned by the caller and passed into each render instead of living in
/// global flags. Every page is rendered on the server, so a request
/// always loads the data of the view it shows and nothing needs to
/// remember which views were visited before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub active: View,
}

impl ViewState {
    /// Rebuilds the state from `?view=..`; a missing or empty name means
    /// the default view.
    pub fn from_query(view: Option<&str>) -> Result<Self, AppError> {
        let active: View = view
            .filter(|v| !v.trim().is_empty())
            .map(str::parse::<View>)
            .transpose()?
            .unwrap_or_default();
        Ok(Self { active })
    }

    pub fn activate(self, view: View) -> Self {
        Self { active: view }
    }

    /// Query string that switches to this state.
    pub fn query(&self) -> String {
        format!("view={}", self.active.name())
    }
}
