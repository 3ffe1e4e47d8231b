#[derive(uniffi::Enum, Debug, Clone)]
pub enum AppAction {
    // List lifecycle
    OpenList,
    CloseList,

    // Records
    DeleteItem {
        item_id: String,
        /// The user's answer to the confirmation prompt.
        confirmed: bool,
    },

    // Connectivity
    ConnectivityChanged {
        online: bool,
    },

    // UI
    ClearToast,
}

impl AppAction {
    /// Log-safe action tag.
    pub fn tag(&self) -> &'static str {
        match self {
            // List lifecycle
            AppAction::OpenList => "OpenList",
            AppAction::CloseList => "CloseList",

            // Records
            AppAction::DeleteItem { .. } => "DeleteItem",

            // Connectivity
            AppAction::ConnectivityChanged { .. } => "ConnectivityChanged",

            // UI
            AppAction::ClearToast => "ClearToast",
        }
    }
}
