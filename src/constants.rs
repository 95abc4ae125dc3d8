//! Application-wide constants
//!
//! Endpoint paths, header values, cookie names and defaults shared by the
//! switcher, the settings layer and the manager window.

/// Page markup contract
pub mod page {
    /// Identifier of the one select control that drives configuration switching
    pub const CONFIG_SELECT_ID: &str = "configSelect";

    /// Label shown next to the configuration dropdown
    pub const CONFIG_SELECT_LABEL: &str = "Policy";
}

/// Server endpoints and request shape
pub mod http {
    /// Path of the configuration-selection endpoint
    pub const SELECT_PATH: &str = "/config_id";

    /// Query parameter carrying the selected identifier
    pub const CONFIG_ID_PARAM: &str = "config_id";

    /// Path of the configuration catalog, relative to the base URL
    pub const CONFIGS_PATH: &str = "/v1/rails/configs";

    pub const APPLICATION_JSON: &str = "application/json";
}

/// Credential cookie
pub mod cookie {
    /// Name of the cookie holding the bearer token
    pub const PROXY: &str = "proxy";
}

/// Settings file location
pub mod config {
    pub const APP_DIR: &str = "config-switcher";
    pub const FILENAME: &str = "config.json";
}

/// Default values used when the settings file omits a field
pub mod defaults {
    pub mod server {
        /// Port the proxy portal listens on
        pub const BASE_URL: &str = "http://localhost:8500";
        pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    }

    pub mod manager {
        pub const WINDOW_WIDTH: u16 = 420;
        pub const WINDOW_HEIGHT: u16 = 220;

        /// How often the window polls for switch results
        pub const POLL_INTERVAL_MS: u64 = 250;

        /// Time left for runtime tasks to stop once in-flight switches are drained
        pub const SHUTDOWN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);
    }
}

/// Manager window styling
pub mod gui {
    use eframe::egui::Color32;

    pub const ITEM_SPACING: f32 = 8.0;

    pub const COLOR_SUCCESS: Color32 = Color32::from_rgb(0, 200, 0);
    pub const COLOR_WARNING: Color32 = Color32::from_rgb(230, 160, 0);
    pub const COLOR_ERROR: Color32 = Color32::from_rgb(200, 0, 0);
}
