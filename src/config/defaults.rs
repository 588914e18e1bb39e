//! Default configuration constants used across the system.

/// Default admin API port.
pub const DEFAULT_SERVER_PORT: u16 = 18790;

/// Role required to change provider settings.
pub const ADMIN_ROLE: &str = "administrators";

/// SQLite file name under the state directory.
pub const DEFAULT_STORE_FILE: &str = "settings.db";

/// Base name of the configuration file.
pub const CONFIG_FILE_STEM: &str = "jitsi-connector";

/// State directory name under the home directory.
pub const STATE_DIR_NAME: &str = ".jitsi-connector";
