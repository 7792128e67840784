//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# azstore configuration
#
# Environment overrides: AZSTORE_DEMO, AZSTORE_CONTAINER, AZSTORE_SCROLLBACK
# RUST_LOG overrides [logging] level

# Use the synthetic log source instead of Docker
demo = {demo}

# Show the help overlay on startup
show_welcome = {show_welcome}

# UI refresh tick in milliseconds
tick_ms = {tick_ms}

# Theme: dark, light, mono
theme = "{theme}"

# Azurite container and log source
[source]
docker_binary = "{docker_binary}"
container_name = "{container_name}"
image = "{image}"
ports = {ports:?}
volume = "{volume}"
startup_grace_ms = {startup_grace_ms}
reattach_timeout_secs = {reattach_timeout_secs}
demo_interval_ms = {demo_interval_ms}

# Log panel scrollback
[scroll]
capacity = {capacity}
channel_capacity = {channel_capacity}
page_step = {page_step}  # lines per PgUp/PgDn, 0 = one screen

# Internal diagnostics
[logging]
level = "{log_level}"
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            demo = self.demo,
            show_welcome = self.show_welcome,
            tick_ms = self.tick_ms,
            theme = self.theme.name(),
            docker_binary = escape(&self.source.docker_binary),
            container_name = escape(&self.source.container_name),
            image = escape(&self.source.image),
            ports = self.source.ports,
            volume = escape(&self.source.volume),
            startup_grace_ms = self.source.startup_grace_ms,
            reattach_timeout_secs = self.source.reattach_timeout_secs,
            demo_interval_ms = self.source.demo_interval_ms,
            capacity = self.scroll.capacity,
            channel_capacity = self.scroll.channel_capacity,
            page_step = self.scroll.page_step,
            log_level = escape(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = escape(&self.logging.file_dir.display().to_string()),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = escape(&self.logging.file_prefix),
        )
    }
}

/// Escape a value for a TOML basic string
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
