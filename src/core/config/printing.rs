use crate::core::config::data::Config;

fn or_unset(value: Option<&str>) -> &str {
    value.unwrap_or("(unset)")
}

impl Config {
    /// Lines of `key: value` pairs as `palaver config` prints them.
    pub fn display_lines(&self) -> Vec<String> {
        let timeout = self
            .request_timeout_secs
            .map(|secs| format!("{secs}s"))
            .unwrap_or_else(|| "(none)".to_string());

        vec![
            format!("datastore: {}", self.datastore_kind().as_str()),
            format!("datastore-url: {}", or_unset(self.datastore_url.as_deref())),
            format!("table: {}", self.resolved_table()),
            format!("model: {}", or_unset(self.model.as_deref())),
            format!(
                "gemini-base-url: {}",
                or_unset(self.gemini_base_url.as_deref())
            ),
            format!("request-timeout: {timeout}"),
            format!(
                "sidebar: {}",
                if self.sidebar_open() { "on" } else { "off" }
            ),
            format!("log-file: {}", or_unset(self.log_file.as_deref())),
        ]
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.display_lines() {
            println!("  {line}");
        }
    }
}
