use chrono::Local;
use tracing::info;

/// Ordered, append-only run log. This is the sole user-visible failure
/// reporting surface: every line is timestamped at append time, mirrored to
/// `tracing`, and the rendered whole is handed to the notifier at run end.
#[derive(Debug, Default)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("{}", message);
        self.lines.push(format!(
            "{}    : {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        ));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}
