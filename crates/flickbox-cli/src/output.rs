use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            _ => self.record("success", msg.as_ref()),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            _ => self.record("info", msg.as_ref()),
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "⚠".yellow(), msg.as_ref()),
            _ => self.record("warning", msg.as_ref()),
        }
    }

    // Errors are shown even in quiet mode.
    pub fn error(&self, msg: impl AsRef<str>) {
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            _ => self.record("error", msg.as_ref()),
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        self.print_json(data);
    }

    fn record(&self, kind: &str, msg: &str) {
        self.print_json(&json!({
            "type": kind,
            "message": msg,
        }));
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
            OutputFormat::JsonPretty | OutputFormat::Human => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
        }
    }
}
