use env_logger::fmt::Formatter;
use log::{Level, Record};
use std::io::Write;
use chrono::Local;
use colored::*;

/// `--verbose` first, then the configured level, then `RUST_LOG`, then `info`.
pub fn resolve_filter(verbose: bool, configured: Option<&str>, env: Option<String>) -> String {
    if verbose {
        return "debug".to_string();
    }
    configured
        .map(str::to_string)
        .or(env.filter(|filter| !filter.is_empty()))
        .unwrap_or_else(|| "info".to_string())
}

pub fn init_logger(filter: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filter);
    builder.format(format_log);

    // Filter out logs from actix_server and actix_web
    builder.filter(Some("actix_server"), log::LevelFilter::Warn);
    builder.filter(Some("actix_web"), log::LevelFilter::Warn);

    builder.init();
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Error => "ERROR".truecolor(255, 0, 0),
        Level::Warn => "WARN".truecolor(255, 165, 0),
        Level::Info => "INFO".truecolor(0, 255, 255),
        Level::Debug => "DEBUG".truecolor(138, 43, 226),
        Level::Trace => "TRACE".truecolor(255, 105, 180),
    }
}

fn format_log(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let message = format!(
        "{} [{}] - {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level_tag(record.level()),
        record.args()
    );

    writeln!(buf, "{}", message)
}

pub fn print_banner(host: &str, port: u16, backend: &str) {
    let orange = (255, 138, 61);
    let red = (230, 57, 70);

    let border = "=".repeat(64);
    println!("{}", border.truecolor(red.0, red.1, red.2));
    println!("{}", "    FlowForge Workbench".truecolor(orange.0, orange.1, orange.2).bold());
    println!();
    println!("{}", format!("   - Dashboard: http://{}:{}", host, port).cyan());
    println!("{}", format!("   - Backend:   {}", backend).cyan());
    println!("{}", border.truecolor(red.0, red.1, red.2));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_filter_precedence() {
        let env = || Some("warn".to_string());
        assert_eq!(resolve_filter(true, Some("error"), env()), "debug");
        assert_eq!(resolve_filter(false, Some("error"), env()), "error");
        assert_eq!(resolve_filter(false, None, env()), "warn");
        assert_eq!(resolve_filter(false, None, Some(String::new())), "info");
        assert_eq!(resolve_filter(false, None, None), "info");
    }

    #[test]
    fn test_level_tags() {
        colored::control::set_override(false);
        assert_eq!(level_tag(Level::Error).to_string(), "ERROR");
        assert_eq!(level_tag(Level::Debug).to_string(), "DEBUG");
        colored::control::unset_override();
    }
}
