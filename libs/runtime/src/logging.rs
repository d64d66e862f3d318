use crate::config::{LoggingConfig, Section};
use crate::paths::resolve_under;
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// `None` means the output is switched off; unknown names fall back to INFO.
fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// True if `target` is `krate` itself or one of its modules.
fn matches_crate_prefix(target: &str, krate: &str) -> bool {
    target
        .strip_prefix(krate)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

type CatchAllFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync>>;

/// Passes everything at or above `max_level` whose target has no dedicated section.
fn catch_all_filter(explicit: Vec<String>, max_level: Level) -> CatchAllFilter {
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        !explicit.iter().any(|c| matches_crate_prefix(meta.target(), c))
            && *meta.level() <= max_level
    }))
}

// -------- rotating file writers --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .flush()
    }
}

/// Writes into the chosen file, or drops the record when there is none.
struct RoutedWriter(Option<RotWriter>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to per-subsystem files by target prefix, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl FileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriter> {
        self.by_prefix
            .iter()
            .find(|(krate, _)| matches_crate_prefix(target, krate))
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve_for(meta.target()))
    }
}

fn open_rotating_file(path: &Path, max_bytes: usize) -> std::io::Result<RotWriter> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let rot = FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::Age(chrono::Duration::days(1))),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn writer_for_section(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let path = resolve_under(base_dir, &section.file);
    match open_rotating_file(&path, max_bytes as usize) {
        Ok(w) => Some(w),
        Err(e) => {
            // The subscriber is not installed yet, so stderr is the only channel.
            eprintln!(
                "failed to open log file for '{name}' at {}: {e}",
                path.display()
            );
            None
        }
    }
}

// -------- public init --------

/// Install the global subscriber described by `cfg`.
///
/// Every non-`default` key names a crate target with its own console level and
/// optional JSON log file; the `default` section covers all remaining targets.
/// Relative file paths are resolved under `base_dir` (the server home dir).
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let explicit: Vec<(&String, &Section)> =
        cfg.iter().filter(|(k, _)| k.as_str() != DEFAULT_SECTION).collect();
    let explicit_names: Vec<String> = explicit.iter().map(|(k, _)| (*k).clone()).collect();
    let default_section = cfg.get(DEFAULT_SECTION);

    let mut console_targets = Targets::new().with_default(LevelFilter::OFF);
    let mut file_targets = Targets::new().with_default(LevelFilter::OFF);
    let mut router = FileRouter::default();

    for (name, section) in &explicit {
        if let Some(level) = parse_tracing_level(&section.console_level) {
            console_targets = console_targets.with_target((*name).clone(), level);
        }
        if let Some(writer) = writer_for_section(name, section, base_dir) {
            router.by_prefix.insert((*name).clone(), writer);
            if let Some(level) = parse_tracing_level(&section.file_level) {
                file_targets = file_targets.with_target((*name).clone(), level);
            }
        }
    }
    if let Some(section) = default_section {
        router.default = writer_for_section(DEFAULT_SECTION, section, base_dir);
    }

    let ansi = std::io::stdout().is_terminal();

    let console_explicit = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets);

    let console_default = default_section
        .and_then(|s| parse_tracing_level(&s.console_level))
        .map(|level| {
            fmt::layer()
                .with_ansi(ansi)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(catch_all_filter(explicit_names.clone(), level))
        });

    let file_explicit = (!router.by_prefix.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router.clone())
            .with_filter(file_targets)
    });

    let file_default = default_section
        .filter(|_| router.default.is_some())
        .and_then(|s| parse_tracing_level(&s.file_level))
        .map(|level| {
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(router.clone())
                .with_filter(catch_all_filter(explicit_names.clone(), level))
        });

    let _ = Registry::default()
        .with(console_explicit)
        .with(console_default)
        .with(file_explicit)
        .with(file_default)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_logging_config, AppConfig};
    use std::fs;
    use tempfile::tempdir;

    fn section(file: &str) -> Section {
        Section {
            console_level: "info".into(),
            file: file.into(),
            file_level: "debug".into(),
            max_age_days: Some(7),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn level_parsing() {
        assert_eq!(parse_tracing_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level(" Info "), Some(Level::INFO));
        assert_eq!(parse_tracing_level("warning"), Some(Level::WARN));
        assert_eq!(parse_tracing_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("none"), None);
        assert_eq!(parse_tracing_level("bogus"), Some(Level::INFO));
    }

    #[test]
    fn crate_prefix_matching() {
        assert!(matches_crate_prefix("employees", "employees"));
        assert!(matches_crate_prefix("employees::domain::service", "employees"));
        assert!(!matches_crate_prefix("employees_ext", "employees"));
        assert!(!matches_crate_prefix("api_ingress", "employees"));
    }

    #[test]
    fn router_prefers_subsystem_file_then_default() {
        let tmp = tempdir().unwrap();
        let mut router = FileRouter {
            default: writer_for_section("default", &section("logs/all.log"), tmp.path()),
            ..FileRouter::default()
        };
        let api = writer_for_section("api_ingress", &section("logs/api.log"), tmp.path());
        router.by_prefix.insert("api_ingress".into(), api.unwrap());

        let mut w = RoutedWriter(router.resolve_for("api_ingress::request_id"));
        w.write_all(b"api line\n").unwrap();
        w.flush().unwrap();
        let mut d = RoutedWriter(router.resolve_for("employees::service"));
        d.write_all(b"default line\n").unwrap();
        d.flush().unwrap();

        let api_log = fs::read_to_string(tmp.path().join("logs/api.log")).unwrap();
        let all_log = fs::read_to_string(tmp.path().join("logs/all.log")).unwrap();
        assert!(api_log.contains("api line"));
        assert!(!api_log.contains("default line"));
        assert!(all_log.contains("default line"));
    }

    #[test]
    fn empty_file_disables_writer() {
        let tmp = tempdir().unwrap();
        assert!(writer_for_section("x", &section("  "), tmp.path()).is_none());
        let mut w = RoutedWriter(None);
        assert_eq!(w.write(b"dropped").unwrap(), 7);
    }

    #[test]
    fn default_config_paths_land_under_home_dir() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        let home = tmp.path().join("home");
        fs::write(
            &cfg_path,
            format!(
                "server:\n  home_dir: \"{}\"\n  host: 127.0.0.1\n  port: 8088\n",
                home.to_string_lossy().replace('\\', "/")
            ),
        )
        .unwrap();
        let config = AppConfig::load_layered(&cfg_path).unwrap();

        let default_cfg = default_logging_config();
        let file = &default_cfg["default"].file;
        let abs = resolve_under(&config.home_dir(), file);
        assert!(abs.starts_with(&config.server.home_dir));
        assert!(abs.ends_with("logs/staffdesk.log"));
    }
}
