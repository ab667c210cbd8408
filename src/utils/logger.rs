//! Process-wide log4rs setup.
//!
//! Three rolling files live under the chosen directory:
//! - `app.log`: everything routed through the root logger
//! - `audit.log`: one line per mutation, target `menukit::audit`
//! - `dev.log`: JSON timing records from [`bench`](super::bench), only when enabled

use crate::errors::{SdkError, SdkResult};
use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

pub const AUDIT_TARGET: &str = "menukit::audit";
pub const DEV_TARGET: &str = "menukit::dev";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

/// Maps a level name to a filter; unknown names fall back to `info`.
#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> SdkResult<RollingFileAppender> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)
        .map_err(|e| SdkError::Config(format!("log roller for {stem}: {e}")))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))
        .map_err(SdkError::from)
}

/// Configure logging for the process.
/// - dir: base directory for logs; if None, current directory.
/// - level: off|error|warn|info|debug|trace
/// - retention: number of rolled files to keep (default 7)
///
/// # Errors
/// Returns an error if the directory or an appender cannot be created. A
/// logger that is already installed is left in place and is not an error.
pub fn configure_logging(dir: Option<&Path>, level: Option<&str>, retention: Option<usize>) -> SdkResult<()> {
    configure_logging_with_dev(dir, level, retention, false)
}

/// Same as [`configure_logging`], optionally persisting timing records to `dev.log`.
pub fn configure_logging_with_dev(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
    enable_dev: bool,
) -> SdkResult<()> {
    let base = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);

    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build(AUDIT_TARGET, lvl));

    builder = if enable_dev {
        builder
            .appender(Appender::builder().build("dev", Box::new(rolling(&base, "dev", keep)?)))
            .logger(Logger::builder().appender("dev").additive(false).build(DEV_TARGET, LevelFilter::Trace))
    } else {
        builder.logger(Logger::builder().additive(false).build(DEV_TARGET, LevelFilter::Off))
    };

    let config = builder
        .build(Root::builder().appender("app").build(lvl))
        .map_err(|e| SdkError::Config(format!("log config: {e}")))?;
    if log4rs::init_config(config).is_err() {
        log::debug!("logger already initialized; keeping existing configuration");
    }
    Ok(())
}

fn truthy(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Configure logging from environment variables if present:
/// - MENUKIT_LOG_DIR
/// - MENUKIT_LOG_LEVEL
/// - MENUKIT_LOG_RETENTION
/// - MENUKIT_DEVLOG
pub fn configure_from_env() -> SdkResult<()> {
    let dir = std::env::var("MENUKIT_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("MENUKIT_LOG_LEVEL").ok();
    let retention = std::env::var("MENUKIT_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    let dev = std::env::var("MENUKIT_DEVLOG").map(|s| truthy(&s)).unwrap_or(false);
    configure_logging_with_dev(dir.as_deref(), level.as_deref(), retention, dev)
}
