//! Logging Infrastructure
//!
//! Structured logging setup for development and production:
//! - Daily rotating application logs (kept for 14 days)
//! - Permanent day-close logs (target `day_close`, never deleted)
//! - Permanent security logs (target `security`, never deleted)

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::filter_fn, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Days of application logs kept on disk
pub const APP_LOG_RETENTION_DAYS: usize = 14;

/// Targets that get their own permanent file
pub const DAY_CLOSE_TARGET: &str = "day_close";
pub const SECURITY_TARGET: &str = "security";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn file_appender(
    dir: &Path,
    prefix: &str,
    keep: Option<usize>,
) -> anyhow::Result<RollingFileAppender> {
    fs::create_dir_all(dir)?;
    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log");
    if let Some(keep) = keep {
        builder = builder.max_log_files(keep);
    }
    Ok(builder.build(dir)?)
}

/// Build the layers without installing them
///
/// Split out so tests can attach the same layers to a scoped subscriber.
pub fn build_layers(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<Vec<BoxedLayer>> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    // Console layer
    let console = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);
    if json_format {
        layers.push(
            console
                .json()
                .with_current_span(true)
                .with_filter(level_filter(level))
                .boxed(),
        );
    } else {
        layers.push(console.with_filter(level_filter(level)).boxed());
    }

    let Some(log_dir) = log_dir else {
        return Ok(layers);
    };

    let sinks = [
        (
            log_dir.join("app"),
            "app",
            Some(APP_LOG_RETENTION_DAYS),
            None,
        ),
        (
            log_dir.join(DAY_CLOSE_TARGET),
            DAY_CLOSE_TARGET,
            None,
            Some(DAY_CLOSE_TARGET),
        ),
        (
            log_dir.join(SECURITY_TARGET),
            SECURITY_TARGET,
            None,
            Some(SECURITY_TARGET),
        ),
    ];

    for (dir, prefix, keep, target) in sinks {
        let appender = file_appender(&dir, prefix, keep)?;
        // Application file takes everything except the permanent targets
        let routing = filter_fn(move |meta| match target {
            Some(target) => meta.target() == target,
            None => meta.target() != DAY_CLOSE_TARGET && meta.target() != SECURITY_TARGET,
        });
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(appender));
        if json_format {
            layers.push(
                layer
                    .json()
                    .with_filter(routing)
                    .with_filter(level_filter(level))
                    .boxed(),
            );
        } else {
            layers.push(
                layer
                    .with_filter(routing)
                    .with_filter(level_filter(level))
                    .boxed(),
            );
        }
    }

    Ok(layers)
}

/// Initialize the global logger
///
/// # Examples
/// ```no_run
/// // Development setup (console only)
/// pos_server::init_logger("debug", false, None)?;
///
/// // Production setup (console + files)
/// pos_server::init_logger("info", true, Some(std::path::Path::new("./work_dir/logs")))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let layers = build_layers(level, json_format, log_dir)?;
    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}
