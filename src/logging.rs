use log::LevelFilter;
use log::SetLoggerError;
use simplelog::ColorChoice;
use simplelog::ConfigBuilder;
use simplelog::TermLogger;
use simplelog::TerminalMode;

pub fn level_filter(verbosity: usize) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs a terminal logger writing to stderr. Fails if a logger
/// has already been installed in this process.
pub fn initialize(verbosity: usize) -> Result<(), SetLoggerError> {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    TermLogger::init(
        level_filter(verbosity),
        config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}
