//! ansi-console main entry point
//!
//! Renders a stream containing ANSI escape sequences onto an in-memory
//! console and prints what the screen ends up showing.
//!
//! Usage: ansi-console [--debug|-d] [--config PATH] [--raw] [--json] [FILE]

use anyhow::{bail, Context};
use ansi_console::config::Config;
use ansi_console::{AnsiFilter, MemoryConsole};
use log::{debug, error, info};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

/// Command line options
#[derive(Debug, Default)]
struct Options {
    debug: bool,
    config: Option<PathBuf>,
    /// Treat the console as redirected: bytes pass through untouched
    raw: bool,
    json: bool,
    input: Option<PathBuf>,
}

impl Options {
    fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" | "-d" => options.debug = true,
                "--raw" => options.raw = true,
                "--json" => options.json = true,
                "--config" => {
                    let path = args.next().context("--config requires a path")?;
                    options.config = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') && flag != "-" => bail!("Unknown option: {}", flag),
                "-" => options.input = None,
                file => options.input = Some(PathBuf::from(file)),
            }
        }
        Ok(options)
    }
}

fn main() {
    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: ansi-console [--debug|-d] [--config PATH] [--raw] [--json] [FILE]");
            process::exit(2);
        }
    };

    // Initialize logger
    if options.debug {
        // Debug mode: write to ansi-console.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("ansi-console.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open ansi-console.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "{} version {} starting (debug mode, logging to ansi-console.log)",
            ansi_console::APP_NAME,
            ansi_console::VERSION
        );
    } else {
        // Normal mode: only errors, unless RUST_LOG says otherwise
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .parse_default_env()
            .init();
    }

    if let Err(e) = run(&options) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(options: &Options) -> anyhow::Result<()> {
    let config = match &options.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    debug!("Using config {:?}", config.path());

    let (cols, rows) = config.console_size();
    let mut filter_config = config.filter_config();
    if options.debug {
        filter_config = filter_config.with_debug(true);
    }

    let mut console = MemoryConsole::new(cols, rows).with_code_page(config.oem_code_page());
    console.set_redirected(options.raw);
    let mut filter = AnsiFilter::new(console, filter_config)?;

    let input = read_input(options.input.as_deref())?;
    info!("Rendering {} bytes onto a {}x{} console", input.len(), cols, rows);
    filter.write_all(&input).context("Failed to render input")?;

    if !filter.pending().is_empty() {
        debug!(
            "Input ended inside an escape sequence ({} bytes pending)",
            filter.pending().len()
        );
    }

    let console = filter.into_inner();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if options.raw {
        out.write_all(console.raw_output())?;
    } else if options.json {
        serde_json::to_writer_pretty(&mut out, &console.snapshot())?;
        writeln!(out)?;
    } else {
        let (_, height) = console.size();
        let lines: Vec<String> = (0..height).map(|y| console.line_trimmed(y)).collect();
        let used = lines
            .iter()
            .rposition(|line| !line.is_empty())
            .map_or(0, |last| last + 1);
        for line in &lines[..used] {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()?;

    Ok(())
}

fn read_input(path: Option<&std::path::Path>) -> anyhow::Result<Vec<u8>> {
    let mut input = Vec::new();
    match path {
        Some(path) => {
            File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?
                .read_to_end(&mut input)?;
        }
        None => {
            io::stdin().lock().read_to_end(&mut input)?;
        }
    }
    Ok(input)
}
