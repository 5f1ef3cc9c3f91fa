//! `csftp`, the interactive FTP client.
//!
//! Usage: `csftp <host> [<port>]`

use clap::{Arg, ArgAction, ArgMatches, Command, error::ErrorKind};
use slog::{Drain, Level};
use std::{ffi::OsString, path::PathBuf, process, sync::Arc, time::Duration};
use unftp_client::{Client, Console, StdioCommandSource, StdoutConsole, options};

const HOST: &str = "host";
const PORT: &str = "port";
const VERBOSE: &str = "verbose";
const CONNECT_TIMEOUT: &str = "connect-timeout";
const DATA_TIMEOUT: &str = "data-timeout";
const DOWNLOAD_DIR: &str = "download-dir";

const USAGE: &str = "usage: csftp ServerAddress ServerPort";
const PORT_INVALID: &str = "Port number invalid!";

fn cli() -> Command {
    Command::new("csftp")
        .version(env!("CARGO_PKG_VERSION"))
        .about("An interactive FTP client using passive mode transfers")
        .author("The bol.com unFTP team")
        .arg(Arg::new(HOST).value_name("ServerAddress").help("The server to connect to").required(true))
        .arg(Arg::new(PORT).value_name("ServerPort").help("The control connection port, 21 if not given"))
        .arg(
            Arg::new(VERBOSE)
                .short('v')
                .long(VERBOSE)
                .action(ArgAction::Count)
                .help("Log more to stderr, repeat for even more"),
        )
        .arg(
            Arg::new(CONNECT_TIMEOUT)
                .long(CONNECT_TIMEOUT)
                .value_name("SECS")
                .value_parser(clap::value_parser!(u64))
                .help("Seconds to wait for the control connection"),
        )
        .arg(
            Arg::new(DATA_TIMEOUT)
                .long(DATA_TIMEOUT)
                .value_name("SECS")
                .value_parser(clap::value_parser!(u64))
                .help("Seconds to wait for a data connection"),
        )
        .arg(
            Arg::new(DOWNLOAD_DIR)
                .long(DOWNLOAD_DIR)
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Where downloaded files are written"),
        )
}

// Help and version are clap's to print. Any other argument error gets the usage line.
fn arguments<I, T>(args: I) -> Result<ArgMatches, &'static str>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match cli().try_get_matches_from(args) {
        Ok(matches) => Ok(matches),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => err.exit(),
        Err(_) => Err(USAGE),
    }
}

fn endpoint(matches: &ArgMatches) -> Result<(String, u16), &'static str> {
    let host = matches.get_one::<String>(HOST).cloned().ok_or(USAGE)?;
    let port = match matches.get_one::<String>(PORT) {
        None => options::DEFAULT_PORT,
        Some(port) => port.parse::<u16>().map_err(|_| PORT_INVALID)?,
    };
    Ok((host, port))
}

fn log_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::Warning,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    }
}

fn logger(level: Level) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().filter_level(level).fuse();
    slog::Logger::root(drain, slog::o!())
}

#[tokio::main]
async fn main() {
    let (matches, (host, port)) = match arguments(std::env::args_os()).and_then(|matches| endpoint(&matches).map(|endpoint| (matches, endpoint))) {
        Ok(parsed) => parsed,
        Err(message) => {
            println!("{}", message);
            process::exit(1);
        }
    };

    let logger = logger(log_level(matches.get_count(VERBOSE)));
    let mut builder = Client::builder(host).port(port).logger(logger.clone());
    if let Some(secs) = matches.get_one::<u64>(CONNECT_TIMEOUT) {
        builder = builder.connect_timeout(Duration::from_secs(*secs));
    }
    if let Some(secs) = matches.get_one::<u64>(DATA_TIMEOUT) {
        builder = builder.data_connect_timeout(Duration::from_secs(*secs));
    }
    if let Some(dir) = matches.get_one::<PathBuf>(DOWNLOAD_DIR) {
        builder = builder.download_dir(dir.clone());
    }

    let console: Arc<dyn Console> = Arc::new(StdoutConsole);
    let client = match builder.connect().await {
        Ok(client) => client,
        Err(err) => {
            console.print(&err.report().to_string());
            process::exit(1);
        }
    };

    let end = client.run(&mut StdioCommandSource::new(), console).await;
    slog::debug!(logger, "Exiting"; "code" => end.exit_code());
    // The async drain only flushes once the last logger is gone.
    drop(logger);
    process::exit(end.exit_code());
}
