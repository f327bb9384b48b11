/*!
# offjournal

Command-line entry point. Parses arguments, initializes logging, loads the
configuration and runs one subcommand.

## Usage

```
offjournal [OPTIONS] <COMMAND>

Commands:
  new            Create a new entry [alias: nova]
  read           Print an entry [alias: ler]
  list           List entries, newest first [alias: listar]
  update         Replace an entry's content with a file or standard input
  delete         Delete an entry [alias: apagar]
  planner        Manage planner events
  media          Manage entry attachments
  mood           Analyze the mood of an entry
  encrypt        Encrypt a file for an age recipient
  decrypt        Decrypt a .age file
  export         Export an entry as txt, md or json
  backup         Archive the whole data directory into a tar.gz file
  verify-backup  List the contents of a backup archive

Options:
      --log-format <LOG_FORMAT>  Log output format [default: text] [possible values: text, json]
      --log-level <LOG_LEVEL>    Log level used when RUST_LOG is not set [default: info]
```

## Configuration

- `OFFJOURNAL_DIR`: the data directory (defaults to `~/.offjournal`)
- `OFFJOURNAL_LANG`: mood vocabulary, `pt` (default) or `en`
- `RUST_LOG`: overrides `--log-level`
*/

use clap::Parser;
use offjournal::cli::{commands, CliArgs};
use offjournal::config::Config;
use offjournal::constants::{LOG_FORMAT_JSON, TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME};
use offjournal::errors::AppResult;
use std::io;
use std::process;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initializes the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// takes precedence over `--log-level`.
fn init_tracing(log_format: &str, log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if log_format == LOG_FORMAT_JSON {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn run(args: CliArgs) -> AppResult<()> {
    let config = Config::load()?;
    config.validate()?;
    debug!("Configuration loaded: {:?}", config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    commands::execute(args.command, &config, &mut stdin.lock(), &mut stdout.lock())
}

fn main() {
    let args = CliArgs::parse();
    init_tracing(&args.log_format, &args.log_level);

    let correlation_id = Uuid::new_v4().to_string();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = root_span.enter();

    info!("Starting {}", TRACING_SERVICE_NAME);
    if let Err(e) = run(args) {
        error!(kind = %e.kind(), "{}", e);
        eprintln!("Error [{}]: {}", e.kind(), e);
        process::exit(1);
    }
    debug!("Finished successfully");
}
