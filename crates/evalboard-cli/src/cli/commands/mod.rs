pub mod chart;
pub mod dashboard;
pub mod list;
pub mod run;
pub mod show;

use crate::api::HttpApi;
use crate::cli::args::{Cli, Command};

pub mod exit_codes {
    pub const OK: i32 = 0;
    /// The server was unreachable or answered with an error.
    pub const FETCH_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let api = HttpApi::new(&cli.conn.base_url, &cli.conn.api_key);
    let json = cli.conn.json;
    tracing::debug!(event = "dispatch", base_url = %api.base_url);

    match cli.cmd {
        Command::List(args) => list::run(&api, &args, json).await,
        Command::Show(args) => show::run(&api, args.id, json).await,
        Command::Run(args) => run::run_one(&api, args.id, json).await,
        Command::RunNext(args) => run::run_next(&api, &args, json).await,
        Command::Chart(args) => chart::run(&api, &args, json).await,
        Command::Dashboard(args) => dashboard::run(&api, &args, json).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Prints a failed view and maps it to an exit code.
pub(crate) fn report_failure(what: &str, message: &str) -> i32 {
    eprintln!("error: failed to load {what}: {message}");
    exit_codes::FETCH_FAILED
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
