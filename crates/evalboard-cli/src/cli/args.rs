use crate::view::ChartMode;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "evalboard",
    version,
    about = "Terminal dashboard for Evalboard evaluations"
)]
pub struct Cli {
    #[command(flatten)]
    pub conn: ConnArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConnArgs {
    #[arg(long, global = true, env = "EVALBOARD_URL", default_value = "http://localhost:3003")]
    pub base_url: String,

    #[arg(
        long,
        global = true,
        env = "EVALBOARD_API_KEY",
        default_value = "evalboard-dev-key",
        hide_env_values = true
    )]
    pub api_key: String,

    /// Print raw JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Paginated evaluation table with summary cards
    List(ListArgs),
    /// One evaluation with its synthetic results
    Show(IdArgs),
    /// Trigger a run for an evaluation
    Run(IdArgs),
    /// Run the first pending evaluation, else the first completed one
    RunNext(ListArgs),
    /// Performance chart panel
    Chart(ChartArgs),
    /// List view followed by the chart panel
    Dashboard(DashboardArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 10)]
    pub limit: u32,

    /// Exact status filter (pending|running|completed)
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long, default_value = "updated_at")]
    pub sort: String,

    #[arg(long, default_value = "desc")]
    pub order: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct IdArgs {
    pub id: i64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChartArgs {
    #[arg(long, value_enum, default_value_t = ChartMode::Trends)]
    pub mode: ChartMode,

    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// Trends only, no mode selector
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub list: ListArgs,

    #[arg(long, default_value_t = 30)]
    pub days: u32,
}
