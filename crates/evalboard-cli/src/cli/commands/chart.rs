use super::{exit_codes, print_json, report_failure};
use crate::api::DashboardApi;
use crate::cli::args::ChartArgs;
use crate::render;
use crate::view::{ChartPanel, LoadState};

pub async fn run(api: &dyn DashboardApi, args: &ChartArgs, json: bool) -> anyhow::Result<i32> {
    let mut panel = ChartPanel::new(args.mode, args.compact, args.days);
    panel.load(api).await;
    show(&panel, json)
}

pub(crate) fn show(panel: &ChartPanel, json: bool) -> anyhow::Result<i32> {
    match &panel.data {
        LoadState::Ready(report) if json => print_json(report)?,
        LoadState::Error(e) => {
            print!("{}", render::chart_panel(panel));
            return Ok(report_failure("performance data", e));
        }
        _ => print!("{}", render::chart_panel(panel)),
    }
    Ok(exit_codes::OK)
}
