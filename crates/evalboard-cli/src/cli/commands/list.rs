use super::{exit_codes, print_json, report_failure};
use crate::api::{DashboardApi, ListParams};
use crate::cli::args::ListArgs;
use crate::render;
use crate::view::{EvaluationsView, LoadState};

pub async fn run(api: &dyn DashboardApi, args: &ListArgs, json: bool) -> anyhow::Result<i32> {
    let mut view = EvaluationsView::new(ListParams::from(args));
    view.load(api).await;

    match &view.list {
        LoadState::Ready(page) if json => print_json(page)?,
        LoadState::Ready(page) => print!("{}", render::evaluations_table(page)),
        LoadState::Error(e) => return Ok(report_failure("evaluations", e)),
        LoadState::Loading => return Ok(report_failure("evaluations", "no response")),
    }
    Ok(exit_codes::OK)
}
