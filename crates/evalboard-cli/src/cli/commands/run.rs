use super::{exit_codes, print_json, report_failure};
use crate::api::{DashboardApi, ListParams};
use crate::cli::args::ListArgs;
use crate::view::{EvaluationsView, LoadState};

pub async fn run_one(api: &dyn DashboardApi, id: i64, json: bool) -> anyhow::Result<i32> {
    match api.run(id).await {
        Ok(accepted) if json => print_json(&accepted)?,
        Ok(accepted) => {
            println!(
                "{}: #{} {} is now {}",
                accepted.message,
                accepted.evaluation.id,
                accepted.evaluation.name,
                accepted.evaluation.status
            );
        }
        Err(e) => return Ok(report_failure("run trigger", &format!("{e:#}"))),
    }
    Ok(exit_codes::OK)
}

/// Picks a target from the current page the same way the dashboard's
/// "Run New Evaluation" button does.
pub async fn run_next(api: &dyn DashboardApi, args: &ListArgs, json: bool) -> anyhow::Result<i32> {
    let mut view = EvaluationsView::new(ListParams::from(args));
    view.load(api).await;

    if let LoadState::Error(e) = &view.list {
        return Ok(report_failure("evaluations", e));
    }
    let Some(id) = view.next_to_run() else {
        eprintln!("No evaluations available to run");
        return Ok(exit_codes::FETCH_FAILED);
    };
    tracing::info!(event = "run_next_selected", id = id);
    run_one(api, id, json).await
}
