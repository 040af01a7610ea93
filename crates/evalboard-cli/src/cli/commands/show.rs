use super::{exit_codes, print_json, report_failure};
use crate::api::{DashboardApi, ListParams};
use crate::render;
use crate::view::{EvaluationsView, LoadState};

pub async fn run(api: &dyn DashboardApi, id: i64, json: bool) -> anyhow::Result<i32> {
    let evaluation = match api.get(id).await {
        Ok(e) => e,
        Err(e) => return Ok(report_failure("evaluation", &format!("{e:#}"))),
    };

    let mut view = EvaluationsView::new(ListParams::default());
    view.open(api, id).await;

    let code = match &view.results {
        Some(LoadState::Ready(report)) if json => {
            print_json(&serde_json::json!({ "evaluation": evaluation, "results": report }))?;
            exit_codes::OK
        }
        Some(LoadState::Ready(report)) => {
            print!("{}", render::results_detail(report));
            print!("{}", render::timestamps(&evaluation));
            exit_codes::OK
        }
        Some(LoadState::Error(e)) => report_failure("evaluation results", e),
        _ => report_failure("evaluation results", "no response"),
    };
    view.close();
    Ok(code)
}
