use super::{chart, exit_codes, print_json, report_failure};
use crate::api::{DashboardApi, ListParams};
use crate::cli::args::DashboardArgs;
use crate::render;
use crate::view::{ChartMode, ChartPanel, EvaluationsView, LoadState};

/// List view plus every chart mode. The views load independently, so a
/// failing chart still leaves the table on screen.
pub async fn run(api: &dyn DashboardApi, args: &DashboardArgs, json: bool) -> anyhow::Result<i32> {
    let mut view = EvaluationsView::new(ListParams::from(&args.list));
    let mut panel = ChartPanel::new(ChartMode::Trends, false, args.days);
    tokio::join!(view.load(api), panel.load(api));

    let mut code = exit_codes::OK;
    match &view.list {
        LoadState::Ready(page) if json => print_json(page)?,
        LoadState::Ready(page) => println!("{}", render::evaluations_table(page)),
        LoadState::Error(e) => code = report_failure("evaluations", e),
        LoadState::Loading => {}
    }

    if json {
        if let LoadState::Ready(report) = &panel.data {
            print_json(report)?;
        }
        return Ok(code);
    }

    for mode in ChartMode::ALL {
        panel.set_mode(mode);
        let chart_code = chart::show(&panel, false)?;
        println!();
        if chart_code != exit_codes::OK {
            code = chart_code;
            break;
        }
    }
    Ok(code)
}
