use coinstreak_core::{best_increase_runs, iso_date, DailyRecord, IncreaseRun, PriceField, RunRanking};
use serde_json::json;

use super::CommandReport;
use crate::output::format_price;

pub fn run(records: &[DailyRecord], field: PriceField, ranking: RunRanking) -> CommandReport {
    let runs = best_increase_runs(records, field, ranking);

    let ranking_name = match ranking {
        RunRanking::Gain => "gain",
        RunRanking::Duration => "days",
    };
    let periods: Vec<_> = runs
        .iter()
        .map(|run| {
            json!({
                "start": iso_date(run.start),
                "end": iso_date(run.end),
                "start_price": run.start_price,
                "end_price": run.end_price,
                "gain": run.gain,
                "days": run.days(),
            })
        })
        .collect();
    let data = json!({
        "field": field.as_str(),
        "ranking": ranking_name,
        "runs": periods,
    });

    CommandReport {
        text: describe(&runs, ranking),
        data,
    }
}

fn describe(runs: &[IncreaseRun], ranking: RunRanking) -> String {
    match runs {
        [] => String::from("No consecutive increase was found in the given period"),
        [run] => format!("Longest consecutive period was {}", period(run)),
        runs => {
            let tie = match ranking {
                RunRanking::Gain => "increase",
                RunRanking::Duration => "length",
            };
            let mut lines = vec![format!(
                "More than one consecutive period with the same {tie} was found:"
            )];
            lines.extend(runs.iter().map(period));
            lines.join("\n")
        }
    }
}

fn period(run: &IncreaseRun) -> String {
    format!(
        "from {} to {} with increase of ${}",
        iso_date(run.start),
        iso_date(run.end),
        format_price(run.gain)
    )
}
