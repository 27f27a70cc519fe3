//! Batch summary rendering.

use tabled::{Table, Tabled};

use crate::app::batch::{BatchSummary, ItemStatus};

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

/// Render the per-target outcomes plus a totals line.
#[must_use]
pub fn render(summary: &BatchSummary) -> String {
    let rows: Vec<OutcomeRow> = summary
        .outcomes
        .iter()
        .map(|outcome| {
            let (status, detail) = match &outcome.status {
                ItemStatus::Accepted { reference } => {
                    ("accepted", reference.clone().unwrap_or_default())
                }
                ItemStatus::Failed { reason } => ("failed", reason.clone()),
                ItemStatus::Skipped => ("skipped", String::new()),
            };
            OutcomeRow {
                position: outcome.index + 1,
                address: outcome.address.clone(),
                amount: outcome
                    .amount
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "-".into()),
                status,
                detail,
            }
        })
        .collect();

    format!(
        "{}\n{} accepted, {} failed, {} skipped",
        Table::new(rows),
        summary.accepted(),
        summary.failed(),
        summary.skipped()
    )
}
