//! Runs a composed unit to completion and aggregates the outcome.

use super::graph::member_id;
use super::{LeafRecord, Outcome, Report, Unit};
use crate::{debug, log};
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};

/// Run `unit` and return the record of every leaf it invoked.
///
/// Never fails: leaf errors and panics end up in the report.
pub async fn run(unit: &Unit) -> Report {
    run_unit(unit, unit.name().to_string()).await
}

fn run_unit<'a>(unit: &'a Unit, id: String) -> BoxFuture<'a, Report> {
    async move {
        match unit {
            Unit::Task(handle) => {
                let record = handle.run().await;
                log_leaf(&id, &record);
                Report::from(record)
            }
            Unit::Sequence { name, members } => {
                let mut report = Report::new();
                for (index, member) in members.iter().enumerate() {
                    let part = run_unit(member, member.name().to_string()).await;
                    let failed = !part.is_success();
                    report.extend(part);
                    if failed {
                        let rest = members.len() - index - 1;
                        if rest > 0 {
                            debug!("task"; "{name}: aborting {rest} remaining after failure");
                        }
                        break;
                    }
                }
                report
            }
            Unit::Concurrent { name, members } => {
                let runs = members
                    .iter()
                    .enumerate()
                    .map(|(i, member)| run_unit(member, member_id(name, i, member)));

                let mut report = Report::new();
                for part in join_all(runs).await {
                    report.extend(part);
                }
                report
            }
        }
    }
    .boxed()
}

fn log_leaf(id: &str, record: &LeafRecord) {
    let ms = record.elapsed.as_millis();
    match &record.outcome {
        Outcome::Success(outputs) => {
            log!("task"; "{id} done in {ms}ms ({})", crate::utils::plural::plural_count(outputs.len(), "file"));
        }
        Outcome::Skipped => debug!("task"; "{id} skipped (no matching inputs)"),
        Outcome::Failure(err) => log!("error"; "{id} failed: {err}"),
    }
}
