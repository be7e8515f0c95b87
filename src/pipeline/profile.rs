//! Run a profile graph and summarize it.

use super::Pipeline;
use crate::core::Profile;
use crate::task::{Report, executor};
use crate::utils::plural::plural_count;

/// Run the graph for `profile` to completion.
///
/// Never fails: leaf failures are recorded in the returned [`Report`].
pub async fn run_profile(pipeline: &Pipeline, profile: Profile) -> Report {
    crate::log!(profile.label(); "starting");
    let report = executor::run(pipeline.graph(profile)).await;

    let failed = report.failures().count();
    let files = report.outputs().count();
    if failed == 0 {
        crate::log!(
            profile.label();
            "finished in {}ms ({})",
            report.elapsed().as_millis(),
            plural_count(files, "file")
        );
    } else {
        crate::log!(
            "error";
            "{} failed in {} build",
            plural_count(failed, "task"),
            profile
        );
    }
    report
}
