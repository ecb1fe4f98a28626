
use indicatif::{ProgressState, ProgressStyle};

/// Shared function to pull our spinner styling, used when the total count is not known up front
pub fn get_spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise}] {spinner:.cyan} {pos} {msg}; Speed: {per_sec}")
        .unwrap()
        .with_key("per_sec", |state: &ProgressState, w: &mut dyn std::fmt::Write| write!(w, "{:.0}/s", state.per_sec()).unwrap())
}
