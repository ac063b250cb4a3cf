use indicatif::{ProgressBar, ProgressStyle};

const PROGRESS_TEMPLATE: &str = "{bar:40} {pos}/{len} {wide_msg}";

pub fn create_progress_bar(quiet: bool, len: usize) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    match ProgressStyle::with_template(PROGRESS_TEMPLATE) {
        Ok(style) => bar.with_style(style),
        Err(_) => bar,
    }
}
