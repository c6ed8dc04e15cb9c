mod render;

pub use render::{format_failed_rate, print_report, render_json, render_text};
