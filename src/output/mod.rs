/// Markdown rendering of result rows and turn outcomes.
pub mod formatter;
