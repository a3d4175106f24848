//! Table rendering for list output

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows with the shared list style
pub fn render<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}
