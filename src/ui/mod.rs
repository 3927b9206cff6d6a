pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, info, success, summary_row};
pub use table::{appointments_table, options_table, rows_table, stats_table, TableBuilder};
pub use theme::{status_style, theme, Theme};
