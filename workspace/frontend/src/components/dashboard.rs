mod card;
mod charts;
mod invoices_table;
mod overview;
mod series;
mod view;

pub use view::Dashboard;
