pub mod chat;
pub mod dashboard;
pub mod layout;
pub mod plotly;
