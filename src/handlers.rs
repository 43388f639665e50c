pub mod chat;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod history;
pub mod invoices;
pub mod openapi;
