mod results;
mod transcript;
mod view;

pub use view::Chat;
