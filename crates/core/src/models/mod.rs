pub mod portfolio;
pub mod quote;
pub mod session;
pub mod settings;
pub mod user;
