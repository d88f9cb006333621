//! Routed Pages

mod home;
mod login;
mod tasks;

pub use home::HomePage;
pub use login::LoginPage;
pub use tasks::TasksPage;
