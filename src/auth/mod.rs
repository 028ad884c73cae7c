pub mod extract;
pub mod jwt;
pub mod password;
pub mod types;

pub use extract::CurrentUser;
