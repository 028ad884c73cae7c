pub mod split;
pub mod stripe;
