pub mod campaigns;
pub mod characters;
pub mod flags;
pub mod games;
pub mod listings;
pub mod messages;
pub mod users;
pub mod vendors;
