pub mod admin;
pub mod autopost;
