pub mod limit;
pub mod profile;
