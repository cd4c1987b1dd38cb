pub mod articles;
pub mod profile;
pub mod taxonomy;
