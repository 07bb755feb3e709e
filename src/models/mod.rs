pub mod exercise;
pub mod profile;
pub mod routine;
pub mod workout;
