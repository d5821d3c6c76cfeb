pub mod effects;
pub mod presenter;
