pub mod action;
pub mod spawn;
