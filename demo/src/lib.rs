pub mod optimizers;
pub mod schedule;
