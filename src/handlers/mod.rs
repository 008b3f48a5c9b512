pub mod health;
pub mod responses;
pub mod styles;
pub mod visualize;
