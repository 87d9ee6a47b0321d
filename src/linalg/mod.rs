pub mod add;
pub mod matrix;
pub mod mult;
