pub mod category;
pub mod opportunity;
