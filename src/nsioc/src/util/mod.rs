pub mod display;
pub mod type_name;
