#[macro_use]
extern crate enum_primitive_derive;

pub mod classifier;
pub mod dissectors;
pub mod duration;
