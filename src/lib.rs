#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

pub mod errors;
pub mod id;
pub mod objects;
pub mod stream;
pub mod delta;
pub mod pack;
pub mod import;
