mod command;
mod runner;
mod util;

pub use command::Command;
pub use runner::{load_fixture, run};
pub use util::parse_sort;
