mod parsing;

pub use parsing::*;
