pub mod match_rule;
pub mod order;

pub use match_rule::*;
pub use order::*;
