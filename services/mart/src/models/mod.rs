pub mod operation;
pub mod order;
pub mod user;

pub use operation::*;
pub use order::*;
pub use user::*;
