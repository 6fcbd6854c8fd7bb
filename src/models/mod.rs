pub mod report;
pub mod upload;
pub mod usage;
pub mod user;

pub use report::*;
pub use upload::*;
pub use usage::*;
pub use user::*;
