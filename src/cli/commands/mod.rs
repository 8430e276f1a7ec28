pub mod check;
mod command_result;
pub mod explain;
pub mod init;

pub use command_result::*;
