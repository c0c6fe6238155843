//! Pieces shared by every Herd binary: logging setup, runtime environment
//! checks and the small wire types the HTTP layer returns.

pub mod types;
pub mod utils;
pub mod env;
