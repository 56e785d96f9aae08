//! Type definitions

pub mod catalog;
pub mod messages;
pub mod report;
pub mod row;
pub mod schema;
pub mod state;

pub use catalog::*;
pub use messages::*;
pub use report::*;
pub use row::*;
pub use schema::*;
pub use state::*;
