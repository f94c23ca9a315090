pub mod analysis;
pub mod message;
pub mod record;

pub use analysis::*;
pub use message::*;
pub use record::*;
