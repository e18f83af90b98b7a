//! Commonly used utilities like handles and hash containers.

#[macro_use]
pub mod handle;
pub mod handle_pool;
pub mod hash;

pub use self::handle::{Handle, HandleIndex};
pub use self::handle_pool::HandlePool;
pub use self::hash::{FastHashMap, FastHashSet};
