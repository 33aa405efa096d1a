/*!
 * Permission Backend
 * Storage seam for groups and users
 */

pub mod memory;
pub mod traits;
pub mod types;

pub use memory::MemoryBackend;
pub use traits::Backend;
pub use types::{link_groups, GroupTable, Snapshot, StoredGroup, StoredUser};
