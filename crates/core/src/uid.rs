//! External identifiers for library panels.
//!
//! UIDs are opaque short strings. Collisions are not prevented here; a
//! colliding insert surfaces as an `AlreadyExists` error from storage.

use uuid::Uuid;

/// Length of identifiers produced by [`ShortUidGenerator`].
pub const SHORT_UID_LENGTH: usize = 14;

/// Source of new library panel UIDs.
pub trait UidGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Default generator: the first [`SHORT_UID_LENGTH`] hex digits of a random
/// v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortUidGenerator;

impl UidGenerator for ShortUidGenerator {
    fn generate(&self) -> String {
        let mut uid = Uuid::new_v4().simple().to_string();
        uid.truncate(SHORT_UID_LENGTH);
        uid
    }
}
