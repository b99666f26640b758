/// Anything with an owning user.
pub trait Owned {
    fn owner_id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("caller does not own this entity")]
pub struct NotOwner;

/// Exact string comparison of the stored owner against the caller.
pub fn assert_owner<T: Owned + ?Sized>(entity: &T, caller_id: &str) -> Result<(), NotOwner> {
    if entity.owner_id() == caller_id {
        Ok(())
    } else {
        Err(NotOwner)
    }
}
