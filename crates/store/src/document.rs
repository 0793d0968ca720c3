use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// A record a [`Collection`](crate::Collection) can hold.
///
/// The id must be unique within the collection and stable for the record's
/// lifetime; UUIDv7 ids additionally keep the collection in insertion order.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}
