use serde::Serialize;

/// The authenticated identity a mutating operation is attributed to.
///
/// Actors are produced by the auth layer from a verified bearer token; the
/// services only ever receive an already resolved value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: String,
    pub email: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }

    /// An actor without an identifier cannot be attributed anything.
    pub fn is_anonymous(&self) -> bool {
        self.id.trim().is_empty()
    }
}
