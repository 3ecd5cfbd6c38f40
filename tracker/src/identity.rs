use crate::client::Client;
use crate::store::{Scope, StoreError};

/// Storage key for the persistent visitor identifier.
pub const VISITOR_ID_KEY: &str = "_skai_uuid";

/// Returns the visitor identifier for this client, generating and
/// persisting a fresh one the first time the client is seen.
///
/// The identifier is written with `Scope::Infinite` so it survives
/// session resets. A store failure surfaces to the caller instead of
/// minting a new identifier; minting on transient errors would hand the
/// same visitor multiple identities.
pub fn get_or_create_visitor_id(client: &Client) -> Result<String, StoreError> {
    if let Some(id) = client.get(VISITOR_ID_KEY)? {
        return Ok(id);
    }

    let id = uuid::Uuid::new_v4().to_string();
    client.set(VISITOR_ID_KEY, &id, Scope::Infinite)?;
    Ok(id)
}
