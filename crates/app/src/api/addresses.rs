//! Saved address endpoint.

use async_trait::async_trait;
use mockall::automock;
use sabzi::{
    checkout::Address,
    payload::{DATA_ENVELOPE_KEYS, parse_list},
};

use super::{ApiError, HttpBackend};

/// The customer's saved delivery addresses.
#[automock]
#[async_trait]
pub trait AddressesApi: Send + Sync {
    /// List saved addresses.
    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError>;
}

#[async_trait]
impl AddressesApi for HttpBackend {
    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let body = self
            .send(self.get("addresses/"))
            .await?
            .into_body(&["detail"])?;

        Ok(parse_list(body, DATA_ENVELOPE_KEYS))
    }
}
