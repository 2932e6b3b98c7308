//! Server-side cart endpoints.

use async_trait::async_trait;
use mockall::automock;
use sabzi::{
    cart::CartItem,
    payload::{CART_ENVELOPE_KEYS, list_from_envelope, parse_entries},
    products::ProductId,
};
use serde_json::json;

use super::{ApiError, HttpBackend};

/// The authoritative cart kept by the backend.
#[automock]
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetch the server's cart lines.
    ///
    /// A body carrying `"success": false` is an [`ApiError::Rejected`], whatever the status.
    /// Returns [`ApiError::Malformed`] when the body holds no recognisable list.
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, ApiError>;

    /// Tell the server `quantity` units of `product_id` were added.
    async fn add_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError>;
}

#[async_trait]
impl CartApi for HttpBackend {
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let reply = self.send(self.get("cart/")).await?;

        if reply.refused() {
            return Err(reply.rejection(&["user_msg"]));
        }

        let body = reply.into_body(&["user_msg"])?;

        list_from_envelope(body, CART_ENVELOPE_KEYS)
            .map(parse_entries)
            .ok_or_else(|| ApiError::Malformed("cart/ did not return a list".to_string()))
    }

    async fn add_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        let body = json!({
            "product_id": product_id.to_json(),
            "quantity": quantity,
        });

        let reply = self.send(self.post("cart/add/", &body)).await?;

        if reply.status.is_success() && reply.succeeded() {
            return Ok(());
        }

        Err(reply.rejection(&["quantity", "user_msg"]))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;
    use crate::api::BackendConfig;

    /// Serve a single request with a 200 reply carrying `body`, returning the API base URL.
    async fn serve_once(body: &'static str) -> TestResult<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0_u8; 4096];
                _ = socket.read(&mut request).await;

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );

                _ = socket.write_all(response.as_bytes()).await;
                _ = socket.shutdown().await;
            }
        });

        Ok(format!("http://{address}/api/"))
    }

    fn backend(base_url: String) -> HttpBackend {
        HttpBackend::new(BackendConfig {
            base_url,
            token: None,
            catalog_timeout: Duration::from_secs(5),
            legacy_catalog_timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn refusal_with_ok_status_is_rejected() -> TestResult {
        let base_url =
            serve_once(r#"{"success": false, "user_msg": "Session expired, please log in"}"#)
                .await?;

        let result = backend(base_url).fetch_cart().await;

        assert!(matches!(
            result,
            Err(ApiError::Rejected { status: 200, message: Some(ref message) }) if message == "Session expired, please log in"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn wrapped_items_are_parsed() -> TestResult {
        let base_url = serve_once(
            r#"{"success": true, "data": [{"product": {"id": 4, "name": "Okra", "base_price": "35"}, "quantity": 2}]}"#,
        )
        .await?;

        let items = backend(base_url).fetch_cart().await?;

        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(|item| item.quantity), Some(2));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_shape_is_malformed() -> TestResult {
        let base_url = serve_once(r#"{"cart": "soon"}"#).await?;

        let result = backend(base_url).fetch_cart().await;

        assert!(matches!(result, Err(ApiError::Malformed(_))));

        Ok(())
    }
}
