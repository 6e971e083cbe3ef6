//! JSON decoding on top of the request dispatcher.
//!
//! Success responses are decoded from their body text; the original
//! [`HttpResponse`](crate::HttpResponse) status and body are preserved in
//! the error when the payload is not the requested shape, so a misbehaving
//! endpoint can be diagnosed from the error alone.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::client::HttpClient;
use crate::error::HttpError;
use crate::types::{HttpResponse, RequestBody};

impl HttpResponse {
    /// Decodes the body as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Status`] carrying this response's status and raw
    /// body when the body is not valid JSON or is valid JSON of another
    /// shape (array, string, number, boolean or null).
    pub fn into_json_object(self) -> Result<Map<String, Value>, HttpError> {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(Value::Object(object)) => Ok(object),
            _ => Err(undecodable(self)),
        }
    }

    /// Decodes the body as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Status`] carrying this response's status and raw
    /// body when the body is not a JSON array.
    pub fn into_json_array(self) -> Result<Vec<Value>, HttpError> {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(Value::Array(items)) => Ok(items),
            _ => Err(undecodable(self)),
        }
    }

    /// Decodes the body into a deserializable type.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        match serde_json::from_str(&self.body) {
            Ok(decoded) => Ok(decoded),
            Err(_) => Err(undecodable(self)),
        }
    }
}

/// A response that reached the caller as a success but cannot be delivered
/// in the requested shape; the original status and body travel in the error.
fn undecodable(response: HttpResponse) -> HttpError {
    HttpError::Status {
        status: response.status,
        body: response.body,
    }
}

impl HttpClient {
    /// Sends a GET request and decodes the response body as a JSON object.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use minotari_http::HttpClient;
    ///
    /// # async fn example() -> Result<(), anyhow::Error> {
    /// let client = HttpClient::new();
    /// let info = client.get_json_object("https://node.example.com/info").await?;
    /// if let Some(height) = info.get("height") {
    ///     println!("chain height: {}", height);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_json_object(&self, url: &str) -> Result<Map<String, Value>, HttpError> {
        self.get(url).await?.into_json_object()
    }

    /// Sends a GET request and decodes the response body as a JSON array.
    pub async fn get_json_array(&self, url: &str) -> Result<Vec<Value>, HttpError> {
        self.get(url).await?.into_json_array()
    }

    /// Sends a GET request and decodes the response body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.get(url).await?.into_json()
    }

    /// Sends a POST request and decodes the response body as a JSON object.
    pub async fn post_json_object(
        &self,
        url: &str,
        body: RequestBody,
        headers: &[(&str, &str)],
    ) -> Result<Map<String, Value>, HttpError> {
        self.post(url, body, headers).await?.into_json_object()
    }

    /// Sends a POST request and decodes the response body into `T`.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: RequestBody,
        headers: &[(&str, &str)],
    ) -> Result<T, HttpError> {
        self.post(url, body, headers).await?.into_json()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde::Deserialize;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_json_object_is_decoded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"height":42,"synced":true}"#))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let info = client.get_json_object(&format!("{}/info", mock_server.uri())).await.unwrap();

        assert_eq!(info.get("height"), Some(&Value::from(42)));
        assert_eq!(info.get("synced"), Some(&Value::Bool(true)));
    }

    #[tokio::test]
    async fn test_json_array_is_decoded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blocks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1,2,3]"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let blocks = client.get_json_array(&format!("{}/blocks", mock_server.uri())).await.unwrap();

        assert_eq!(blocks, vec![Value::from(1), Value::from(2), Value::from(3)]);
    }

    #[tokio::test]
    async fn test_wrong_json_shape_keeps_original_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blocks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1,2,3]"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let err = client
            .get_json_object(&format!("{}/blocks", mock_server.uri()))
            .await
            .unwrap_err();

        assert_eq!(err, HttpError::Status {
            status: StatusCode::OK,
            body: "[1,2,3]".to_string(),
        });
    }

    #[tokio::test]
    async fn test_array_decode_of_object_body_keeps_original_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"height":42}"#))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let err = client
            .get_json_array(&format!("{}/info", mock_server.uri()))
            .await
            .unwrap_err();

        assert_eq!(err, HttpError::Status {
            status: StatusCode::OK,
            body: r#"{"height":42}"#.to_string(),
        });
    }

    #[tokio::test]
    async fn test_non_json_body_keeps_original_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let err = client.get_json_object(&format!("{}/info", mock_server.uri())).await.unwrap_err();

        assert_eq!(err, HttpError::Status {
            status: StatusCode::OK,
            body: "<html>not json</html>".to_string(),
        });
    }

    #[tokio::test]
    async fn test_typed_response_is_decoded() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct TipInfo {
            height: u64,
            best_block: String,
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"height":128,"best_block":"abc123"}"#),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let tip: TipInfo = client
            .post_json(
                &format!("{}/rpc", mock_server.uri()),
                RequestBody::Text(r#"{"method":"get_tip_info"}"#.to_string()),
                &[("Content-Type", "application/json")],
            )
            .await
            .unwrap();

        assert_eq!(tip, TipInfo {
            height: 128,
            best_block: "abc123".to_string(),
        });
    }

    #[tokio::test]
    async fn test_typed_get_response_is_decoded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/heights"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[7,8,9]"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let heights: Vec<u64> = client.get_json(&format!("{}/heights", mock_server.uri())).await.unwrap();

        assert_eq!(heights, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn test_post_json_object_is_decoded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc"))
            .and(body_string(r#"{"method":"submit_block"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"accepted"}"#))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let reply = client
            .post_json_object(
                &format!("{}/rpc", mock_server.uri()),
                RequestBody::Text(r#"{"method":"submit_block"}"#.to_string()),
                &[("Content-Type", "application/json")],
            )
            .await
            .unwrap();

        assert_eq!(reply.get("status"), Some(&Value::from("accepted")));
    }

    #[tokio::test]
    async fn test_error_status_is_not_decoded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(503).set_body_string(r#"{"error":"maintenance"}"#))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let err = client.get_json_object(&format!("{}/info", mock_server.uri())).await.unwrap_err();

        // The status classification runs first; a well-formed JSON body on
        // an error status still surfaces as that status.
        assert_eq!(err, HttpError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: r#"{"error":"maintenance"}"#.to_string(),
        });
    }
}
