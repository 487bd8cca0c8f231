use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClassifierError, ConfigError};
use crate::image::ImageUpload;

/// Anything that turns an uploaded image into a raw classifier response.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, upload: ImageUpload) -> Result<Value, ClassifierError>;
}

/// Posts the image as a multipart form to the classifier service.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    file_field: String,
}

impl HttpClassifier {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        reqwest::Url::parse(&config.endpoint)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| ConfigError::InvalidValue {
                name: "endpoint",
                value: config.endpoint.clone(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            file_field: config.file_field.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(&self, upload: ImageUpload) -> Form {
        let bytes = upload.bytes.as_ref().clone();
        let part = match Part::bytes(bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
        {
            Ok(part) => part,
            Err(e) => {
                log::warn!("Sending {} without content type: {}", upload.file_name, e);
                Part::bytes(bytes).file_name(upload.file_name)
            }
        };
        Form::new().part(self.file_field.clone(), part)
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, upload: ImageUpload) -> Result<Value, ClassifierError> {
        log::info!("Sending {} to {}", upload.file_name, self.endpoint);
        let form = self.build_form(upload);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                log::error!("Request to {} failed: {}", self.endpoint, e);
                ClassifierError::TransportUnreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Classifier returned {}: {}", status, body);
            return Err(ClassifierError::from_status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClassifierError::TransportUnreachable(e.to_string()))?;
        let raw: Value = serde_json::from_str(&body)
            .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;
        log::debug!("Classifier response: {}", raw);
        Ok(raw)
    }
}

/// Answers every request with the same canned response after a delay,
/// without touching the network.
pub struct SimulatedClassifier {
    latency: Duration,
}

impl SimulatedClassifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Classifier for SimulatedClassifier {
    async fn classify(&self, upload: ImageUpload) -> Result<Value, ClassifierError> {
        log::info!("Simulating classification of {} ({:?})", upload.file_name, self.latency);
        tokio::time::sleep(self.latency).await;
        Ok(shared::simulation::simulated_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn upload() -> ImageUpload {
        ImageUpload {
            file_name: "mole.png".into(),
            mime_type: "image/png".into(),
            bytes: Arc::new(vec![1, 2, 3]),
        }
    }

    fn config_for(endpoint: String) -> ClientConfig {
        ClientConfig {
            endpoint,
            request_timeout_secs: 5,
            ..ClientConfig::default()
        }
    }

    /// Serves one canned HTTP response on a local port and returns the
    /// request it received.
    async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if n == 0 || text.contains("--\r\n") {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).into_owned()
        });
        (format!("http://{}/predict", addr), handle)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn posts_multipart_and_returns_json() {
        let (endpoint, server) =
            serve_once(http_response("200 OK", r#"{"class":"Melanoma","confidence":0.87}"#)).await;
        let classifier = HttpClassifier::new(&config_for(endpoint)).unwrap();

        let raw = classifier.classify(upload()).await.unwrap();
        assert_eq!(raw["class"], "Melanoma");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /predict"));
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains(r#"name="file"; filename="mole.png""#));
        assert!(request.contains("image/png"));
    }

    #[tokio::test]
    async fn server_failure_is_categorized() {
        let (endpoint, _server) = serve_once(http_response("503 Service Unavailable", "{}")).await;
        let classifier = HttpClassifier::new(&config_for(endpoint)).unwrap();
        let err = classifier.classify(upload()).await.unwrap_err();
        assert_eq!(err, ClassifierError::ServerError(503));
    }

    #[tokio::test]
    async fn client_failure_keeps_status() {
        let (endpoint, _server) =
            serve_once(http_response("400 Bad Request", r#"{"error":"bad image"}"#)).await;
        let classifier = HttpClassifier::new(&config_for(endpoint)).unwrap();
        let err = classifier.classify(upload()).await.unwrap_err();
        assert_eq!(err, ClassifierError::HttpError(400));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let (endpoint, _server) = serve_once(http_response("200 OK", "<html>oops</html>")).await;
        let classifier = HttpClassifier::new(&config_for(endpoint)).unwrap();
        let err = classifier.classify(upload()).await.unwrap_err();
        assert!(matches!(err, ClassifierError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let classifier =
            HttpClassifier::new(&config_for(format!("http://{}/predict", addr))).unwrap();
        let err = classifier.classify(upload()).await.unwrap_err();
        assert!(matches!(err, ClassifierError::TransportUnreachable(_)));
    }

    #[test]
    fn endpoint_without_http_scheme_is_a_config_error() {
        for endpoint in ["127.0.0.1:8000/predict", "classifier:8000/predict", "ftp://host/predict"] {
            let err = HttpClassifier::new(&config_for(endpoint.to_string())).err().unwrap();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { name: "endpoint", ref value } if value == endpoint
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_classifier_waits_then_answers() {
        let classifier = SimulatedClassifier::new(Duration::from_millis(2000));
        let started = tokio::time::Instant::now();
        let raw = classifier.classify(upload()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert_eq!(raw, shared::simulation::simulated_response());
    }
}
