//! Active/fallback RPC endpoint bookkeeping.
//!
//! Requests go to the active URL. A rate-limit status or a send failure promotes the first
//! healthy fallback and the request is replayed there; the demoted URL joins the back of the
//! fallback list.

use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::services::blockchain::transports::{
	RotatingTransport, TransportError, ROTATE_ON_ERROR_CODES,
};

/// Tracks the active endpoint and its fallbacks
#[derive(Clone, Debug)]
pub struct EndpointManager {
	pub active_url: Arc<RwLock<String>>,
	pub fallback_urls: Arc<RwLock<Vec<String>>>,
	client: ClientWithMiddleware,
	rotation_lock: Arc<Mutex<()>>,
}

impl EndpointManager {
	/// # Arguments
	/// * `client` - HTTP client shared by every endpoint
	/// * `active_url` - Endpoint used first
	/// * `fallback_urls` - Endpoints to promote when the active one fails, in order
	pub fn new(client: ClientWithMiddleware, active_url: &str, fallback_urls: Vec<String>) -> Self {
		Self {
			active_url: Arc::new(RwLock::new(active_url.to_string())),
			fallback_urls: Arc::new(RwLock::new(fallback_urls)),
			client,
			rotation_lock: Arc::new(Mutex::new(())),
		}
	}

	/// Promotes the first fallback that accepts a connection.
	///
	/// # Returns
	/// * `Result<String, TransportError>` - The new active URL, or `UrlRotation` when none is usable
	pub async fn try_rotate_url<T: RotatingTransport>(
		&self,
		transport: &T,
	) -> Result<String, TransportError> {
		let _guard = self.rotation_lock.lock().await;
		let previous = self.active_url.read().await.clone();
		let candidates: Vec<String> = self
			.fallback_urls
			.read()
			.await
			.iter()
			.filter(|url| **url != previous)
			.cloned()
			.collect();

		if candidates.is_empty() {
			return Err(TransportError::url_rotation(
				format!("No fallback URL available to replace '{}'", previous),
				None,
				None,
			));
		}

		let mut last_error = None;
		for candidate in candidates {
			tracing::debug!(from = %previous, to = %candidate, "rotating RPC endpoint");

			if let Err(e) = transport.try_connect(&candidate).await {
				tracing::warn!(url = %candidate, error = %e, "fallback endpoint rejected connection");
				last_error = Some(e);
				continue;
			}
			if let Err(e) = transport.update_client(&candidate).await {
				last_error = Some(e);
				continue;
			}

			let mut fallbacks = self.fallback_urls.write().await;
			fallbacks.retain(|url| *url != candidate);
			fallbacks.push(previous.clone());
			*self.active_url.write().await = candidate.clone();

			tracing::info!(from = %previous, to = %candidate, "RPC endpoint rotated");
			return Ok(candidate);
		}

		Err(TransportError::url_rotation(
			format!("Every fallback for '{}' failed to connect", previous),
			last_error.map(|e| e.into()),
			None,
		))
	}

	/// Sends a JSON-RPC request to the active endpoint, rotating on rate limits and send errors.
	///
	/// Each known endpoint is tried at most once per request.
	///
	/// # Arguments
	/// * `transport` - Transport used for request shaping and endpoint health checks
	/// * `method` - JSON-RPC method name
	/// * `params` - JSON-RPC params
	///
	/// # Returns
	/// * `Result<Value, TransportError>` - Parsed JSON-RPC response object
	pub async fn send_raw_request<T: RotatingTransport>(
		&self,
		transport: &T,
		method: &str,
		params: Option<Value>,
	) -> Result<Value, TransportError> {
		let body = transport.customize_request(method, params);
		let mut rotations_left = self.fallback_urls.read().await.len();

		loop {
			let url = self.active_url.read().await.clone();
			tracing::debug!(%url, %method, "sending RPC request");

			let response = match self.client.post(&url).json(&body).send().await {
				Ok(response) => response,
				Err(send_error) => {
					tracing::warn!(%url, error = %send_error, "RPC request failed to send");
					match self.rotate_within(transport, &mut rotations_left).await {
						Ok(_) => continue,
						Err(rotation_error) => {
							return Err(TransportError::network(
								send_error.to_string(),
								Some(Box::new(rotation_error)),
								None,
							));
						}
					}
				}
			};

			let status = response.status();
			if status.is_success() {
				return response.json().await.map_err(|e| {
					TransportError::response_parse(
						format!("Invalid JSON from {}", url),
						Some(Box::new(e)),
						None,
					)
				});
			}

			let error_body = response.text().await.unwrap_or_default();
			if !ROTATE_ON_ERROR_CODES.contains(&status.as_u16()) {
				return Err(TransportError::http(status, url, error_body, None, None));
			}

			tracing::warn!(%url, %status, "RPC endpoint rate limited");
			if let Err(rotation_error) = self.rotate_within(transport, &mut rotations_left).await {
				return Err(TransportError::http(
					status,
					url,
					error_body,
					Some(Box::new(rotation_error)),
					None,
				));
			}
		}
	}

	async fn rotate_within<T: RotatingTransport>(
		&self,
		transport: &T,
		rotations_left: &mut usize,
	) -> Result<String, TransportError> {
		if *rotations_left == 0 {
			return Err(TransportError::url_rotation(
				"Every RPC endpoint was tried for this request",
				None,
				None,
			));
		}
		*rotations_left -= 1;
		self.try_rotate_url(transport).await
	}
}
