//! Blocking HTTP GET that decodes the JSON body into a caller-chosen type.

use crate::error::FetchError;
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

/// A decoded response together with the HTTP status it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub status: u16,
    pub value: T,
}

/// Thin wrapper over a blocking reqwest client.
///
/// Exactly one attempt is made per call. Non-2xx statuses are not interpreted:
/// the body is decoded whatever the status, and the status is returned
/// alongside the value (or inside the error) for the caller to inspect.
/// A deadline, if wanted, belongs on the client passed to [`Fetcher::with_client`].
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Fetcher {
        Fetcher::default()
    }

    pub fn with_client(client: Client) -> Fetcher {
        Fetcher { client }
    }

    /// GET `url`, read the whole body and decode it as JSON into `T`
    pub fn get<T: DeserializeOwned>(&self, url: &str) -> Result<Fetched<T>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| FetchError::Body {
            url: url.to_string(),
            status,
            message: e.to_string(),
        })?;
        debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        match serde_json::from_slice::<T>(&body) {
            Ok(value) => Ok(Fetched { status, value }),
            Err(_) => Err(FetchError::Decode {
                url: url.to_string(),
                status,
                body: body.to_vec(),
            }),
        }
    }
}

/// Shorthand for a one-off GET with a default client.
pub fn get<T: DeserializeOwned>(url: &str) -> Result<Fetched<T>, FetchError> {
    Fetcher::new().get(url)
}
