use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::*;

/// Error body the server sends with every non-2xx status.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    errors: Vec<String>,
}

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .gzip(true)
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Decodes a 2xx JSON body, or turns the server's error body into [`Error::Api`].
pub(crate) async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    let requested_url = resp.url().to_string();
    let bytes = resp.bytes().await?;

    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes)?);
    }

    log::debug!("{} returned {}", requested_url, status);
    match serde_json::from_slice::<ErrorBody>(&bytes) {
        Ok(body) => Err(Error::Api {
            status,
            message: body.message,
            errors: body.errors,
            requested_url,
        }),
        Err(_) => Err(Error::UnexpectedResponseCode {
            got: status,
            requested_url,
        }),
    }
}

pub(crate) fn is_not_found(e: &Error) -> bool {
    e.status() == Some(StatusCode::NOT_FOUND)
}
