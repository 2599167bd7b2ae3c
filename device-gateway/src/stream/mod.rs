//! Live event stream from the device hub.
//!
//! One WebSocket per client. Frames are relayed to the [`EventBus`] in arrival
//! order; drops are retried with bounded exponential backoff until the
//! [`ReconnectPolicy`] gives up or the client disconnects.
//!
//! [`EventBus`]: crate::bus::EventBus

mod backoff;
mod connection;

pub use backoff::ReconnectPolicy;
pub(crate) use connection::{StreamHandle, StreamTask};

use url::Url;

use crate::error::{Error, Result};

/// Derive the stream URL: `http` becomes `ws`, `https` becomes `wss`, and
/// `path` is appended to whatever path the base URL already has.
pub fn stream_url(base_url: &str, path: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                other, base_url
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| Error::InvalidUrl(format!("cannot use {} as a stream URL", base_url)))?;

    let joined = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
