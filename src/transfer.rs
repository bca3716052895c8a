//! Authenticated HTTP transfers from the build server.
//!
//! Every request carries the basic-auth header. Response bodies are copied to
//! the destination in fixed-size chunks as they arrive, so memory use does not
//! depend on artifact size. There is no retry and no resume: a failure stops the
//! transfer where it is and is returned to the caller.

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use futures::TryStreamExt;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;
use url::Url;

/// Size of the buffer each body chunk is read into before it is written out
pub const TRANSFER_CHUNK_SIZE: usize = 1024;

/// Path below the server root that serves build artifacts behind basic auth
const DOWNLOAD_PREFIX: [&str; 3] = ["httpAuth", "repository", "download"];

/// Location of one build's artifact tree on the server
#[derive(Clone, Debug)]
pub struct BuildLocation {
    base: Url,
    build_type: String,
    build_id: String,
}

impl BuildLocation {
    /// Describe the artifact tree of `build_type`/`build_id` below `base`
    pub fn new(base: Url, build_type: impl Into<String>, build_id: impl Into<String>) -> Self {
        Self {
            base,
            build_type: build_type.into(),
            build_id: build_id.into(),
        }
    }

    /// URL of a file in the artifact tree.
    ///
    /// `remote_path` is `/`-separated; each segment is percent-encoded on its
    /// own. A context path on the base URL (e.g. `/teamcity`) is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use tcad::transfer::BuildLocation;
    /// use url::Url;
    ///
    /// let base = Url::parse("http://ci.example.com/").unwrap();
    /// let build = BuildLocation::new(base, "bt1", "lastFinished");
    /// assert_eq!(
    ///     build.file_url("docs/read me.txt").unwrap().as_str(),
    ///     "http://ci.example.com/httpAuth/repository/download/bt1/lastFinished/docs/read%20me.txt"
    /// );
    /// ```
    pub fn file_url(&self, remote_path: &str) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::config("url", format!("'{}' cannot be used as a base URL", self.base))
            })?;
            segments
                .pop_if_empty()
                .extend(DOWNLOAD_PREFIX)
                .push(&self.build_type)
                .push(&self.build_id)
                .extend(remote_path.split('/'));
        }
        Ok(url)
    }
}

/// Failure while copying a response body, split by which side failed
#[derive(Debug)]
enum StreamError {
    /// The request, the status, or reading the body failed
    Remote(io::Error),
    /// Writing to the local sink failed
    Sink(io::Error),
}

/// HTTP client bound to one set of credentials
#[derive(Clone, Debug)]
pub struct Transfer {
    client: reqwest::Client,
    authorization: HeaderValue,
    request_timeout: Duration,
}

impl Transfer {
    /// Create a client sending `credentials` with every request.
    ///
    /// `timeout` bounds connection setup for every request, and the whole
    /// request for in-memory fetches. Artifact downloads are not bounded in
    /// total since artifacts can be arbitrarily large.
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&credentials.basic_auth_header())
            .map_err(|_| Error::config("username", "credentials cannot be sent in an HTTP header"))?;
        authorization.set_sensitive(true);

        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .user_agent(concat!("tcad/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            authorization,
            request_timeout: timeout,
        })
    }

    /// Fetch a resource into memory
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let response = self
            .send(url, Some(self.request_timeout))
            .await
            .map_err(|source| transfer_error(url, source))?;

        copy_body(response, &mut buffer)
            .await
            .map_err(|e| match e {
                StreamError::Remote(source) | StreamError::Sink(source) => {
                    transfer_error(url, source)
                }
            })?;
        Ok(buffer)
    }

    /// Download a resource into a local file, returning the number of bytes written.
    ///
    /// The file is created (or truncated) only once the server has accepted
    /// the request. An interrupted body leaves the partial file in place.
    pub async fn download_to_file(&self, url: &Url, path: &Path) -> Result<u64> {
        let response = self
            .send(url, None)
            .await
            .map_err(|source| transfer_error(url, source))?;

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|source| filesystem_error(path, source))?;

        let bytes = copy_body(response, &mut file).await.map_err(|e| match e {
            StreamError::Remote(source) => transfer_error(url, source),
            StreamError::Sink(source) => filesystem_error(path, source),
        })?;

        tracing::debug!(url = %url, path = %path.display(), bytes, "artifact written");
        Ok(bytes)
    }

    /// Issue one authenticated GET and check its status
    async fn send(&self, url: &Url, timeout: Option<Duration>) -> io::Result<reqwest::Response> {
        let mut request = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, self.authorization.clone());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                format!("connection failed: {e}")
            } else {
                format!("request failed: {e}")
            };
            io::Error::other(message)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(io::Error::other(format!("HTTP error {status}")));
        }

        tracing::trace!(url = %url, %status, content_length = ?response.content_length(), "response received");
        Ok(response)
    }
}

/// Copy a response body into `sink` chunk by chunk, returning the byte total
async fn copy_body<W>(
    response: reqwest::Response,
    sink: &mut W,
) -> std::result::Result<u64, StreamError>
where
    W: AsyncWrite + Unpin,
{
    let body = StreamReader::new(response.bytes_stream().map_err(io::Error::other));
    tokio::pin!(body);

    let mut chunk = [0u8; TRANSFER_CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let read = body.read(&mut chunk).await.map_err(StreamError::Remote)?;
        if read == 0 {
            break;
        }
        sink.write_all(&chunk[..read])
            .await
            .map_err(StreamError::Sink)?;
        total += read as u64;
    }
    sink.flush().await.map_err(StreamError::Sink)?;

    Ok(total)
}

fn transfer_error(url: &Url, source: io::Error) -> Error {
    Error::Transfer {
        url: url.to_string(),
        source,
    }
}

fn filesystem_error(path: &Path, source: io::Error) -> Error {
    Error::Filesystem {
        path: path.to_path_buf(),
        source,
    }
}
