//! Timetable markup sources.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::PlancalConfig;
use crate::error::{PlancalError, PlancalResult};

/// Anything that can return the raw timetable markup for a sub-group id.
pub trait ScheduleSource {
    fn fetch(&self, id: &str) -> PlancalResult<String>;
}

/// Fetches `<endpoint>?typ=G&id=<id>&okres=<period>` with a blocking client.
pub struct HttpScheduleSource {
    client: Client,
    endpoint: String,
    period: u32,
}

impl HttpScheduleSource {
    pub fn new(endpoint: &str, period: u32, timeout: Option<Duration>) -> PlancalResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlancalError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(HttpScheduleSource {
            client,
            endpoint: endpoint.to_string(),
            period,
        })
    }

    pub fn from_config(config: &PlancalConfig) -> PlancalResult<Self> {
        Self::new(
            &config.endpoint,
            config.period,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }
}

impl ScheduleSource for HttpScheduleSource {
    fn fetch(&self, id: &str) -> PlancalResult<String> {
        let network_error = |e: reqwest::Error| PlancalError::Network {
            id: id.to_string(),
            message: e.to_string(),
        };

        let period = self.period.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("typ", "G"), ("id", id), ("okres", period.as_str())])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(network_error)?;

        // The timetable serves Polish text; decode as UTF-8 whatever the headers claim.
        let body = response.bytes().map_err(network_error)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Reads previously saved pages from `<dir>/<id>.html`.
pub struct FileScheduleSource {
    dir: PathBuf,
}

impl FileScheduleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileScheduleSource { dir: dir.into() }
    }
}

impl ScheduleSource for FileScheduleSource {
    fn fetch(&self, id: &str) -> PlancalResult<String> {
        read_page(&self.dir.join(format!("{id}.html")))
    }
}

/// Read a saved timetable page, decoding it as UTF-8 the way fetched pages are.
pub fn read_page(path: &Path) -> PlancalResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl<S: ScheduleSource + ?Sized> ScheduleSource for &S {
    fn fetch(&self, id: &str) -> PlancalResult<String> {
        (**self).fetch(id)
    }
}

impl<S: ScheduleSource + ?Sized> ScheduleSource for Box<S> {
    fn fetch(&self, id: &str) -> PlancalResult<String> {
        (**self).fetch(id)
    }
}
