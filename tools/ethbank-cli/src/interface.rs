use ethbank_client::interface::{InterfaceError, InterfaceSource};

/// Interface document at an `http(s)://` URL or a local path.
#[derive(Debug, Clone)]
pub struct InterfaceLocation {
    location: String,
}

impl InterfaceLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    fn fetch_error(&self, reason: impl ToString) -> InterfaceError {
        InterfaceError::Fetch {
            location: self.location.clone(),
            reason: reason.to_string(),
        }
    }
}

impl InterfaceSource for InterfaceLocation {
    async fn fetch(&self) -> Result<String, InterfaceError> {
        if !self.is_remote() {
            return tokio::fs::read_to_string(&self.location)
                .await
                .map_err(|e| self.fetch_error(e));
        }

        let response = reqwest::get(&self.location)
            .await
            .map_err(|e| self.fetch_error(e))?;
        if !response.status().is_success() {
            return Err(self.fetch_error(format!("HTTP {}", response.status())));
        }
        response.text().await.map_err(|e| self.fetch_error(e))
    }

    fn location(&self) -> &str {
        &self.location
    }
}
