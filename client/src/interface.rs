use alloy::json_abi::JsonAbi;
use ethbank_common::abi::{self, AbiError};

/// Errors loading the contract interface description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterfaceError {
    #[error("failed to fetch interface from {location}: {reason}")]
    Fetch { location: String, reason: String },
    #[error(transparent)]
    Parse(#[from] AbiError),
}

/// Where the interface description document comes from (a fixed path on the
/// page's origin, a URL, a file).
#[allow(async_fn_in_trait)]
pub trait InterfaceSource {
    /// Raw document body.
    async fn fetch(&self) -> Result<String, InterfaceError>;

    /// Human-readable location for logs.
    fn location(&self) -> &str;
}

/// Fetch and parse the document.
pub async fn load_interface<I: InterfaceSource>(source: &I) -> Result<JsonAbi, InterfaceError> {
    let body = source.fetch().await?;
    let abi = abi::parse_interface(&body)?;
    tracing::debug!(
        "Loaded interface from {} ({} functions, {} events)",
        source.location(),
        abi.functions().count(),
        abi.events().count()
    );
    Ok(abi)
}

/// An interface document already in memory.
#[derive(Debug, Clone)]
pub struct StaticInterface {
    body: String,
}

impl StaticInterface {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl InterfaceSource for StaticInterface {
    async fn fetch(&self) -> Result<String, InterfaceError> {
        Ok(self.body.clone())
    }

    fn location(&self) -> &str {
        "<memory>"
    }
}
