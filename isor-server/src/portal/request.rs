//! Requests and responses exchanged with the portal.

use reqwest::Url;
use uuid::Uuid;

use crate::domain::LocoNumber;

/// Default location of the portal.
pub const DEFAULT_BASE_URL: &str = "https://isor.spravazeleznic.cz/";

/// Pages of the portal the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Login form
    Login,
    /// Locomotive position query (D1320)
    Locomotive,
    /// Train route query (D2040)
    Train,
}

impl Endpoint {
    /// Absolute path of the page.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "/Login/Login",
            Endpoint::Locomotive => "/Dotazy/D1320",
            Endpoint::Train => "/Dotazy/D2040",
        }
    }
}

/// Resolved URLs of every endpoint.
#[derive(Debug, Clone)]
pub(crate) struct PortalUrls {
    login: Url,
    locomotive: Url,
    train: Url,
}

impl PortalUrls {
    pub(crate) fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url)?;
        Ok(Self {
            login: base.join(Endpoint::Login.path())?,
            locomotive: base.join(Endpoint::Locomotive.path())?,
            train: base.join(Endpoint::Train.path())?,
        })
    }

    pub(crate) fn get(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Login => &self.login,
            Endpoint::Locomotive => &self.locomotive,
            Endpoint::Train => &self.train,
        }
    }
}

/// A form POST waiting to be sent to the portal.
///
/// Field names are part of the portal's wire contract.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    id: Uuid,
    endpoint: Endpoint,
    form: Vec<(&'static str, String)>,
}

impl PendingRequest {
    /// Create a request with a fresh identity.
    pub fn new(endpoint: Endpoint, form: Vec<(&'static str, String)>) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint,
            form,
        }
    }

    /// Position query for one locomotive.
    pub fn locomotive(loco: &LocoNumber) -> Self {
        Self::new(
            Endpoint::Locomotive,
            vec![("cisloLokomotivy", loco.full().to_string())],
        )
    }

    /// Route query for one train.
    pub fn train(train_number: &str) -> Self {
        Self::new(
            Endpoint::Train,
            vec![
                ("cisloVlaku", train_number.to_string()),
                ("identifikace", String::new()),
                ("filtraceBodu", "2".to_string()),
            ],
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn form(&self) -> &[(&'static str, String)] {
        &self.form
    }
}

/// The portal's answer to a [`PendingRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalResponse {
    /// Identity of the request this answers
    pub id: Uuid,
    /// HTTP status code
    pub status: u16,
    /// Raw page body
    pub body: String,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
