//! Product identity.

use std::hash::{Hash, Hasher};

use crate::config::PRODUCT_ID_QUERY_PARAM;
use crate::error_handling::IdentityError;

/// Identifies one monitored product.
///
/// Immutable once created. Two identities are the same product iff their URLs
/// are equal: the same product id can appear under several locale URLs, and
/// each of those is monitored separately.
#[derive(Debug, Clone, Eq)]
pub struct ProductIdentity {
    url: String,
    product_id: String,
    market_id: String,
}

impl ProductIdentity {
    /// Builds an identity from a product page URL.
    ///
    /// The product id is the `v1` query parameter, e.g.
    /// `https://www.zara.com/pt/pt/vestido-p02452331.html?v1=431706812`
    /// yields `431706812`.
    ///
    /// # Errors
    ///
    /// - `IdentityError::InvalidUrl` if `url` is not an absolute http(s) URL
    /// - `IdentityError::MissingProductId` if the `v1` parameter is absent or empty
    pub fn parse(url: &str, market_id: &str) -> Result<Self, IdentityError> {
        let url = url.trim();
        let parsed =
            url::Url::parse(url).map_err(|_| IdentityError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(IdentityError::InvalidUrl(url.to_string()));
        }

        let product_id = parsed
            .query_pairs()
            .find(|(key, _)| key == PRODUCT_ID_QUERY_PARAM)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| IdentityError::MissingProductId {
                url: url.to_string(),
                param: PRODUCT_ID_QUERY_PARAM,
            })?;

        Ok(Self {
            url: url.to_string(),
            product_id,
            market_id: market_id.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }
}

impl PartialEq for ProductIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Hash for ProductIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}
