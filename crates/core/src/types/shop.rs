//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input does not end in `.myshopify.com`.
    #[error("shop domain must end with {suffix}")]
    InvalidSuffix {
        /// Required suffix.
        suffix: &'static str,
    },
    /// The store handle before the suffix is malformed.
    #[error("invalid store name '{0}'")]
    InvalidName(String),
}

/// A Shopify shop domain, e.g. `my-store.myshopify.com`.
///
/// Every order record and every admin session is partitioned by this value,
/// so it is normalized (trimmed, lowercased) and validated once at the
/// boundary and passed around as a typed value afterwards.
///
/// ## Constraints
///
/// - Must end with `.myshopify.com`
/// - Store name: 1-60 characters of `a-z`, `0-9`, `-`, not starting with `-`
///
/// ## Examples
///
/// ```
/// use order_sync_core::ShopDomain;
///
/// let shop = ShopDomain::parse("Demo-Store.myshopify.com").unwrap();
/// assert_eq!(shop.as_str(), "demo-store.myshopify.com");
///
/// assert!(ShopDomain::parse("demo-store.example.com").is_err());
/// assert!(ShopDomain::parse("-bad.myshopify.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Domain suffix shared by every Shopify shop.
    pub const SUFFIX: &'static str = ".myshopify.com";

    /// Maximum length of the store name part.
    pub const MAX_NAME_LENGTH: usize = 60;

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, lacks the `.myshopify.com`
    /// suffix, or has a malformed store name.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        let name = normalized
            .strip_suffix(Self::SUFFIX)
            .ok_or(ShopDomainError::InvalidSuffix {
                suffix: Self::SUFFIX,
            })?;

        let valid_name = !name.is_empty()
            && name.len() <= Self::MAX_NAME_LENGTH
            && !name.starts_with('-')
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

        if !valid_name {
            return Err(ShopDomainError::InvalidName(name.to_owned()));
        }

        Ok(Self(normalized))
    }

    /// Returns the full domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(shop: ShopDomain) -> Self {
        shop.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ShopDomain {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShopDomain {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ShopDomain {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}


#[cfg(all(test, feature = "postgres"))]
#[allow(clippy::unwrap_used)]
mod postgres_tests {
    use sqlx::postgres::PgArgumentBuffer;
    use sqlx::{Encode, Postgres, Type};

    use super::*;

    #[test]
    fn test_binds_as_text() {
        assert_eq!(
            <ShopDomain as Type<Postgres>>::type_info(),
            <String as Type<Postgres>>::type_info()
        );
    }

    #[test]
    fn test_encodes_normalized_domain() {
        let shop = ShopDomain::parse(" Demo.MyShopify.com").unwrap();
        let mut buf = PgArgumentBuffer::default();
        <ShopDomain as Encode<'_, Postgres>>::encode_by_ref(&shop, &mut buf).unwrap();
        assert_eq!(&buf[..], b"demo.myshopify.com");
    }
}
