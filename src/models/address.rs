use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// ISO 3166-1 alpha-3 code the provider treats as domestic.
pub const DOMESTIC_COUNTRY: &str = "DEU";

const MAX_NAME_LEN: usize = 50;
const MAX_SALUTATION_LEN: usize = 10;
const MAX_STREET_LEN: usize = 50;
const MAX_HOUSE_NO_LEN: usize = 10;
const MAX_ZIP_LEN: usize = 10;
const MAX_CITY_LEN: usize = 35;

/// Loosely-typed address input accepted by the local API.
///
/// Either `first_name`/`last_name` or `company` identifies the addressee;
/// when both are present the company form wins and the person is attached
/// as a contact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub salutation: Option<String>,
    pub company: Option<String>,
    pub street: String,
    pub house_no: Option<String>,
    pub zip: String,
    pub city: String,
    /// ISO 3166-1 alpha-3; empty or missing means domestic.
    pub country: Option<String>,
}

/// Name part of the provider's named-address shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Name {
    #[serde(rename = "personName")]
    Person {
        #[serde(skip_serializing_if = "Option::is_none")]
        salutation: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        firstname: String,
        lastname: String,
    },
    #[serde(rename = "companyName")]
    Company {
        company: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        contact: Option<String>,
    },
}

/// Address part of the provider's named-address shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleAddress {
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_no: Option<String>,
    pub zip: String,
    pub city: String,
    pub country: String,
}

impl SimpleAddress {
    pub fn is_domestic(&self) -> bool {
        is_domestic(&self.country)
    }
}

/// Fully normalized address in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedAddress {
    pub name: Name,
    pub address: SimpleAddress,
}

/// Sender and receiver bound as a pair. Both are always present; the cart
/// engine rejects items that carry only one of the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBinding {
    pub sender: NamedAddress,
    pub receiver: NamedAddress,
}

pub fn is_domestic(country: &str) -> bool {
    country.is_empty() || country.eq_ignore_ascii_case(DOMESTIC_COUNTRY)
}

fn require(field: &str, value: &str, max_len: usize) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Address(format!("missing field '{}'", field)));
    }
    if value.len() > max_len {
        return Err(ServiceError::Address(format!(
            "field '{}' exceeds {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>, max_len: usize) -> Option<String> {
    value
        .map(|v| v.trim().chars().take(max_len).collect::<String>())
        .filter(|v| !v.is_empty())
}

impl NamedAddress {
    /// Normalizes loose input into the provider's named-address shape,
    /// enforcing completeness and field length limits.
    pub fn try_from_input(input: AddressInput) -> Result<Self, ServiceError> {
        let name = match (&input.company, &input.last_name) {
            (Some(company), _) if !company.trim().is_empty() => Name::Company {
                company: require("company", company, MAX_NAME_LEN)?,
                contact: match (&input.first_name, &input.last_name) {
                    (Some(first), Some(last)) => {
                        Some(format!("{} {}", first.trim(), last.trim()))
                    }
                    _ => None,
                },
            },
            (_, Some(last)) => Name::Person {
                salutation: optional(input.salutation.clone(), MAX_SALUTATION_LEN),
                title: optional(input.title.clone(), MAX_SALUTATION_LEN),
                firstname: require(
                    "first_name",
                    input.first_name.as_deref().unwrap_or(""),
                    MAX_NAME_LEN,
                )?,
                lastname: require("last_name", last, MAX_NAME_LEN)?,
            },
            _ => {
                return Err(ServiceError::Address(
                    "either a company or a person name is required".to_string(),
                ))
            }
        };

        let country = input
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DOMESTIC_COUNTRY)
            .to_ascii_uppercase();
        if country.len() != 3 {
            return Err(ServiceError::Address(format!(
                "country must be an ISO 3166-1 alpha-3 code, got '{}'",
                country
            )));
        }

        Ok(Self {
            name,
            address: SimpleAddress {
                street: require("street", &input.street, MAX_STREET_LEN)?,
                house_no: optional(input.house_no, MAX_HOUSE_NO_LEN),
                zip: require("zip", &input.zip, MAX_ZIP_LEN)?,
                city: require("city", &input.city, MAX_CITY_LEN)?,
                country,
            },
        })
    }
}
