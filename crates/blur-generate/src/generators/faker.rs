use fake::Fake;
use fake::faker::address::en as address;
use fake::faker::company::en as company;
use fake::faker::creditcard::en as creditcard;
use fake::faker::internet::en as internet;
use fake::faker::job::en as job;
use fake::faker::lorem::en as lorem;
use fake::faker::name::en as name;
use fake::faker::phone_number::en as phone;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

use crate::errors::GenerationError;
use crate::generators::Generator;

/// Synthetic-data generator backed by the `fake` crate.
///
/// The first argument names the category (`"faker:userName"`). Each instance
/// owns its random source, so a seeded instance yields a reproducible sequence.
pub struct FakerGenerator {
    rng: ChaCha8Rng,
}

impl FakerGenerator {
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for FakerGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for FakerGenerator {
    fn generate(&mut self, parameters: &[String]) -> Result<Value, GenerationError> {
        let category = parameters
            .first()
            .ok_or_else(|| GenerationError::MissingParameter {
                generator: "faker".to_string(),
            })?;
        let category = FakerCategory::parse(category)
            .ok_or_else(|| GenerationError::UnsupportedCategory(category.clone()))?;
        Ok(category.generate(&mut self.rng))
    }
}

/// Categories understood by [`FakerGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakerCategory {
    Name,
    FirstName,
    LastName,
    NameTitle,
    NameSuffix,
    UserName,
    SafeEmail,
    FreeEmail,
    Password,
    DomainName,
    Url,
    Ipv4,
    Ipv6,
    MacAddress,
    UserAgent,
    PhoneNumber,
    CellNumber,
    Address,
    StreetName,
    StreetAddress,
    BuildingNumber,
    City,
    State,
    Country,
    Postcode,
    ZipCode,
    Company,
    CompanySuffix,
    Industry,
    JobTitle,
    Word,
    Words,
    Sentence,
    Paragraph,
    CreditCardNumber,
    Uuid,
    Boolean,
    RandomDigit,
    RandomNumber,
}

const CATALOG: &[(&str, FakerCategory)] = &[
    ("name", FakerCategory::Name),
    ("firstName", FakerCategory::FirstName),
    ("lastName", FakerCategory::LastName),
    ("title", FakerCategory::NameTitle),
    ("suffix", FakerCategory::NameSuffix),
    ("userName", FakerCategory::UserName),
    ("email", FakerCategory::SafeEmail),
    ("safeEmail", FakerCategory::SafeEmail),
    ("freeEmail", FakerCategory::FreeEmail),
    ("password", FakerCategory::Password),
    ("domainName", FakerCategory::DomainName),
    ("url", FakerCategory::Url),
    ("ipv4", FakerCategory::Ipv4),
    ("ipv6", FakerCategory::Ipv6),
    ("macAddress", FakerCategory::MacAddress),
    ("userAgent", FakerCategory::UserAgent),
    ("phoneNumber", FakerCategory::PhoneNumber),
    ("cellNumber", FakerCategory::CellNumber),
    ("address", FakerCategory::Address),
    ("streetName", FakerCategory::StreetName),
    ("streetAddress", FakerCategory::StreetAddress),
    ("buildingNumber", FakerCategory::BuildingNumber),
    ("city", FakerCategory::City),
    ("state", FakerCategory::State),
    ("country", FakerCategory::Country),
    ("postcode", FakerCategory::Postcode),
    ("zipCode", FakerCategory::ZipCode),
    ("company", FakerCategory::Company),
    ("companySuffix", FakerCategory::CompanySuffix),
    ("industry", FakerCategory::Industry),
    ("jobTitle", FakerCategory::JobTitle),
    ("word", FakerCategory::Word),
    ("words", FakerCategory::Words),
    ("sentence", FakerCategory::Sentence),
    ("paragraph", FakerCategory::Paragraph),
    ("text", FakerCategory::Paragraph),
    ("creditCardNumber", FakerCategory::CreditCardNumber),
    ("uuid", FakerCategory::Uuid),
    ("boolean", FakerCategory::Boolean),
    ("randomDigit", FakerCategory::RandomDigit),
    ("randomNumber", FakerCategory::RandomNumber),
];

impl FakerCategory {
    /// Look up a category by name, ignoring case, `_` and `-`.
    pub fn parse(value: &str) -> Option<Self> {
        let wanted = normalize(value);
        if wanted.is_empty() {
            return None;
        }
        CATALOG
            .iter()
            .find(|(name, _)| normalize(name) == wanted)
            .map(|(_, category)| *category)
    }

    /// Accepted category names, including aliases.
    pub fn names() -> impl Iterator<Item = &'static str> {
        CATALOG.iter().map(|(name, _)| *name)
    }

    fn generate(self, rng: &mut ChaCha8Rng) -> Value {
        let text: String = match self {
            Self::Name => name::Name().fake_with_rng(rng),
            Self::FirstName => name::FirstName().fake_with_rng(rng),
            Self::LastName => name::LastName().fake_with_rng(rng),
            Self::NameTitle => name::Title().fake_with_rng(rng),
            Self::NameSuffix => name::Suffix().fake_with_rng(rng),
            Self::UserName => internet::Username().fake_with_rng(rng),
            Self::SafeEmail => internet::SafeEmail().fake_with_rng(rng),
            Self::FreeEmail => internet::FreeEmail().fake_with_rng(rng),
            Self::Password => internet::Password(10..20).fake_with_rng(rng),
            Self::DomainName => domain_name(rng),
            Self::Url => format!("https://{}/", domain_name(rng)),
            Self::Ipv4 => internet::IPv4().fake_with_rng(rng),
            Self::Ipv6 => internet::IPv6().fake_with_rng(rng),
            Self::MacAddress => internet::MACAddress().fake_with_rng(rng),
            Self::UserAgent => internet::UserAgent().fake_with_rng(rng),
            Self::PhoneNumber => phone::PhoneNumber().fake_with_rng(rng),
            Self::CellNumber => phone::CellNumber().fake_with_rng(rng),
            Self::Address => {
                let street = street_address(rng);
                let city: String = address::CityName().fake_with_rng(rng);
                let state: String = address::StateAbbr().fake_with_rng(rng);
                let zip: String = address::ZipCode().fake_with_rng(rng);
                format!("{street}, {city}, {state} {zip}")
            }
            Self::StreetName => address::StreetName().fake_with_rng(rng),
            Self::StreetAddress => street_address(rng),
            Self::BuildingNumber => address::BuildingNumber().fake_with_rng(rng),
            Self::City => address::CityName().fake_with_rng(rng),
            Self::State => address::StateName().fake_with_rng(rng),
            Self::Country => address::CountryName().fake_with_rng(rng),
            Self::Postcode => address::PostCode().fake_with_rng(rng),
            Self::ZipCode => address::ZipCode().fake_with_rng(rng),
            Self::Company => company::CompanyName().fake_with_rng(rng),
            Self::CompanySuffix => company::CompanySuffix().fake_with_rng(rng),
            Self::Industry => company::Industry().fake_with_rng(rng),
            Self::JobTitle => job::Title().fake_with_rng(rng),
            Self::Word => lorem::Word().fake_with_rng(rng),
            Self::Words => {
                let words: Vec<String> = lorem::Words(3..6).fake_with_rng(rng);
                words.join(" ")
            }
            Self::Sentence => lorem::Sentence(4..10).fake_with_rng(rng),
            Self::Paragraph => lorem::Paragraph(3..6).fake_with_rng(rng),
            Self::CreditCardNumber => creditcard::CreditCardNumber().fake_with_rng(rng),
            Self::Uuid => {
                let bytes: [u8; 16] = rng.random();
                uuid::Builder::from_random_bytes(bytes)
                    .into_uuid()
                    .to_string()
            }
            Self::Boolean => return Value::Bool(rng.random_bool(0.5)),
            Self::RandomDigit => return Value::from(rng.random_range(0..10_i64)),
            Self::RandomNumber => return Value::from(rng.random_range(0..1_000_000_000_i64)),
        };
        Value::String(text)
    }
}

fn street_address(rng: &mut ChaCha8Rng) -> String {
    let number: String = address::BuildingNumber().fake_with_rng(rng);
    let street: String = address::StreetName().fake_with_rng(rng);
    format!("{number} {street}")
}

fn domain_name(rng: &mut ChaCha8Rng) -> String {
    let word: String = lorem::Word().fake_with_rng(rng);
    let suffix: String = internet::DomainSuffix().fake_with_rng(rng);
    format!("{}.{suffix}", word.to_lowercase())
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
