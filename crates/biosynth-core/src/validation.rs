//! # Validation Module
//!
//! Input sanitizing and checkout form validation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Every keystroke                                               │
//! │  └── sanitize(): trim, strip < > { }, cap at 200 chars                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Submit attempt                                                │
//! │  └── validate_form(): per-field rules, in field order                   │
//! │           │                                                             │
//! │           ├── empty map      → form is valid                            │
//! │           └── FieldErrors    → rendered inline next to each field       │
//! │                                                                         │
//! │  Layer 3: Command inputs (quantities, search, config)                   │
//! │  └── validate_quantity() / validate_search_query() → ValidationError    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form errors are data, not `Err`: a shopper fixes them and resubmits.
//!
//! ## Usage
//! ```rust
//! use biosynth_core::validation::{is_valid_email, is_valid_name, sanitize};
//!
//! assert_eq!(sanitize("  <b>Ada</b> "), "bAda/b");
//! assert!(is_valid_name("O'Brien"));
//! assert!(!is_valid_email("a@b"));
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use ts_rs::TS;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of any sanitized free-text input.
pub const MAX_INPUT_CHARS: usize = 200;

/// Maximum length of a catalog search query.
pub const MAX_SEARCH_CHARS: usize = 100;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZÀ-ÿ\s\-']{2,50}$").expect("Invalid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\s\-]{3,10}$").expect("Invalid regex"));

// =============================================================================
// Sanitizing
// =============================================================================

/// Cleans a user-entered string before it is stored or rendered.
///
/// Trims surrounding whitespace, strips `<`, `>`, `{` and `}`, then
/// truncates to [`MAX_INPUT_CHARS`] characters.
pub fn sanitize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}'))
        .take(MAX_INPUT_CHARS)
        .collect()
}

// =============================================================================
// Field Rules
// =============================================================================

/// Letters (including Latin-1 accented), spaces, hyphens and apostrophes; 2-50 chars.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Simple `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Academic and government suffixes treated as institutional.
const INSTITUTIONAL_SUFFIXES: [&str; 5] = ["edu", "ac.uk", "edu.au", "edu.br", "gov"];

/// Whether the address's domain ends in an academic or government suffix.
///
/// Informational only; no rule rejects a non-institutional address.
pub fn is_institutional_email(email: &str) -> bool {
    let Some((_, domain)) = email.trim().rsplit_once('@') else {
        return false;
    };
    let domain = domain.to_ascii_lowercase();
    INSTITUTIONAL_SUFFIXES.iter().any(|suffix| {
        domain
            .strip_suffix(suffix)
            .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// 3-10 alphanumerics, spaces or hyphens (international postal formats).
pub fn is_valid_zip(zip: &str) -> bool {
    ZIP_RE.is_match(zip)
}

/// 5-200 characters after trimming.
pub fn is_valid_street(street: &str) -> bool {
    let len = street.trim().chars().count();
    (5..=MAX_INPUT_CHARS).contains(&len)
}

// =============================================================================
// Checkout Form
// =============================================================================

/// A checkout form field, ordered as the form renders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Street,
    Zip,
    Country,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Email,
        FormField::Street,
        FormField::Zip,
        FormField::Country,
    ];

    /// Wire name (`firstName`, `zip`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            FormField::FirstName => "firstName",
            FormField::LastName => "lastName",
            FormField::Email => "email",
            FormField::Street => "street",
            FormField::Zip => "zip",
            FormField::Country => "country",
        }
    }

    /// Accepts the wire name or its snake_case spelling.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|field| field.key().to_lowercase() == normalized)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Field-keyed error messages. Empty means the form is valid.
pub type FieldErrors = BTreeMap<FormField, String>;

/// Contact and delivery details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub zip: String,
    pub country: String,
}

impl CheckoutForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Street => &self.street,
            FormField::Zip => &self.zip,
            FormField::Country => &self.country,
        }
    }

    /// Stores the sanitized value.
    pub fn set(&mut self, field: FormField, value: &str) {
        let value = sanitize(value);
        match field {
            FormField::FirstName => self.first_name = value,
            FormField::LastName => self.last_name = value,
            FormField::Email => self.email = value,
            FormField::Street => self.street = value,
            FormField::Zip => self.zip = value,
            FormField::Country => self.country = value,
        }
    }
}

fn check(
    errors: &mut FieldErrors,
    field: FormField,
    value: &str,
    is_valid: fn(&str) -> bool,
    required: &str,
    invalid: &str,
) {
    if value.trim().is_empty() {
        errors.insert(field, required.to_string());
    } else if !is_valid(value) {
        errors.insert(field, invalid.to_string());
    }
}

/// Validates every field of the checkout form.
///
/// `country` only has to be non-empty here; resolving it against the
/// shipping table is the checkout flow's job.
///
/// ## Example
/// ```rust
/// use biosynth_core::validation::{validate_form, CheckoutForm, FormField};
///
/// let form = CheckoutForm::default();
/// let errors = validate_form(&form);
/// assert_eq!(errors.len(), 6);
/// assert_eq!(errors[&FormField::Country], "Please select a country");
/// ```
pub fn validate_form(form: &CheckoutForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    check(
        &mut errors,
        FormField::FirstName,
        &form.first_name,
        is_valid_name,
        "First name is required",
        "Invalid first name",
    );
    check(
        &mut errors,
        FormField::LastName,
        &form.last_name,
        is_valid_name,
        "Last name is required",
        "Invalid last name",
    );
    check(
        &mut errors,
        FormField::Email,
        &form.email,
        is_valid_email,
        "Email is required",
        "Invalid email address",
    );
    check(
        &mut errors,
        FormField::Street,
        &form.street,
        is_valid_street,
        "Street address is required",
        "Invalid street address",
    );
    check(
        &mut errors,
        FormField::Zip,
        &form.zip,
        is_valid_zip,
        "Zip code is required",
        "Invalid zip code",
    );

    if form.country.trim().is_empty() {
        errors.insert(FormField::Country, "Please select a country".to_string());
    }

    errors
}

// =============================================================================
// Command Input Validators
// =============================================================================

/// Validates a requested quantity against the per-item maximum.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `max`
pub fn validate_quantity(qty: i64, max: u32) -> ValidationResult<u32> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > i64::from(max) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(max),
        });
    }

    Ok(qty as u32)
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The sanitized query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = sanitize(query);

    if query.chars().count() > MAX_SEARCH_CHARS {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_CHARS,
        });
    }

    Ok(query)
}

/// Validates the contact identifier used in the hand-off link.
///
/// ## Rules
/// - Digits only (international format without `+`)
/// - 8 to 15 digits
pub fn validate_contact_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "contact_phone".to_string(),
        });
    }

    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "contact_phone".to_string(),
            reason: "must contain digits only".to_string(),
        });
    }

    if !(8..=15).contains(&phone.len()) {
        return Err(ValidationError::OutOfRange {
            field: "contact_phone length".to_string(),
            min: 8,
            max: 15,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Marie".to_string(),
            last_name: "Curie".to_string(),
            email: "marie@lab.edu".to_string(),
            street: "36 Quai de Béthune".to_string(),
            zip: "75004".to_string(),
            country: "France".to_string(),
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  hello  "), "hello");
        assert_eq!(sanitize("<script>{x}</script>"), "scriptx/script");
        assert_eq!(sanitize(&"a".repeat(300)).len(), 200);
        assert_eq!(sanitize(&"é".repeat(250)).chars().count(), 200);
    }

    #[test]
    fn test_name_rules() {
        assert!(is_valid_name("O'Brien"));
        assert!(is_valid_name("Jean-Luc"));
        assert!(is_valid_name("José María"));
        assert!(!is_valid_name("John123"));
        assert!(!is_valid_name("J"));
        assert!(!is_valid_name(&"a".repeat(51)));
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("a@b.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
    }

    #[test]
    fn test_institutional_email() {
        assert!(is_institutional_email("rf@kings.ac.uk"));
        assert!(is_institutional_email("lab@chem.MIT.EDU"));
        assert!(is_institutional_email("a@usp.edu.br"));
        assert!(is_institutional_email("a@nih.gov"));
        assert!(!is_institutional_email("a@gmail.com"));
        assert!(!is_institutional_email("a@edu"));
        assert!(!is_institutional_email("a@notedu.com"));
        assert!(!is_institutional_email("no-at-sign.edu"));
    }

    #[test]
    fn test_zip_rules() {
        assert!(is_valid_zip("12345-6789"));
        assert!(is_valid_zip("A1A 1A1"));
        assert!(!is_valid_zip("!!"));
        assert!(!is_valid_zip("12"));
        assert!(!is_valid_zip("12345678901"));
    }

    #[test]
    fn test_street_rules() {
        assert!(is_valid_street("1 Main St"));
        assert!(!is_valid_street("  12 "));
        assert!(!is_valid_street(&"x".repeat(201)));
    }

    #[test]
    fn test_validate_form_valid() {
        assert!(validate_form(&valid_form()).is_empty());
    }

    #[test]
    fn test_validate_form_messages() {
        let mut form = valid_form();
        form.first_name = "R2D2".to_string();
        form.email = "a@b".to_string();
        form.zip = String::new();

        let errors = validate_form(&form);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[&FormField::FirstName], "Invalid first name");
        assert_eq!(errors[&FormField::Email], "Invalid email address");
        assert_eq!(errors[&FormField::Zip], "Zip code is required");

        // field order
        let order: Vec<FormField> = errors.keys().copied().collect();
        assert_eq!(order, [FormField::FirstName, FormField::Email, FormField::Zip]);
    }

    #[test]
    fn test_form_set_sanitizes() {
        let mut form = CheckoutForm::default();
        form.set(FormField::Street, "  <12 Lab Road>  ");
        assert_eq!(form.get(FormField::Street), "12 Lab Road");
    }

    #[test]
    fn test_form_field_parse() {
        assert_eq!(FormField::parse("first_name"), Some(FormField::FirstName));
        assert_eq!(FormField::parse("lastName"), Some(FormField::LastName));
        assert_eq!(FormField::parse("ZIP"), Some(FormField::Zip));
        assert_eq!(FormField::parse("phone"), None);
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(1, 50).unwrap(), 1);
        assert_eq!(validate_quantity(50, 50).unwrap(), 50);
        assert!(validate_quantity(0, 50).is_err());
        assert!(validate_quantity(-3, 50).is_err());
        assert!(validate_quantity(51, 50).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  bpc ").unwrap(), "bpc");
        assert!(validate_search_query(&"q".repeat(150)).is_err());
    }

    #[test]
    fn test_validate_contact_phone() {
        assert!(validate_contact_phone("5522998004156").is_ok());
        assert!(validate_contact_phone("+55 22 9980").is_err());
        assert!(validate_contact_phone("1234").is_err());
        assert!(validate_contact_phone("").is_err());
    }
}
