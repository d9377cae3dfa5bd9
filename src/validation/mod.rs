use bigdecimal::BigDecimal;
use std::fmt;

pub const CURRENCY_LEN: usize = 3;
pub const PAYEE_ACCOUNT_MIN_LEN: usize = 6;
pub const PAYEE_ACCOUNT_MAX_LEN: usize = 20;
pub const PAYEE_NAME_MIN_LEN: usize = 2;
pub const PAYEE_NAME_MAX_LEN: usize = 100;
pub const AMOUNT_INPUT_MAX_LEN: usize = 20;
pub const SWIFT_CODE_SHORT_LEN: usize = 8;
pub const SWIFT_CODE_LONG_LEN: usize = 11;
pub const AMOUNT_MIN: &str = "0.01";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Payment fields after validation, normalized for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPayment {
    pub amount: BigDecimal,
    pub currency: String,
    pub payee_account: String,
    pub swift_code: String,
    pub payee_name: String,
}

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validates every payment field and collects all failures rather than
/// stopping at the first.
pub fn validate_payment(
    amount: &str,
    currency: &str,
    payee_account: &str,
    swift_code: &str,
    payee_name: &str,
    ceiling: &BigDecimal,
) -> Result<NormalizedPayment, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let amount = match validate_amount(amount, ceiling) {
        Ok(amount) => Some(amount),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let currency = sanitize_string(currency).to_uppercase();
    if let Err(e) = validate_currency(&currency) {
        errors.push(e);
    }

    let payee_account = sanitize_string(payee_account).to_uppercase();
    if let Err(e) = validate_payee_account(&payee_account) {
        errors.push(e);
    }

    let swift_code = sanitize_string(swift_code).to_uppercase();
    if let Err(e) = validate_swift_code(&swift_code) {
        errors.push(e);
    }

    let payee_name = sanitize_string(payee_name);
    if let Err(e) = validate_payee_name(&payee_name) {
        errors.push(e);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NormalizedPayment {
        amount: amount.expect("amount validated"),
        currency,
        payee_account,
        swift_code,
        payee_name,
    })
}

/// Parses and bounds-checks an amount string. The textual form is checked
/// first so that scale and sign rules do not depend on BigDecimal
/// normalization quirks.
pub fn validate_amount(raw: &str, ceiling: &BigDecimal) -> Result<BigDecimal, ValidationError> {
    let raw = sanitize_string(raw);
    if raw.is_empty() {
        return Err(ValidationError::new("amount", "must not be empty"));
    }

    if raw.len() > AMOUNT_INPUT_MAX_LEN {
        return Err(ValidationError::new(
            "amount",
            format!("must be at most {} characters", AMOUNT_INPUT_MAX_LEN),
        ));
    }

    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (raw.as_str(), None),
    };

    let whole_ok = !whole.is_empty() && whole.chars().all(|ch| ch.is_ascii_digit());
    let fraction_ok = match fraction {
        Some(fraction) => {
            (1..=2).contains(&fraction.len()) && fraction.chars().all(|ch| ch.is_ascii_digit())
        }
        None => true,
    };

    if !whole_ok || !fraction_ok {
        return Err(ValidationError::new(
            "amount",
            "must be a positive decimal with at most 2 fractional digits",
        ));
    }

    let amount: BigDecimal = raw
        .parse()
        .map_err(|_| ValidationError::new("amount", "is not a valid decimal"))?;

    let min: BigDecimal = AMOUNT_MIN.parse().expect("valid minimum amount");
    if amount < min {
        return Err(ValidationError::new(
            "amount",
            format!("must be at least {}", AMOUNT_MIN),
        ));
    }

    if &amount > ceiling {
        return Err(ValidationError::new(
            "amount",
            format!("must not exceed {}", ceiling),
        ));
    }

    Ok(amount)
}

pub fn validate_currency(currency: &str) -> ValidationResult {
    if currency.len() != CURRENCY_LEN || !currency.chars().all(|ch| ch.is_ascii_uppercase()) {
        return Err(ValidationError::new(
            "currency",
            format!("must be a {}-letter code", CURRENCY_LEN),
        ));
    }

    Ok(())
}

pub fn validate_payee_account(account: &str) -> ValidationResult {
    if account.len() < PAYEE_ACCOUNT_MIN_LEN || account.len() > PAYEE_ACCOUNT_MAX_LEN {
        return Err(ValidationError::new(
            "payee_account",
            format!(
                "must be {}-{} characters",
                PAYEE_ACCOUNT_MIN_LEN, PAYEE_ACCOUNT_MAX_LEN
            ),
        ));
    }

    if !account
        .chars()
        .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
    {
        return Err(ValidationError::new(
            "payee_account",
            "must contain only uppercase letters and digits",
        ));
    }

    Ok(())
}

/// BIC format: 6 letters (institution + country), 2 alphanumeric (location),
/// optional 3 alphanumeric (branch).
pub fn validate_swift_code(code: &str) -> ValidationResult {
    if code.len() != SWIFT_CODE_SHORT_LEN && code.len() != SWIFT_CODE_LONG_LEN {
        return Err(ValidationError::new(
            "swift_code",
            format!(
                "must be {} or {} characters",
                SWIFT_CODE_SHORT_LEN, SWIFT_CODE_LONG_LEN
            ),
        ));
    }

    let chars: Vec<char> = code.chars().collect();
    let prefix_ok = chars[..6].iter().all(|ch| ch.is_ascii_uppercase());
    let suffix_ok = chars[6..]
        .iter()
        .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit());

    if !prefix_ok || !suffix_ok {
        return Err(ValidationError::new(
            "swift_code",
            "must be 6 letters followed by alphanumeric location and branch codes",
        ));
    }

    Ok(())
}

pub fn validate_payee_name(name: &str) -> ValidationResult {
    if name.len() < PAYEE_NAME_MIN_LEN || name.len() > PAYEE_NAME_MAX_LEN {
        return Err(ValidationError::new(
            "payee_name",
            format!(
                "must be {}-{} characters",
                PAYEE_NAME_MIN_LEN, PAYEE_NAME_MAX_LEN
            ),
        ));
    }

    if !name.chars().all(|ch| ch.is_alphabetic() || ch == ' ') {
        return Err(ValidationError::new(
            "payee_name",
            "must contain only letters and spaces",
        ));
    }

    Ok(())
}
