//! Form input and its validation into an [`IssuanceRequest`].
//!
//! Validation is purely local: it never touches the network or the wallet.
//! The first failing rule is reported, in the order the form shows fields.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::blockchain::types::{raw_supply, MINT_DECIMALS};

/// Longest accepted token symbol, in characters.
pub const MAX_SYMBOL_LEN: usize = 10;

/// Largest accepted logo upload.
pub const MAX_LOGO_BYTES: usize = 10 * 1024 * 1024;

/// Supply pre-filled in a fresh form.
pub const DEFAULT_INITIAL_SUPPLY: &str = "1000000";

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

/// A rejected form field. Messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Token name is required")]
    MissingName,

    #[error("Token symbol is required")]
    MissingSymbol,

    #[error("Token symbol must be 10 characters or less")]
    SymbolTooLong,

    #[error("Token description is required")]
    MissingDescription,

    #[error("Initial supply must be a positive number")]
    InvalidSupply,

    #[error("Initial supply is too large")]
    SupplyTooLarge,

    #[error("Logo must be a PNG or JPG image")]
    LogoFormat,

    #[error("Logo must be 10MB or smaller")]
    LogoTooLarge,
}

/// Raw form input as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenForm {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub initial_supply: String,
    pub logo: Option<Vec<u8>>,
}

impl Default for TokenForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            description: String::new(),
            initial_supply: DEFAULT_INITIAL_SUPPLY.to_string(),
            logo: None,
        }
    }
}

/// Image formats accepted for a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoFormat {
    Png,
    Jpeg,
}

/// A logo that passed type and size checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    format: LogoFormat,
    bytes: Vec<u8>,
}

impl LogoImage {
    /// Accept PNG or JPEG bytes up to [`MAX_LOGO_BYTES`].
    ///
    /// The format is taken from the file signature, not from a file name.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let format = if bytes.starts_with(PNG_SIGNATURE) {
            LogoFormat::Png
        } else if bytes.starts_with(JPEG_SIGNATURE) {
            LogoFormat::Jpeg
        } else {
            return Err(ValidationError::LogoFormat);
        };

        if bytes.len() > MAX_LOGO_BYTES {
            return Err(ValidationError::LogoTooLarge);
        }

        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> LogoFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Parse a supply field into a positive whole number of tokens.
pub fn parse_supply(input: &str) -> Result<u64, ValidationError> {
    let supply: u64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidSupply)?;

    if supply == 0 {
        return Err(ValidationError::InvalidSupply);
    }
    raw_supply(supply, MINT_DECIMALS).map_err(|_| ValidationError::SupplyTooLarge)?;

    Ok(supply)
}

/// A validated issuance request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceRequest {
    payer: Pubkey,
    token_name: String,
    token_symbol: String,
    description: String,
    initial_supply: u64,
    logo: Option<LogoImage>,
}

impl IssuanceRequest {
    /// Validate `form` on behalf of `payer`.
    pub fn new(payer: Pubkey, form: &TokenForm) -> Result<Self, ValidationError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let symbol = form.symbol.trim();
        if symbol.is_empty() {
            return Err(ValidationError::MissingSymbol);
        }
        if symbol.chars().count() > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong);
        }

        let description = form.description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingDescription);
        }

        let initial_supply = parse_supply(&form.initial_supply)?;

        let logo = form.logo.clone().map(LogoImage::from_bytes).transpose()?;

        Ok(Self {
            payer,
            token_name: name.to_string(),
            token_symbol: symbol.to_string(),
            description: description.to_string(),
            initial_supply,
            logo,
        })
    }

    pub fn payer(&self) -> &Pubkey {
        &self.payer
    }

    pub fn token_name(&self) -> &str {
        &self.token_name
    }

    pub fn token_symbol(&self) -> &str {
        &self.token_symbol
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Supply in whole tokens.
    pub fn initial_supply(&self) -> u64 {
        self.initial_supply
    }

    pub fn logo(&self) -> Option<&LogoImage> {
        self.logo.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(symbol: &str, supply: &str) -> TokenForm {
        TokenForm {
            name: "Doge2".into(),
            symbol: symbol.into(),
            description: "fun".into(),
            initial_supply: supply.into(),
            logo: None,
        }
    }

    #[test]
    fn test_valid_form() {
        let payer = Pubkey::new_unique();
        let request = IssuanceRequest::new(payer, &form("DOGE2", "1000000")).unwrap();
        assert_eq!(request.payer(), &payer);
        assert_eq!(request.token_symbol(), "DOGE2");
        assert_eq!(request.initial_supply(), 1_000_000);
        assert!(request.logo().is_none());
    }

    #[test]
    fn test_symbol_boundary() {
        let payer = Pubkey::new_unique();
        assert!(IssuanceRequest::new(payer, &form("ABCDEFGHIJ", "1")).is_ok());
        assert_eq!(
            IssuanceRequest::new(payer, &form("ABCDEFGHIJK", "1")).unwrap_err(),
            ValidationError::SymbolTooLong
        );
    }

    #[test]
    fn test_symbol_length_counts_characters() {
        // Ten multi-byte characters are still ten characters.
        let payer = Pubkey::new_unique();
        assert!(IssuanceRequest::new(payer, &form("ÅÅÅÅÅÅÅÅÅÅ", "1")).is_ok());
    }

    #[test]
    fn test_required_fields_in_order() {
        let payer = Pubkey::new_unique();
        let empty = TokenForm::default();
        assert_eq!(IssuanceRequest::new(payer, &empty).unwrap_err(), ValidationError::MissingName);

        let mut f = form("", "1");
        assert_eq!(IssuanceRequest::new(payer, &f).unwrap_err(), ValidationError::MissingSymbol);

        f.symbol = "OK".into();
        f.description = "   ".into();
        assert_eq!(
            IssuanceRequest::new(payer, &f).unwrap_err(),
            ValidationError::MissingDescription
        );
    }

    #[test]
    fn test_supply_rules() {
        for bad in ["0", "-5", "1.5", "abc", "", "  ", "1e6"] {
            assert_eq!(parse_supply(bad), Err(ValidationError::InvalidSupply), "input {:?}", bad);
        }
        assert_eq!(parse_supply(" 42 "), Ok(42));
        assert_eq!(parse_supply("99999999999999"), Err(ValidationError::SupplyTooLarge));
    }

    #[test]
    fn test_default_form_supply() {
        assert_eq!(TokenForm::default().initial_supply, "1000000");
    }

    #[test]
    fn test_logo_checks() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(&[0; 16]);
        assert_eq!(LogoImage::from_bytes(png).unwrap().format(), LogoFormat::Png);

        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0];
        assert_eq!(LogoImage::from_bytes(jpeg).unwrap().format(), LogoFormat::Jpeg);

        assert_eq!(
            LogoImage::from_bytes(b"GIF89a".to_vec()).unwrap_err(),
            ValidationError::LogoFormat
        );

        let mut huge = PNG_SIGNATURE.to_vec();
        huge.resize(MAX_LOGO_BYTES + 1, 0);
        assert_eq!(LogoImage::from_bytes(huge).unwrap_err(), ValidationError::LogoTooLarge);
    }

    #[test]
    fn test_bad_logo_rejects_form() {
        let mut f = form("DOGE2", "10");
        f.logo = Some(b"not an image".to_vec());
        assert_eq!(
            IssuanceRequest::new(Pubkey::new_unique(), &f).unwrap_err(),
            ValidationError::LogoFormat
        );
    }
}
