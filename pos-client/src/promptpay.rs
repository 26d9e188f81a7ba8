//! PromptPay QR payloads.
//!
//! A payload is a flat list of EMVCo TLV fields (`id`, two-digit length,
//! value) closed by a CRC-16/CCITT-FALSE over everything before it,
//! including the CRC field's own `6304` header.

use crate::error::ClientError;

/// Used when the venue has not configured a PromptPay number.
pub const FALLBACK_TARGET: &str = "0000000000";

const ID_PAYLOAD_FORMAT: &str = "00";
const ID_POI_METHOD: &str = "01";
const ID_MERCHANT_INFO: &str = "29";
const ID_CURRENCY: &str = "53";
const ID_AMOUNT: &str = "54";
const ID_COUNTRY: &str = "58";
const ID_CRC: &str = "63";
const ID_GUID: &str = "00";

const PAYLOAD_FORMAT_MERCHANT_PRESENTED: &str = "01";
const POI_STATIC: &str = "11";
const POI_DYNAMIC: &str = "12";
const GUID_PROMPTPAY: &str = "A000000677010111";
const CURRENCY_THB: &str = "764";
const COUNTRY_TH: &str = "TH";

/// A TLV length is two decimal digits.
const MAX_FIELD_LEN: usize = 99;
/// Room left for the account inside the merchant template after the GUID
/// field and the account field's own header.
const MAX_ACCOUNT_LEN: usize = MAX_FIELD_LEN - (4 + GUID_PROMPTPAY.len()) - 4;

/// The kind of account a PromptPay target resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPayTarget {
    /// Mobile number, stored as 13 digits with the `0066` country prefix.
    Phone(String),
    /// 13-digit national id or tax id.
    TaxId(String),
    /// E-wallet id (15 digits or more).
    EWallet(String),
}

impl PromptPayTarget {
    /// Classify a target by its digit count. Separators are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidPromptPayTarget`] if `raw` has no digits
    /// or more than fit in the merchant template.
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        match digits.len() {
            0 => Err(ClientError::InvalidPromptPayTarget(raw.to_owned())),
            n if n > MAX_ACCOUNT_LEN => Err(ClientError::InvalidPromptPayTarget(raw.to_owned())),
            n if n >= 15 => Ok(Self::EWallet(digits)),
            13 | 14 => Ok(Self::TaxId(digits)),
            _ => Ok(Self::Phone(phone_field(&digits))),
        }
    }

    fn sub_id(&self) -> &'static str {
        match self {
            Self::Phone(_) => "01",
            Self::TaxId(_) => "02",
            Self::EWallet(_) => "03",
        }
    }

    /// The value written into the merchant-information template.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Phone(v) | Self::TaxId(v) | Self::EWallet(v) => v,
        }
    }
}

/// `0812345678` -> `0066812345678`.
fn phone_field(digits: &str) -> String {
    let international = match digits.strip_prefix('0') {
        Some(rest) => format!("66{rest}"),
        None => digits.to_owned(),
    };
    format!("{international:0>13}")
}

fn field(id: &str, value: &str) -> String {
    format!("{id}{:02}{value}", value.len())
}

/// Build the QR payload for `target`, optionally fixing `amount` in baht.
///
/// A missing or zero amount yields a static QR the payer fills in.
///
/// # Errors
///
/// Returns [`ClientError::InvalidPromptPayTarget`] for a target without
/// digits or with too many, and [`ClientError::InvalidAmount`] for a
/// negative, non-finite, or oversized amount.
pub fn payload(target: &str, amount: Option<f64>) -> Result<String, ClientError> {
    let target = PromptPayTarget::parse(target)?;
    let amount = match amount {
        Some(a) if !a.is_finite() || a < 0.0 => return Err(ClientError::InvalidAmount(a)),
        Some(a) if a > 0.0 => {
            let text = format!("{a:.2}");
            if text.len() > MAX_FIELD_LEN {
                return Err(ClientError::InvalidAmount(a));
            }
            Some(text)
        }
        _ => None,
    };

    let merchant = field(ID_GUID, GUID_PROMPTPAY) + &field(target.sub_id(), target.value());
    let mut out = String::new();
    out.push_str(&field(ID_PAYLOAD_FORMAT, PAYLOAD_FORMAT_MERCHANT_PRESENTED));
    out.push_str(&field(ID_POI_METHOD, if amount.is_some() { POI_DYNAMIC } else { POI_STATIC }));
    out.push_str(&field(ID_MERCHANT_INFO, &merchant));
    out.push_str(&field(ID_COUNTRY, COUNTRY_TH));
    out.push_str(&field(ID_CURRENCY, CURRENCY_THB));
    if let Some(text) = &amount {
        out.push_str(&field(ID_AMOUNT, text));
    }
    out.push_str(ID_CRC);
    out.push_str("04");
    let crc = crc16_ccitt_false(out.as_bytes());
    out.push_str(&format!("{crc:04X}"));
    Ok(out)
}

/// CRC-16/CCITT-FALSE: polynomial `0x1021`, initial value `0xFFFF`, no reflection.
#[must_use]
pub fn crc16_ccitt_false(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in bytes {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 == 0 { crc << 1 } else { (crc << 1) ^ 0x1021 };
        }
    }
    crc
}

#[cfg(test)]
#[path = "promptpay_test.rs"]
mod tests;
