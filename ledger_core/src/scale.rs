use rust_decimal::Decimal;
use std::str::FromStr;

/// Decimal count for native EVM currencies (wei per ETH).
pub const NATIVE_DECIMALS: u32 = 18;

/// Scale a base-unit integer string down by `decimals` decimal places,
/// rendered without scientific notation or trailing zeros ("1", "2.5", "0").
///
/// `rust_decimal` carries the exact-shift path; integers past its 96-bit
/// mantissa take a pure digit-string path so large token amounts never
/// round. Non-numeric input passes through unscaled.
pub fn scale_base_units(amount: &str, decimals: u32) -> String {
    let amount = amount.trim();
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return amount.to_string();
    }

    if decimals == 0 {
        return strip_leading_zeros(amount);
    }

    if let Ok(mut value) = Decimal::from_str(amount) {
        if value.set_scale(decimals).is_ok() {
            return value.normalize().to_string();
        }
    }

    shift_digits(amount, decimals as usize)
}

/// Gas fee in base units: gas_used * gas_price, scaled by 18 decimals.
/// Returns None when either factor is not a non-negative integer.
pub fn gas_fee(gas_used: &str, gas_price: &str) -> Option<String> {
    let used: u128 = gas_used.trim().parse().ok()?;
    let price: u128 = gas_price.trim().parse().ok()?;
    let fee = used.checked_mul(price)?;
    Some(scale_base_units(&fee.to_string(), NATIVE_DECIMALS))
}

fn strip_leading_zeros(digits: &str) -> String {
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Insert a decimal point `decimals` places from the right of a digit string.
fn shift_digits(digits: &str, decimals: usize) -> String {
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits.to_string()
    };

    let split = padded.len() - decimals;
    let integer = strip_leading_zeros(&padded[..split]);
    let fraction = padded[split..].trim_end_matches('0');

    if fraction.is_empty() {
        integer
    } else {
        format!("{}.{}", integer, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_ether() {
        assert_eq!(scale_base_units("1000000000000000000", 18), "1");
    }

    #[test]
    fn test_two_and_a_half() {
        assert_eq!(scale_base_units("2500000000000000000", 18), "2.5");
    }

    #[test]
    fn test_zero_collapses() {
        assert_eq!(scale_base_units("0", 18), "0");
        assert_eq!(scale_base_units("000", 6), "0");
    }

    #[test]
    fn test_small_fraction_no_scientific_notation() {
        assert_eq!(scale_base_units("1", 18), "0.000000000000000001");
        assert_eq!(scale_base_units("21000000000000", 18), "0.000021");
    }

    #[test]
    fn test_zero_decimals_passes_count_through() {
        assert_eq!(scale_base_units("42", 0), "42");
        assert_eq!(scale_base_units("007", 0), "7");
    }

    #[test]
    fn test_six_decimal_token() {
        assert_eq!(scale_base_units("1500000", 6), "1.5");
        assert_eq!(scale_base_units("1000001", 6), "1.000001");
    }

    #[test]
    fn test_amount_beyond_decimal_mantissa() {
        // 40 digits, far past rust_decimal's 28-digit range
        assert_eq!(
            scale_base_units("1000000000000000000000000000000000000000", 18),
            "1000000000000000000000"
        );
        assert_eq!(
            scale_base_units("1234567890123456789012345678901234567891", 18),
            "1234567890123456789012.345678901234567891"
        );
    }

    #[test]
    fn test_non_numeric_passes_through() {
        assert_eq!(scale_base_units("not-a-number", 18), "not-a-number");
        assert_eq!(scale_base_units("1.5", 18), "1.5");
        assert_eq!(scale_base_units("", 18), "");
    }

    #[test]
    fn test_gas_fee_standard_transfer() {
        assert_eq!(
            gas_fee("21000", "1000000000").as_deref(),
            Some("0.000021")
        );
    }

    #[test]
    fn test_gas_fee_rejects_garbage() {
        assert_eq!(gas_fee("", "1000000000"), None);
        assert_eq!(gas_fee("21000", "fast"), None);
    }
}
