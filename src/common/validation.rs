// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

/// Valores monetários e quantidades nunca podem ser negativos.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("non_negative".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_only_negative_values() {
        assert!(non_negative(&Decimal::ZERO).is_ok());
        assert!(non_negative(&Decimal::new(1050, 2)).is_ok());
        assert!(non_negative(&Decimal::new(-1, 2)).is_err());
    }
}
