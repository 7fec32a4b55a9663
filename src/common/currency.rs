// src/common/currency.rs
//
// Formatação de valores monetários e datas por idioma.
// Todo ponto do sistema que exibe dinheiro passa por `format_currency`.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CurrencyLocale {
    Turkish, // tr-TR (padrão)
    English, // en-US
    Swedish, // sv-SE
}

impl CurrencyLocale {
    /// Resolve pelo prefixo da tag ("sv-SE" -> sueco, "en" -> inglês, o resto -> turco).
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        if tag.starts_with("sv") {
            CurrencyLocale::Swedish
        } else if tag.starts_with("en") {
            CurrencyLocale::English
        } else {
            CurrencyLocale::Turkish
        }
    }

    pub fn numeric_locale(self) -> &'static str {
        match self {
            CurrencyLocale::Turkish => "tr-TR",
            CurrencyLocale::English => "en-US",
            CurrencyLocale::Swedish => "sv-SE",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CurrencyLocale::Turkish => "₺",
            CurrencyLocale::English => "$",
            CurrencyLocale::Swedish => "kr",
        }
    }

    pub fn currency_code(self) -> &'static str {
        match self {
            CurrencyLocale::Turkish => "TRY",
            CurrencyLocale::English => "USD",
            CurrencyLocale::Swedish => "SEK",
        }
    }

    fn group_separator(self) -> char {
        match self {
            CurrencyLocale::Turkish => '.',
            CurrencyLocale::English => ',',
            CurrencyLocale::Swedish => ' ',
        }
    }

    fn symbol_at_end(self) -> bool {
        matches!(self, CurrencyLocale::Swedish)
    }
}

/// Valor absoluto arredondado para unidades inteiras e agrupado por milhar, sem símbolo.
pub fn format_amount(amount: Decimal, locale: CurrencyLocale) -> String {
    let whole = amount
        .abs()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .trunc();

    group_digits(&whole.to_string(), locale.group_separator())
}

/// Formata um valor monetário para a tag de idioma ativa.
///
/// Nunca há casas decimais. O sinal negativo vem antes do símbolo (`-₺1.234`)
/// ou antes do número quando o símbolo é sufixo (`-1 234 kr`).
pub fn format_currency(amount: Decimal, locale_tag: &str) -> String {
    format_currency_in(amount, CurrencyLocale::from_tag(locale_tag))
}

pub fn format_currency_in(amount: Decimal, locale: CurrencyLocale) -> String {
    let magnitude = format_amount(amount, locale);
    // -0,4 arredonda para zero: sem sinal
    let sign = if amount.is_sign_negative() && magnitude != "0" { "-" } else { "" };

    if locale.symbol_at_end() {
        format!("{}{} {}", sign, magnitude, locale.symbol())
    } else {
        format!("{}{}{}", sign, locale.symbol(), magnitude)
    }
}

/// Data curta no formato do idioma (15.03.2024 / 3/15/2024 / 2024-03-15).
pub fn format_date(date: NaiveDate, locale: CurrencyLocale) -> String {
    let pattern = match locale {
        CurrencyLocale::Turkish => "%d.%m.%Y",
        CurrencyLocale::English => "%-m/%-d/%Y",
        CurrencyLocale::Swedish => "%Y-%m-%d",
    };
    date.format(pattern).to_string()
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn swedish_uses_suffix_and_space_grouping() {
        assert_eq!(format_currency(dec(1500), "sv-SE"), "1 500 kr");
        assert_eq!(format_currency(dec(-1234), "sv"), "-1 234 kr");
    }

    #[test]
    fn english_uses_dollar_prefix() {
        assert_eq!(format_currency(dec(1500), "en-US"), "$1,500");
        assert_eq!(format_currency(dec(1_234_567), "en"), "$1,234,567");
    }

    #[test]
    fn anything_else_falls_back_to_lira() {
        assert_eq!(format_currency(dec(1234), "tr"), "₺1.234");
        assert_eq!(format_currency(dec(-1234), "tr-TR"), "-₺1.234");
        assert_eq!(format_currency(dec(500), "de-DE"), "₺500");
        assert_eq!(format_currency(dec(500), ""), "₺500");
    }

    #[test]
    fn rounds_to_whole_units_half_away_from_zero() {
        assert_eq!(format_currency(Decimal::new(149_950, 2), "en"), "$1,500");
        assert_eq!(format_currency(Decimal::new(1_2345, 1), "en"), "$1,235");
        assert_eq!(format_currency(Decimal::new(-25, 1), "en"), "-$3");
        assert_eq!(format_currency(Decimal::new(4999, 2), "tr"), "₺50");
    }

    #[test]
    fn small_numbers_are_not_grouped() {
        assert_eq!(format_currency(Decimal::ZERO, "sv"), "0 kr");
        assert_eq!(format_currency(dec(999), "en"), "$999");
        assert_eq!(format_currency(dec(1000), "tr"), "₺1.000");
    }

    #[test]
    fn dates_follow_the_locale() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(date, CurrencyLocale::Turkish), "05.03.2024");
        assert_eq!(format_date(date, CurrencyLocale::English), "3/5/2024");
        assert_eq!(format_date(date, CurrencyLocale::Swedish), "2024-03-05");
    }

    fn any_tag() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("sv-SE"), Just("sv"), Just("en-US"), Just("en-GB"), Just("tr"), Just("fr")]
    }

    proptest! {
        #[test]
        fn non_negative_amounts_carry_only_the_locale_symbol(
            units in 0i64..10_000_000_000,
            cents in 0i64..100,
            tag in any_tag()
        ) {
            let amount = Decimal::from(units) + Decimal::new(cents, 2);
            let locale = CurrencyLocale::from_tag(tag);
            let out = format_currency(amount, tag);

            prop_assert_eq!(out.matches(locale.symbol()).count(), 1);
            for other in ["₺", "$", "kr"] {
                if other != locale.symbol() {
                    prop_assert!(!out.contains(other));
                }
            }
            // separador decimal do idioma nunca aparece
            let decimal_separator = if locale == CurrencyLocale::English { '.' } else { ',' };
            prop_assert!(!out.contains(decimal_separator));
        }

        #[test]
        fn negation_only_prepends_a_minus(units in 1i64..10_000_000_000, tag in any_tag()) {
            let amount = Decimal::from(units);
            let positive = format_currency(amount, tag);
            let negative = format_currency(-amount, tag);
            prop_assert!(negative.starts_with('-'));
            prop_assert_eq!(negative, format!("-{}", positive));
        }
    }
}
