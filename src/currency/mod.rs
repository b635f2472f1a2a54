//! Cent arithmetic and locale-aware presentation of monetary values.
//!
//! Schedule computations work on raw `f64` amounts with two decimals of
//! precision; the helpers here convert to and from whole cents so that sums
//! never drift, and render amounts for the shell.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

/// Locale-aware formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub date_format: DateFormatStyle,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language_tag: "en-US".into(),
            decimal_separator: '.',
            grouping_separator: ',',
            date_format: DateFormatStyle::Short,
        }
    }
}

impl LocaleConfig {
    /// Builds separators for a handful of well-known language tags.
    pub fn for_tag(tag: &str) -> Self {
        let (decimal_separator, grouping_separator, date_format) = match tag {
            "de-DE" | "es-ES" | "pt-BR" | "it-IT" => (',', '.', DateFormatStyle::Medium),
            "fr-FR" => (',', ' ', DateFormatStyle::Medium),
            "en-GB" => ('.', ',', DateFormatStyle::Medium),
            _ => ('.', ',', DateFormatStyle::Short),
        };
        Self {
            language_tag: tag.to_string(),
            decimal_separator,
            grouping_separator,
            date_format,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatOptions {
    pub currency_display: CurrencyDisplay,
    pub negative_style: NegativeStyle,
    pub screen_reader_mode: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            currency_display: CurrencyDisplay::Symbol,
            negative_style: NegativeStyle::Sign,
            screen_reader_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NegativeStyle {
    Sign,
    Parentheses,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CurrencyDisplay {
    Symbol,
    Code,
    SymbolAndCode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateFormatStyle {
    Short,
    Medium,
    Long,
}

/// Converts an amount to whole cents, rounding half away from zero.
pub fn to_cents(amount: f64) -> i64 {
    if !amount.is_finite() {
        return 0;
    }
    (amount * 100.0).round() as i64
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Rounds an amount to two decimals.
pub fn round_cents(amount: f64) -> f64 {
    from_cents(to_cents(amount))
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "BRL" => "R$".into(),
        "MXN" => "MX$".into(),
        "JPY" => "¥".into(),
        _ => code.into(),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let body = format!("{:.*}", precision as usize, value);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), Some(frac_part.to_string())),
        None => (body, None),
    };
    let grouped = group_digits(&int_part, locale.grouping_separator);
    match frac_part {
        Some(frac) => format!("{}{}{}", grouped, locale.decimal_separator, frac),
        None => grouped,
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    format!("{}{}", sign, grouped)
}

pub fn format_currency_value(
    amount: f64,
    code: &CurrencyCode,
    locale: &LocaleConfig,
    options: &FormatOptions,
) -> String {
    let precision = minor_units_for(code.as_str());
    let mut body = format_number(locale, amount.abs(), precision);
    let negative = amount < 0.0 && round_cents(amount) != 0.0;
    if negative {
        body = match options.negative_style {
            NegativeStyle::Sign => format!("-{}", body),
            NegativeStyle::Parentheses => format!("({})", body),
        };
    }
    let symbol = symbol_for(code.as_str());
    let formatted = match options.currency_display {
        CurrencyDisplay::Symbol => format!("{}{}", symbol, body),
        CurrencyDisplay::Code => format!("{} {}", code.as_str(), body),
        CurrencyDisplay::SymbolAndCode => format!("{}{} ({})", symbol, body, code.as_str()),
    };
    if options.screen_reader_mode {
        let spoken = formatted
            .trim_start_matches('-')
            .trim_matches(|c| c == '(' || c == ')');
        if negative {
            format!("minus {} {}", code.as_str(), spoken)
        } else {
            format!("{} {}", code.as_str(), spoken)
        }
    } else {
        formatted
    }
}

pub fn format_date(locale: &LocaleConfig, date: NaiveDate) -> String {
    match locale.date_format {
        DateFormatStyle::Short => date.format("%Y-%m-%d").to_string(),
        DateFormatStyle::Medium => format!(
            "{:02} {} {}",
            date.day(),
            month_label(date.month()),
            date.year()
        ),
        DateFormatStyle::Long => format!(
            "{}, {} {:02} {}",
            date.weekday(),
            month_label(date.month()),
            date.day(),
            date.year()
        ),
    }
}

fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_round_half_away_from_zero() {
        assert_eq!(to_cents(0.125), 13);
        assert_eq!(to_cents(-0.125), -13);
        assert_eq!(to_cents(333.34), 33334);
        assert_eq!(to_cents(f64::NAN), 0);
        assert_eq!(round_cents(1.239), 1.24);
    }

    #[test]
    fn groups_thousands_with_locale_separators() {
        let locale = LocaleConfig::for_tag("de-DE");
        assert_eq!(format_number(&locale, 1234567.5, 2), "1.234.567,50");
        let us = LocaleConfig::default();
        assert_eq!(format_number(&us, -1000.0, 2), "-1,000.00");
    }

    #[test]
    fn formats_currency_by_display_style() {
        let locale = LocaleConfig::default();
        let usd = CurrencyCode::new("usd");
        let mut options = FormatOptions::default();
        assert_eq!(
            format_currency_value(333.34, &usd, &locale, &options),
            "$333.34"
        );
        options.currency_display = CurrencyDisplay::Code;
        options.negative_style = NegativeStyle::Parentheses;
        assert_eq!(
            format_currency_value(-12.5, &usd, &locale, &options),
            "USD (12.50)"
        );
    }

    #[test]
    fn screen_reader_mode_spells_out_sign() {
        let options = FormatOptions {
            screen_reader_mode: true,
            ..FormatOptions::default()
        };
        let rendered = format_currency_value(
            -5.0,
            &CurrencyCode::default(),
            &LocaleConfig::default(),
            &options,
        );
        assert_eq!(rendered, "minus USD $5.00");
    }

    #[test]
    fn formats_dates_by_style() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let mut locale = LocaleConfig::default();
        assert_eq!(format_date(&locale, date), "2025-02-03");
        locale.date_format = DateFormatStyle::Medium;
        assert_eq!(format_date(&locale, date), "03 Feb 2025");
    }
}
