// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::{currency::CurrencyLocale, i18n::DEFAULT_LANG};

// Extrator de idioma: guarda a tag completa ("sv-SE"), porque a moeda depende dela
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    /// Só o idioma ("sv-SE" -> "sv"), usado pelo catálogo de mensagens.
    pub fn lang(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    pub fn currency_locale(&self) -> CurrencyLocale {
        CurrencyLocale::from_tag(&self.0)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first() // Pega o idioma preferido (ex: "sv-SE")
                    .map(|tag| Locale(tag.to_string()))
            })
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header_value: Option<&str>) -> Locale {
        let mut builder = Request::builder();
        if let Some(value) = header_value {
            builder = builder.header(header::ACCEPT_LANGUAGE, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Locale::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn keeps_the_full_preferred_tag() {
        let locale = extract(Some("sv-SE,sv;q=0.9,en;q=0.8")).await;
        assert_eq!(locale.0, "sv-SE");
        assert_eq!(locale.lang(), "sv");
        assert_eq!(locale.currency_locale(), CurrencyLocale::Swedish);
    }

    #[tokio::test]
    async fn missing_header_defaults_to_turkish() {
        let locale = extract(None).await;
        assert_eq!(locale.lang(), "tr");
        assert_eq!(locale.currency_locale(), CurrencyLocale::Turkish);
    }
}
