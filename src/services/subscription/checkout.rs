// src/services/subscription/checkout.rs
//
// Marcador de retorno do checkout: `?subscription=success`.

use reqwest::Url;

pub const MARKER_KEY: &str = "subscription";
pub const MARKER_VALUE: &str = "success";

/// Remove o marcador da URL. Devolve `true` se ele estava presente.
/// Chamar de novo na mesma URL não faz nada (idempotente).
pub fn take_checkout_marker(url: &mut Url) -> bool {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let kept: Vec<&(String, String)> = pairs
        .iter()
        .filter(|(k, v)| !(k == MARKER_KEY && v == MARKER_VALUE))
        .collect();

    if kept.len() == pairs.len() {
        return false;
    }

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept.into_iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_marker_and_keeps_other_parameters() {
        let mut url = Url::parse("https://app.example.com/dashboard?tab=reports&subscription=success").unwrap();

        assert!(take_checkout_marker(&mut url));
        assert_eq!(url.as_str(), "https://app.example.com/dashboard?tab=reports");
    }

    #[test]
    fn clearing_is_idempotent() {
        let mut url = Url::parse("https://app.example.com/?subscription=success").unwrap();

        assert!(take_checkout_marker(&mut url));
        assert_eq!(url.as_str(), "https://app.example.com/");
        assert!(!take_checkout_marker(&mut url));
        assert_eq!(url.as_str(), "https://app.example.com/");
    }

    #[test]
    fn other_subscription_values_are_not_markers() {
        let mut url = Url::parse("https://app.example.com/?subscription=cancelled").unwrap();

        assert!(!take_checkout_marker(&mut url));
        assert_eq!(url.query(), Some("subscription=cancelled"));
    }
}
