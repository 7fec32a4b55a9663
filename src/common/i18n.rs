// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

// Idioma usado quando o cliente não manda Accept-Language ou manda um que não temos.
pub const DEFAULT_LANG: &str = "tr";

const CATALOGS: [(&str, &str); 3] = [
    ("tr", include_str!("../../locales/tr.json")),
    ("en", include_str!("../../locales/en.json")),
    ("sv", include_str!("../../locales/sv.json")),
];

/// Catálogo de mensagens traduzidas (erros, títulos de relatório, planos).
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    /// Carrega os catálogos embutidos no binário.
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de idioma inválido: {}", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Busca a mensagem no idioma pedido, caindo para o turco e, por último, para a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    /// Igual a `translate`, substituindo `{nome}` pelos argumentos.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }

    pub fn has_key(&self, lang: &str, key: &str) -> bool {
        self.lookup(lang, key).is_some()
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_catalogs_share_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let reference = &store.catalogs[DEFAULT_LANG];
        for (lang, messages) in &store.catalogs {
            for key in reference.keys() {
                assert!(messages.contains_key(key), "{} sem a chave {}", lang, key);
            }
        }
    }

    #[test]
    fn unknown_language_falls_back_to_turkish() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("de", "admin_required"), store.translate("tr", "admin_required"));
        assert_eq!(store.translate("en", "no.such.key"), "no.such.key");
    }

    #[test]
    fn interpolates_limit_arguments() {
        let store = I18nStore::load().unwrap();
        let message = store.translate_with(
            "en",
            "projects_limit_reached",
            &[("current", "3".to_string()), ("limit", "3".to_string())],
        );
        assert!(message.contains("3/3"));
        assert!(!message.contains('{'));
    }
}
