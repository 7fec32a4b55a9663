// src/services/edge.rs
//
// Acesso HTTP ao backend externo (edge functions e storage).
// Cada chamada vai com o token do próprio usuário; a chave anônima só identifica o projeto.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct EdgeClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

// Corpo de erro padrão das edge functions
#[derive(Debug, Deserialize)]
struct EdgeErrorBody {
    error: Option<String>,
}

impl EdgeClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST autenticado para uma edge function (`/functions/v1/{name}`).
    pub fn function<B: Serialize + ?Sized>(&self, name: &str, token: &str, body: &B) -> RequestBuilder {
        self.authorized(self.http.post(self.url(&format!("functions/v1/{}", name))), token)
            .json(body)
    }

    pub fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.bearer_auth(token).header("apikey", &self.anon_key)
    }

    pub fn http(&self) -> &Client {
        &self.http
    }
}

/// Extrai a mensagem de `{"error": "..."}`; se não houver, usa o status.
pub async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<EdgeErrorBody>().await {
        Ok(EdgeErrorBody { error: Some(message) }) => message,
        _ => format!("HTTP {}", status.as_u16()),
    }
}
