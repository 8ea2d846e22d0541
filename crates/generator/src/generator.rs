use std::sync::Arc;

use memecoin_core::{CoinIdentity, Error, Result, Tokenomics};
use tracing::{debug, info};

use crate::client::{ChatMessage, CompletionClient, CompletionRequest};
use crate::validation::{parse_identity, parse_tokenomics};

const NAMING_TEMPERATURE: f32 = 0.8;
const NAMING_MAX_TOKENS: u32 = 150;
const TOKENOMICS_TEMPERATURE: f32 = 0.7;
const TOKENOMICS_MAX_TOKENS: u32 = 100;
const PING_TEMPERATURE: f32 = 0.7;
const PING_MAX_TOKENS: u32 = 50;

const NAMING_SYSTEM_PROMPT: &str =
    "You are a cryptocurrency naming expert. Respond only with valid JSON.";
const TOKENOMICS_SYSTEM_PROMPT: &str =
    "You are a tokenomics expert. Respond with ONLY the JSON object, no markdown formatting, no explanation.";

/// Generates coin identities and tokenomics through a completion service
pub struct CoinGenerator {
    client: Arc<dyn CompletionClient>,
    model: String,
}

impl CoinGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Make one cheap completion call and fail fast if the service is not usable
    pub async fn verify_connection(&self) -> Result<()> {
        let request = self.request(
            vec![
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("Test connection"),
            ],
            PING_TEMPERATURE,
            PING_MAX_TOKENS,
        );

        self.client
            .complete(request)
            .await
            .map_err(|e| Error::connectivity(e.to_string()))?;

        info!(model = %self.model, "Connected to completion service");
        Ok(())
    }

    /// Invent a name, symbol and description, optionally around a theme
    pub async fn generate_name(&self, theme: Option<&str>) -> Result<CoinIdentity> {
        let request = self.request(
            vec![
                ChatMessage::system(NAMING_SYSTEM_PROMPT),
                ChatMessage::user(naming_prompt(theme)),
            ],
            NAMING_TEMPERATURE,
            NAMING_MAX_TOKENS,
        );

        let content = self.client.complete(request).await?;
        debug!(raw = %content.trim(), "Raw coin identity response");

        let identity = parse_identity(content.trim())?;
        info!(name = %identity.name, symbol = %identity.symbol, "Generated coin identity");
        Ok(identity)
    }

    /// Produce tokenomics for the named coin
    pub async fn generate_tokenomics(&self, name: &str) -> Result<Tokenomics> {
        let request = self.request(
            vec![
                ChatMessage::system(TOKENOMICS_SYSTEM_PROMPT),
                ChatMessage::user(tokenomics_prompt(name)),
            ],
            TOKENOMICS_TEMPERATURE,
            TOKENOMICS_MAX_TOKENS,
        );

        let content = self.client.complete(request).await?;
        debug!(raw = %content.trim(), "Raw tokenomics response");

        let tokenomics = parse_tokenomics(content.trim())?;
        info!(
            total_supply = tokenomics.total_supply,
            initial_liquidity_percent = tokenomics.initial_liquidity_percent,
            "Generated tokenomics"
        );
        Ok(tokenomics)
    }

    fn request(&self, messages: Vec<ChatMessage>, temperature: f32, max_tokens: u32) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens,
        }
    }
}

fn naming_prompt(theme: Option<&str>) -> String {
    let theme_context = theme
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!(" based on the theme: {}", t))
        .unwrap_or_default();

    format!(
        "Generate a creative and catchy name for a new meme cryptocurrency{}.\n\
         Strictly respond with only a JSON object in the following format:\n\
         {{\n  \"name\": \"CoinName\",\n  \"symbol\": \"SYM\",\n  \"description\": \"Brief description\"\n}}\n\n\
         Requirements for the response:\n\
         - name: Must be alphanumeric with no spaces, starting with a letter (CamelCase)\n\
         - symbol: 3-4 capital letters\n\
         - description: Keep under 100 characters",
        theme_context
    )
}

fn tokenomics_prompt(name: &str) -> String {
    format!(
        "Generate tokenomics data for the meme coin {}. \
         Response must be ONLY a JSON object with these exact fields:\n\
         {{\n  \"total_supply\": 500000000,\n  \"initial_liquidity_percent\": 75,\n  \
         \"transaction_limit_percent\": 1,\n  \"max_wallet_percent\": 2\n}}\n\n\
         total_supply must be between 100000000 and 1000000000 and \
         initial_liquidity_percent between 50 and 90.",
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use memecoin_core::Violation;
    use mockall::mock;

    mock! {
        pub Completion {}

        #[async_trait]
        impl CompletionClient for Completion {
            async fn complete(&self, request: CompletionRequest) -> Result<String>;
        }
    }

    fn generator(mock: MockCompletion) -> CoinGenerator {
        CoinGenerator::new(Arc::new(mock), "llama")
    }

    #[tokio::test]
    async fn test_generate_name_uses_naming_parameters() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .withf(|req| {
                req.model == "llama"
                    && req.temperature == NAMING_TEMPERATURE
                    && req.max_tokens == NAMING_MAX_TOKENS
                    && req.messages[1].content.contains("based on the theme: cyber dogs in space")
            })
            .times(1)
            .returning(|_| {
                Ok("```json\n{\"name\":\"CyberDog\",\"symbol\":\"CDOG\",\"description\":\"A space-faring meme coin\"}\n```".to_string())
            });

        let identity = generator(mock).generate_name(Some("cyber dogs in space")).await.unwrap();
        assert_eq!(identity.symbol, "CDOG");
    }

    #[tokio::test]
    async fn test_generate_name_without_theme() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .withf(|req| !req.messages[1].content.contains("theme"))
            .times(1)
            .returning(|_| Ok(r#"{"name":"Pepe","symbol":"PEPE","description":"frog"}"#.to_string()));

        let identity = generator(mock).generate_name(None).await.unwrap();
        assert_eq!(identity.name, "Pepe");
    }

    #[tokio::test]
    async fn test_invalid_symbol_is_a_generation_error() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .returning(|_| Ok(r#"{"name":"CyberDog","symbol":"cdog","description":"x"}"#.to_string()));

        let err = generator(mock).generate_name(None).await.unwrap_err();
        assert!(matches!(err, Error::Generation(Violation::InvalidSymbol(_))));
    }

    #[tokio::test]
    async fn test_generate_tokenomics_uses_precise_parameters() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .withf(|req| {
                req.temperature == TOKENOMICS_TEMPERATURE
                    && req.max_tokens == TOKENOMICS_MAX_TOKENS
                    && req.messages[1].content.contains("CyberDog")
            })
            .times(1)
            .returning(|_| {
                Ok("Here is the data: {\"total_supply\":500000000,\"initial_liquidity_percent\":75,\"transaction_limit_percent\":1,\"max_wallet_percent\":2} Hope it helps!".to_string())
            });

        let tokenomics = generator(mock).generate_tokenomics("CyberDog").await.unwrap();
        assert_eq!(tokenomics.total_supply, 500_000_000);
        assert_eq!(tokenomics.initial_liquidity_percent, 75);
    }

    #[tokio::test]
    async fn test_verify_connection_maps_failures() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .withf(|req| req.max_tokens == PING_MAX_TOKENS)
            .times(1)
            .returning(|_| Err(Error::completion("connection refused")));

        let err = generator(mock).verify_connection().await.unwrap_err();
        assert!(matches!(err, Error::Connectivity(msg) if msg.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_verify_connection_succeeds() {
        let mut mock = MockCompletion::new();
        mock.expect_complete().times(1).returning(|_| Ok("ok".to_string()));

        assert!(generator(mock).verify_connection().await.is_ok());
    }
}
