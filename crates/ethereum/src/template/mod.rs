//! Contract source templates
//!
//! Holds the fixed meme coin contract and fills in its name, symbol and
//! supply placeholders.

use handlebars::Handlebars;
use memecoin_core::{Error, Result};
use serde_json::json;

const MEME_COIN_TEMPLATE: &str = "meme_coin";

/// Transaction cap hard-coded in the contract, as a percentage of supply
pub const TEMPLATE_TRANSACTION_LIMIT_PERCENT: u64 = 1;

/// Wallet cap hard-coded in the contract, as a percentage of supply
pub const TEMPLATE_MAX_WALLET_PERCENT: u64 = 2;

/// Renders contract source from the built-in template
pub struct ContractTemplate {
    handlebars: Handlebars<'static>,
}

impl ContractTemplate {
    /// Create a renderer with the meme coin template registered
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars
            .register_template_string(MEME_COIN_TEMPLATE, include_str!("meme_coin.sol.hbs"))
            .map_err(|e| Error::template(format!("Failed to register {} template: {}", MEME_COIN_TEMPLATE, e)))?;

        Ok(Self { handlebars })
    }

    /// Substitute name, symbol and whole-token supply into the contract
    pub fn render(&self, name: &str, symbol: &str, total_supply: u64) -> Result<String> {
        let data = json!({
            "token_name": name,
            "token_symbol": symbol,
            "total_supply": total_supply,
        });

        self.handlebars
            .render(MEME_COIN_TEMPLATE, &data)
            .map_err(|e| Error::template(format!("Failed to render template {}: {}", MEME_COIN_TEMPLATE, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_every_placeholder() {
        let source = ContractTemplate::new()
            .unwrap()
            .render("CyberDog", "CDOG", 500_000_000)
            .unwrap();

        assert!(source.contains("contract CyberDogToken is ERC20, Ownable"));
        assert!(source.contains(r#"ERC20("CyberDog", "CDOG")"#));
        assert!(source.contains("500000000 * 10**18"));
        assert!(!source.contains("{{"));
        assert!(!source.contains("}}"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = ContractTemplate::new().unwrap();
        let first = template.render("MoonCat", "MCAT", 100_000_000).unwrap();
        let second = ContractTemplate::new()
            .unwrap()
            .render("MoonCat", "MCAT", 100_000_000)
            .unwrap();

        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_limits_follow_fixed_percentages() {
        let source = ContractTemplate::new().unwrap().render("A1", "AAA", 100_000_000).unwrap();

        assert!(source.contains(&format!(
            "MAX_TRANSACTION_AMOUNT = TOTAL_SUPPLY / {}",
            100 / TEMPLATE_TRANSACTION_LIMIT_PERCENT
        )));
        assert!(source.contains(&format!(
            "MAX_WALLET_AMOUNT = TOTAL_SUPPLY / {}",
            100 / TEMPLATE_MAX_WALLET_PERCENT
        )));
        assert!(source.contains("function excludeFromLimits(address account) external onlyOwner"));
        assert!(source.contains("function includeInLimits(address account) external onlyOwner"));
    }
}
