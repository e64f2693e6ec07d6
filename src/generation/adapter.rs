use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::ProviderConfig;
use crate::generation::normalize::{normalize_reply, strip_code_fences};
use crate::generation::provider::ProviderClient;

/// What a generation call always yields. `used_fallback` lets clients tell
/// real provider output apart from the offline placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub text: String,
    pub used_fallback: bool,
}

/// The one generation capability the handlers depend on. Implementations
/// must not fail: any provider trouble becomes fallback text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationOutcome;
}

/// Wraps the provider client (when a credential is configured) and the
/// deterministic fallback. Callers never see the provider's errors.
pub struct GenerationAdapter {
    provider: Option<ProviderClient>,
}

impl GenerationAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let provider = config.api_key.and_then(|key| {
            ProviderClient::new(key, config.model.clone(), timeout)
                .map_err(|e| warn!(error = %e, "provider client unavailable, running fallback-only"))
                .ok()
        });
        Self { provider }
    }
}

#[async_trait]
impl Generator for GenerationAdapter {
    async fn generate(&self, prompt: &str) -> GenerationOutcome {
        let Some(provider) = &self.provider else {
            return fallback(prompt);
        };

        match provider.complete(&build_instruction(prompt)).await {
            Ok(reply) => {
                let text = strip_code_fences(&normalize_reply(&reply));
                if text.trim().is_empty() {
                    warn!("provider reply contained no text, using fallback");
                    fallback(prompt)
                } else {
                    GenerationOutcome {
                        text,
                        used_fallback: false,
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "provider call failed, using fallback");
                fallback(prompt)
            }
        }
    }
}

/// The instruction sent to the provider. Wording is a product detail; the
/// structural contract is only that the user prompt is embedded verbatim.
pub fn build_instruction(prompt: &str) -> String {
    format!(
        "You are an expert frontend developer specializing in modern, responsive UI \
         components built with Tailwind CSS.\n\n\
         User request: {prompt}\n\n\
         Requirements:\n\
         1. Produce a complete, production-ready HTML component using Tailwind CSS.\n\
         2. The markup must be fully responsive (mobile-first), accessible (semantic \
         HTML, ARIA labels), and use Tailwind utility classes only.\n\
         3. Use proper spacing, Tailwind palette colors, and typography, with \
         hover/focus states on interactive elements.\n\n\
         Return ONLY the HTML code, with no explanations."
    )
}

/// Deterministic placeholder used when no credential is configured or the
/// provider fails. A pure function of the prompt, so the same prompt always
/// renders the same markup offline.
pub fn fallback(prompt: &str) -> GenerationOutcome {
    let heading = escape_html(&prompt.chars().take(120).collect::<String>());
    let text = format!(
        "<div class=\"p-6 bg-white rounded-lg shadow\">\n\
         \x20 <h1 class=\"text-xl font-semibold text-gray-900\">{heading}</h1>\n\
         \x20 <p class=\"mt-2 text-gray-600\">Offline placeholder preview. Configure a \
         provider key to generate real components.</p>\n\
         </div>"
    );
    GenerationOutcome {
        text,
        used_fallback: true,
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn fallback_only_adapter() -> GenerationAdapter {
        GenerationAdapter::new(ProviderConfig {
            api_key: None,
            model: "test-model".into(),
            timeout_secs: 1,
        })
    }

    #[test]
    fn fallback_is_deterministic() {
        let a = fallback("a login form");
        let b = fallback("a login form");
        assert_eq!(a, b);
        assert!(a.used_fallback);
        assert!(a.text.contains("a login form"));
    }

    #[test]
    fn fallback_escapes_markup_in_prompt() {
        let out = fallback("<script>alert(1)</script> & more");
        assert!(!out.text.contains("<script>"));
        assert!(out.text.contains("&lt;script&gt;"));
        assert!(out.text.contains("&amp; more"));
    }

    #[test]
    fn fallback_truncates_long_prompts() {
        let prompt = "x".repeat(500);
        let out = fallback(&prompt);
        assert!(out.text.contains(&"x".repeat(120)));
        assert!(!out.text.contains(&"x".repeat(121)));
    }

    #[test]
    fn instruction_embeds_prompt_verbatim() {
        let instruction = build_instruction("a pricing table");
        assert!(instruction.contains("a pricing table"));
    }

    #[tokio::test]
    async fn adapter_without_credential_uses_fallback() {
        let adapter = fallback_only_adapter();
        let first = adapter.generate("a navbar").await;
        let second = adapter.generate("a navbar").await;
        assert!(first.used_fallback);
        assert_eq!(first, second);
    }
}
