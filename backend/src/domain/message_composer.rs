//! Human-readable messages for students and the manager.
//!
//! Text comes from an AI model when one is configured. The model may fail,
//! time out or answer with nothing useful, so every message has a
//! deterministic template and [`MessageService`] always returns one or the
//! other, never an error.

use async_trait::async_trait;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared::ClassSession;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{AiSettings, StudioInfo};

#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI returned an empty response")]
    EmptyResponse,

    #[error("no AI key configured")]
    MissingApiKey,
}

/// Source of generated message text
#[async_trait]
pub trait MessageComposer: Send + Sync {
    async fn compose_welcome(&self, name: &str, access_link: &str) -> Result<String, ComposerError>;

    async fn compose_farewell(&self, name: &str) -> Result<String, ComposerError>;

    async fn compose_reminder(
        &self,
        name: &str,
        amount: f64,
        due_date: &str,
    ) -> Result<String, ComposerError>;

    async fn compose_schedule_summary(
        &self,
        sessions: &[ClassSession],
    ) -> Result<String, ComposerError>;
}

/// Preambles models like to put before the actual message
static PREAMBLES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)Aqui está uma sugestão de mensagem curta, clara e acolhedora:\s*-*\s*",
        r"(?i)^Aqui está uma sugestão de mensagem.*:?\s*",
        r"(?i)^Aqui está a sua mensagem.*:?\s*",
        r"(?i)^Certamente! Aqui está.*:?\s*",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Strip AI preambles and surrounding whitespace
pub fn clean_response(text: &str) -> String {
    let mut cleaned = text.to_string();
    for pattern in PREAMBLES.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}

/// The deterministic texts used whenever AI text is unavailable
#[derive(Debug, Clone)]
pub struct FallbackTemplates {
    studio: StudioInfo,
}

impl FallbackTemplates {
    pub fn new(studio: StudioInfo) -> Self {
        Self { studio }
    }

    pub fn welcome(&self, name: &str, access_link: &str) -> String {
        format!(
            "Seja muito bem-vindo(a) ao estúdio de pilates, {}! 🌿 Acesse sua área individual aqui: {} para gerenciar suas aulas e financeiro. ✨",
            name, access_link
        )
    }

    pub fn farewell(&self, name: &str) -> String {
        format!(
            "Até breve, {}! 🙏 Agradecemos por confiar no nosso trabalho e estaremos sempre aqui quando quiser voltar. ✨",
            name
        )
    }

    pub fn reminder(&self, name: &str, due_date: &str) -> String {
        format!(
            "Olá, {}! 🌿 Passando para lembrar que o vencimento da sua mensalidade no estúdio de pilates está próximo ({}). ✨",
            name, due_date
        )
    }

    pub fn schedule_summary(&self) -> String {
        format!(
            "{}, seu estúdio de pilates está pronto para transformar vidas hoje!",
            self.studio.owner_name
        )
    }

    /// Shown to a student instead of the manager's agenda summary
    pub fn student_greeting(&self) -> String {
        "Olá! Estamos focados no seu Movimento Eficiente hoje. Menos dor, mais vida!".to_string()
    }
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Composer backed by the Gemini `generateContent` REST endpoint
pub struct GeminiComposer {
    client: reqwest::Client,
    settings: AiSettings,
    studio: StudioInfo,
}

impl GeminiComposer {
    pub fn new(settings: AiSettings, studio: StudioInfo) -> Result<Self, ComposerError> {
        if !settings.is_enabled() {
            return Err(ComposerError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            settings,
            studio,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, ComposerError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!("Requesting AI text from model {}", self.settings.model);
        let response: GenerateResponse = self
            .client
            .post(&url)
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = clean_response(&response.text());
        if text.is_empty() {
            return Err(ComposerError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl MessageComposer for GeminiComposer {
    async fn compose_welcome(
        &self,
        name: &str,
        access_link: &str,
    ) -> Result<String, ComposerError> {
        let prompt = format!(
            "Gere uma mensagem curta e calorosa de boas-vindas para o WhatsApp do novo aluno(a) {} do estúdio de pilates da {}. \
             Mencione que o acesso ao App é feito pelo link: {}. \
             Explique que no App ele(a) poderá trocar horários, ver pagamentos e gerenciar seu perfil. \
             Tom de saúde e bem-estar. Não use termos complexos. Emojis: ✨🌿. \
             IMPORTANTE: Retorne APENAS o texto da mensagem final, sem nenhuma introdução ou frase explicativa. \
             A frase de abertura deve ser \"Seja muito bem-vindo(a) ao estúdio de pilates\".",
            name, self.studio.owner_name, access_link
        );
        self.generate(&prompt).await
    }

    async fn compose_farewell(&self, name: &str) -> Result<String, ComposerError> {
        let prompt = format!(
            "Gere uma mensagem de despedida carinhosa para o WhatsApp do aluno(a) {} que está deixando o estúdio de pilates. \
             Agradeça pelo tempo juntos e diga que as portas estarão sempre abertas. Tom profissional porém acolhedor. Emojis: ✨🙏. \
             IMPORTANTE: Retorne APENAS o texto da mensagem final, sem nenhuma introdução ou frase explicativa.",
            name
        );
        self.generate(&prompt).await
    }

    async fn compose_reminder(
        &self,
        name: &str,
        amount: f64,
        due_date: &str,
    ) -> Result<String, ComposerError> {
        let prompt = format!(
            "Gere uma mensagem para WhatsApp para o aluno(a) {} do estúdio de pilates. Valor: R${:.2}, vencimento em {}. \
             O tom deve ser polido, focado em saúde. Termine com o endereço {}. Use emojis como ✨ e 🌿. \
             IMPORTANTE: Retorne APENAS o texto da mensagem final.",
            name, amount, due_date, self.studio.address
        );
        self.generate(&prompt).await
    }

    async fn compose_schedule_summary(
        &self,
        sessions: &[ClassSession],
    ) -> Result<String, ComposerError> {
        let agenda = serde_json::to_string(sessions).unwrap_or_else(|_| "[]".to_string());
        let prompt = format!(
            "Resuma a agenda de hoje para {} do estúdio de pilates. Use um tom motivacional. Agenda: {}. \
             IMPORTANTE: Retorne APENAS o texto do resumo.",
            self.studio.owner_name, agenda
        );
        self.generate(&prompt).await
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Infallible message source: composer text when available, template otherwise
#[derive(Clone)]
pub struct MessageService {
    composer: Option<Arc<dyn MessageComposer>>,
    fallback: Arc<FallbackTemplates>,
}

impl MessageService {
    pub fn new(composer: Option<Arc<dyn MessageComposer>>, studio: StudioInfo) -> Self {
        Self {
            composer,
            fallback: Arc::new(FallbackTemplates::new(studio)),
        }
    }

    /// Build from settings: Gemini when a key is configured, templates only otherwise
    pub fn from_settings(settings: &AiSettings, studio: StudioInfo) -> Self {
        let composer: Option<Arc<dyn MessageComposer>> =
            match GeminiComposer::new(settings.clone(), studio.clone()) {
                Ok(gemini) => {
                    info!("AI messages enabled with model {}", settings.model);
                    Some(Arc::new(gemini))
                }
                Err(e) => {
                    info!("AI messages disabled: {}", e);
                    None
                }
            };
        Self::new(composer, studio)
    }

    pub fn templates(&self) -> &FallbackTemplates {
        &self.fallback
    }

    fn pick(
        kind: &str,
        generated: Option<Result<String, ComposerError>>,
        fallback: String,
    ) -> String {
        match generated {
            Some(Ok(text)) if !text.trim().is_empty() => text,
            Some(Ok(_)) => {
                warn!("AI {} message was empty, using template", kind);
                fallback
            }
            Some(Err(e)) => {
                warn!("AI {} message failed, using template: {}", kind, e);
                fallback
            }
            None => fallback,
        }
    }

    pub async fn welcome(&self, name: &str, access_link: &str) -> String {
        let generated = match &self.composer {
            Some(c) => Some(c.compose_welcome(name, access_link).await),
            None => None,
        };
        Self::pick("welcome", generated, self.fallback.welcome(name, access_link))
    }

    pub async fn farewell(&self, name: &str) -> String {
        let generated = match &self.composer {
            Some(c) => Some(c.compose_farewell(name).await),
            None => None,
        };
        Self::pick("farewell", generated, self.fallback.farewell(name))
    }

    pub async fn reminder(&self, name: &str, amount: f64, due_date: &str) -> String {
        let generated = match &self.composer {
            Some(c) => Some(c.compose_reminder(name, amount, due_date).await),
            None => None,
        };
        Self::pick("reminder", generated, self.fallback.reminder(name, due_date))
    }

    pub async fn schedule_summary(&self, sessions: &[ClassSession]) -> String {
        let generated = match &self.composer {
            Some(c) => Some(c.compose_schedule_summary(sessions).await),
            None => None,
        };
        Self::pick("summary", generated, self.fallback.schedule_summary())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted composer for service tests
    pub struct ScriptedComposer {
        pub reply: Option<String>,
        pub calls: AtomicUsize,
    }

    impl ScriptedComposer {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn answer(&self) -> Result<String, ComposerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or(ComposerError::EmptyResponse)
        }
    }

    #[async_trait]
    impl MessageComposer for ScriptedComposer {
        async fn compose_welcome(
            &self,
            _name: &str,
            _access_link: &str,
        ) -> Result<String, ComposerError> {
            self.answer()
        }

        async fn compose_farewell(&self, _name: &str) -> Result<String, ComposerError> {
            self.answer()
        }

        async fn compose_reminder(
            &self,
            _name: &str,
            _amount: f64,
            _due_date: &str,
        ) -> Result<String, ComposerError> {
            self.answer()
        }

        async fn compose_schedule_summary(
            &self,
            _sessions: &[ClassSession],
        ) -> Result<String, ComposerError> {
            self.answer()
        }
    }
}
