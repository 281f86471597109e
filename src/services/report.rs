use log::{debug, error, info};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

use crate::config::settings::ReportSettings;
use crate::domain::Player;
use crate::http::RateLimitedClient;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("AI credentials missing or rejected: {0}")]
    MissingCredentials(String),

    #[error("Report generation failed: {0}")]
    Failed(String),
}

impl ReportError {
    /// What the viewer should do next
    pub fn remediation(&self) -> &'static str {
        match self {
            ReportError::MissingCredentials(_) => "Configure a valid AI API key (SCOUT_AI_API_KEY) and try again",
            ReportError::Failed(_) => "Report could not be generated, try again later",
        }
    }
}

pub trait ReportGenerator: Send + Sync {
    fn generate_report(&self, player: &Player) -> impl Future<Output = Result<String, ReportError>> + Send;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
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
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Report generator backed by a generateContent-style HTTP endpoint
pub struct AiReportClient {
    client: RateLimitedClient,
    settings: ReportSettings,
}

impl AiReportClient {
    pub fn new(settings: ReportSettings) -> anyhow::Result<Self> {
        let client = RateLimitedClient::new(&settings.user_agent, settings.timeout_secs, settings.rate_limit_ms)?;
        Ok(Self { client, settings })
    }

    pub fn has_credentials(&self) -> bool {
        self.settings.api_key.is_some()
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model,
            urlencoding::encode(api_key)
        )
    }

    async fn request(&self, player: &Player) -> Result<String, ReportError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| ReportError::MissingCredentials("no API key configured".to_string()))?;

        let prompt = build_prompt(player);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
        };

        debug!("Requesting report for {} from {}", player.id, self.settings.model);
        let response = self
            .client
            .post_json(&self.endpoint(api_key), &body)
            .await
            .map_err(|e| ReportError::Failed(format!("{:#}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ReportError::Failed(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        parse_report(&text)
    }
}

impl ReportGenerator for AiReportClient {
    async fn generate_report(&self, player: &Player) -> Result<String, ReportError> {
        match self.request(player).await {
            Ok(report) => {
                info!("Generated report for {} ({} chars)", player.name, report.len());
                Ok(report)
            }
            Err(e) => {
                error!("Report for {} failed: {}", player.name, e);
                Err(e)
            }
        }
    }
}

pub fn build_prompt(player: &Player) -> String {
    let positions = player
        .positions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join("/");
    let attributes = player
        .attributes
        .named()
        .iter()
        .map(|(name, value)| format!("{}: {}/5", name, value))
        .collect::<Vec<_>>()
        .join(", ");
    let age = player
        .age
        .map(|age| age.to_string())
        .unwrap_or_else(|| "desconhecida".to_string());
    let height = player
        .height_cm
        .map(|cm| format!("{} cm", cm))
        .unwrap_or_else(|| "não informada".to_string());

    let mut prompt = format!(
        "Você é um analista de scouting de futebol. Escreva um relatório técnico em português sobre o jogador abaixo, \
         com pontos fortes, pontos a desenvolver e uma conclusão.\n\n\
         Nome: {}\nIdade: {}\nClube: {}\nCompetição: {}\nNacionalidade: {}\nPosições: {}\nPé dominante: {}\nAltura: {}\n\
         Avaliações: {}\nRecomendação: {}\nJogos observados: {}\n",
        player.name,
        age,
        player.club,
        player.competition,
        player.nationality,
        positions,
        player.foot.as_str(),
        height,
        attributes,
        player.recommendation.label(),
        player.games_watched,
    );

    if let Some(context) = player.ai_context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("Observações do analista: {}\n", context));
    }

    prompt
}

/// First candidate's text parts, joined
pub fn parse_report(body: &str) -> Result<String, ReportError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ReportError::Failed(format!("Unexpected response format: {}", e)))?;

    let report = response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if report.trim().is_empty() {
        return Err(ReportError::Failed("Response contained no report text".to_string()));
    }

    Ok(report)
}

pub fn classify_failure(status: StatusCode, body: &str) -> ReportError {
    let rejected_key = status == StatusCode::BAD_REQUEST && body.contains("API_KEY_INVALID");
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN || rejected_key {
        ReportError::MissingCredentials(format!("HTTP {}", status.as_u16()))
    } else {
        ReportError::Failed(format!("HTTP {}: {}", status.as_u16(), body.chars().take(200).collect::<String>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{fixtures, Position};

    #[test]
    fn test_prompt_carries_player_profile() {
        let mut player = fixtures::player("p1", "Ana", "Santos", Position::Ata, "2008-01-01");
        player.age = Some(17);
        player.ai_context = Some("Boa finalização de pé esquerdo".to_string());

        let prompt = build_prompt(&player);

        assert!(prompt.contains("Nome: Ana"));
        assert!(prompt.contains("Idade: 17"));
        assert!(prompt.contains("Posições: ATA"));
        assert!(prompt.contains("Observações do analista: Boa finalização"));
    }

    #[test]
    fn test_parse_report_joins_first_candidate_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Parte 1. "},{"text":"Parte 2."}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#;

        assert_eq!(parse_report(body).unwrap(), "Parte 1. Parte 2.");
    }

    #[test]
    fn test_parse_report_rejects_empty_and_malformed() {
        assert!(matches!(parse_report(r#"{"candidates":[]}"#), Err(ReportError::Failed(_))));
        assert!(matches!(parse_report("<html>"), Err(ReportError::Failed(_))));
    }

    #[test]
    fn test_classify_failure_separates_credentials() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, ""),
            ReportError::MissingCredentials(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, ""),
            ReportError::MissingCredentials(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, r#"{"error":{"status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#),
            ReportError::MissingCredentials(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ReportError::Failed(_)
        ));
    }

    #[test]
    fn test_remediation_differs_per_kind() {
        let missing = ReportError::MissingCredentials("x".to_string());
        let failed = ReportError::Failed("x".to_string());

        assert!(missing.remediation().contains("API key"));
        assert_ne!(missing.remediation(), failed.remediation());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = AiReportClient::new(ReportSettings::default()).unwrap();
        let player = fixtures::player("p1", "Ana", "Santos", Position::Ata, "2008-01-01");

        let result = client.generate_report(&player).await;

        assert!(!client.has_credentials());
        assert!(matches!(result, Err(ReportError::MissingCredentials(_))));
    }
}
