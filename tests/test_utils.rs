#![allow(dead_code)]

use anyhow::{Result, anyhow};
use aria_changelog::changelog::{ChangelogReviser, ChangelogSynthesizer};
use aria_changelog::error::ChangelogError;
use aria_changelog::github::{PullRequestSource, RepositoryRef};
use aria_changelog::llm_providers::{ChatTurn, GenerationRequest, LLMProvider};
use aria_changelog::services::GenerationService;
use aria_changelog::types::PullRequest;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const REPO_URL: &str = "https://github.com/acme/widgets.git";
pub const REPO_ID: &str = "acme/widgets";
pub const TOKEN: &str = "tok123";

pub const SYNTHESIZED_JSON: &str = r#"{"features":["You can now export reports as CSV."],"fixes":["Fixed a crash when saving empty files."],"improvements":[]}"#;

/// Scripted LLM: replies are popped in order, every call is counted and recorded
#[derive(Default)]
pub struct MockLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    chats: Mutex<Vec<(String, Vec<ChatTurn>)>>,
    delay: Option<Duration>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(replies: &[&str]) -> Self {
        let mock = Self::new();
        for reply in replies {
            mock.push_reply(reply);
        }
        mock
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, message: &str) {
        self.replies.lock().push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn chats(&self) -> Vec<(String, Vec<ChatTurn>)> {
        self.chats.lock().clone()
    }

    async fn next_reply(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.replies.lock().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}

#[async_trait]
impl LLMProvider for MockLlm {
    async fn generate_content(&self, request: &GenerationRequest) -> Result<String> {
        self.prompts.lock().push(request.prompt.clone());
        self.next_reply().await
    }

    async fn chat(&self, system_instruction: &str, turns: &[ChatTurn]) -> Result<String> {
        self.chats
            .lock()
            .push((system_instruction.to_string(), turns.to_vec()));
        self.next_reply().await
    }
}

/// Scripted PR source: each fetch pops the next batch; an exhausted script yields nothing
#[derive(Default)]
pub struct ScriptedSource {
    batches: Mutex<VecDeque<Result<Vec<PullRequest>, ChangelogError>>>,
    requests: Mutex<Vec<(String, String, Option<DateTime<Utc>>)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, prs: Vec<PullRequest>) {
        self.batches.lock().push_back(Ok(prs));
    }

    pub fn push_error(&self, error: ChangelogError) {
        self.batches.lock().push_back(Err(error));
    }

    /// (repository, token, since) for each fetch, in order
    pub fn requests(&self) -> Vec<(String, String, Option<DateTime<Utc>>)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PullRequestSource for ScriptedSource {
    async fn fetch_merged_prs(
        &self,
        repo: &RepositoryRef,
        token: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PullRequest>, ChangelogError> {
        self.requests
            .lock()
            .push((repo.full_name(), token.to_string(), since));
        self.batches.lock().pop_front().unwrap_or(Ok(Vec::new()))
    }
}

pub fn merged_pr(id: u64, title: &str, body: Option<&str>) -> PullRequest {
    PullRequest {
        id,
        title: title.to_string(),
        body: body.map(str::to_string),
        url: format!("https://github.com/acme/widgets/pull/{id}"),
        author: "octocat".to_string(),
        merged_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single(),
    }
}

pub fn two_prs() -> Vec<PullRequest> {
    vec![
        merged_pr(2, "Fix save crash", Some("Guard against empty buffers")),
        merged_pr(1, "Add CSV export", None),
    ]
}

pub fn synthesizer(llm: &Arc<MockLlm>) -> ChangelogSynthesizer {
    ChangelogSynthesizer::new(
        Arc::clone(llm) as Arc<dyn LLMProvider>,
        0.2,
        Duration::from_secs(5),
    )
}

pub fn reviser(llm: &Arc<MockLlm>) -> ChangelogReviser {
    ChangelogReviser::new(Arc::clone(llm) as Arc<dyn LLMProvider>, Duration::from_secs(5))
}

pub fn generation_service(source: &Arc<ScriptedSource>, llm: &Arc<MockLlm>) -> GenerationService {
    GenerationService::new(
        Arc::clone(source) as Arc<dyn PullRequestSource>,
        synthesizer(llm),
    )
}
