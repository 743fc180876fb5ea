//! LeetCode judge client implementation
//!
//! Speaks the judge's GraphQL endpoint over one authenticated reqwest
//! channel and pulls each problem's stored solution from the companion
//! solutions site before submitting. No internal retries: every call is a
//! single round trip whose result the engine interprets.

use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, ORIGIN, USER_AGENT};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{JudgeClient, JudgeError};
use crate::domain::{AttemptOutcome, ProblemId};

const GRAPHQL_URL: &str = "https://leetcode.com/graphql/";
const DEFAULT_SOLUTIONS_BASE: &str = "https://walkccc.me/LeetCode/problems";
const DEFAULT_LANG: &str = "cpp";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SOLVED_QUERY: &str = r#"
query solvedQuestions($filters: QuestionListFilterInput) {
  problemsetQuestionList: questionList(categorySlug: "", limit: -1, skip: 0, filters: $filters) {
    questions: data {
      frontendQuestionId: questionFrontendId
      status
    }
  }
}"#;

const QUESTION_QUERY: &str = r#"
query questionByFrontendId($frontendId: String!) {
  question(frontendId: $frontendId) {
    questionId
    titleSlug
  }
}"#;

const SUBMIT_MUTATION: &str = r#"
mutation submitSolution($questionId: String!, $lang: String!, $typedCode: String!) {
  submitSolution(questionId: $questionId, lang: $lang, typedCode: $typedCode) {
    statusMsg
  }
}"#;

/// What a 2xx GraphQL response turned out to be
#[derive(Debug)]
enum GraphqlReply {
    /// Structured payload, ready for field extraction
    Json(serde_json::Value),
    /// Anti-bot challenge served with HTTP 200 instead of the payload
    Blocked,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRef {
    question_id: String,
    title_slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolvedQuestion {
    frontend_question_id: String,
    #[serde(default)]
    status: Option<String>,
}

/// Authenticated client for the LeetCode GraphQL API
pub struct LeetCodeClient {
    http: Client,
    solutions_base: String,
    lang: String,
}

impl LeetCodeClient {
    /// Create a client from session and CSRF credentials
    ///
    /// The credentials become request headers on every call; they cannot
    /// be changed after construction.
    pub fn new(session: &str, csrf: &str) -> Result<Self, JudgeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://leetcode.com"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            "x-csrftoken",
            HeaderValue::from_str(csrf).map_err(|e| JudgeError::Credentials(e.to_string()))?,
        );
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("LEETCODE_SESSION={session}; csrftoken={csrf};"))
                .map_err(|e| JudgeError::Credentials(e.to_string()))?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            solutions_base: DEFAULT_SOLUTIONS_BASE.to_string(),
            lang: DEFAULT_LANG.to_string(),
        })
    }

    /// Override the companion solutions site base URL
    pub fn with_solutions_base(mut self, base: impl Into<String>) -> Self {
        self.solutions_base = base.into();
        self
    }

    /// Override the submission language
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Execute one GraphQL round trip
    async fn post_graphql(&self, operation: &str, query: &str, variables: serde_json::Value) -> Result<GraphqlReply, JudgeError> {
        debug!(operation, "post_graphql: sending");
        let payload = json!({
            "operationName": operation,
            "query": query,
            "variables": variables,
        });

        let response = self.http.post(GRAPHQL_URL).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(operation, status = status.as_u16(), "post_graphql: non-success status");
            return Err(JudgeError::Status { status: status.as_u16() });
        }

        parse_graphql_body(&body)
    }

    /// Resolve a frontend problem id to the judge's internal id and slug
    async fn resolve_problem(&self, problem: ProblemId) -> Result<Option<QuestionRef>, JudgeError> {
        let reply = self
            .post_graphql(
                "questionByFrontendId",
                QUESTION_QUERY,
                json!({"frontendId": problem.to_string()}),
            )
            .await?;

        let value = match reply {
            GraphqlReply::Blocked => return Ok(None),
            GraphqlReply::Json(value) => value,
        };

        let question = value
            .pointer("/data/question")
            .cloned()
            .ok_or_else(|| JudgeError::Decode("question payload missing".to_string()))?;
        let question: QuestionRef =
            serde_json::from_value(question).map_err(|e| JudgeError::Decode(e.to_string()))?;
        debug!(problem, slug = %question.title_slug, "resolve_problem: resolved");
        Ok(Some(question))
    }

    /// Fetch the stored solution for a problem from the companion site
    ///
    /// `None` means an anti-bot challenge intercepted the request; the
    /// problem was never judged and must stay eligible.
    async fn fetch_solution(&self, slug: &str) -> Result<Option<String>, JudgeError> {
        let url = format!("{}/{}", self.solutions_base, slug);
        debug!(%url, "fetch_solution: fetching");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JudgeError::Status { status: status.as_u16() });
        }
        let body = response.text().await?;

        let markdown = html2md::rewrite_html(&body, false);
        match extract_code_block(&markdown) {
            Some(code) => Ok(Some(code)),
            None if looks_blocked(&body) => Ok(None),
            None => Err(JudgeError::Decode(format!("no solution code block found for {slug}"))),
        }
    }
}

#[async_trait]
impl JudgeClient for LeetCodeClient {
    async fn submit(&self, problem: ProblemId) -> Result<AttemptOutcome, JudgeError> {
        debug!(problem, "submit: called");

        let Some(question) = self.resolve_problem(problem).await? else {
            return Ok(AttemptOutcome::RateLimited);
        };
        let Some(code) = self.fetch_solution(&question.title_slug).await? else {
            return Ok(AttemptOutcome::RateLimited);
        };

        let reply = self
            .post_graphql(
                "submitSolution",
                SUBMIT_MUTATION,
                json!({
                    "questionId": question.question_id,
                    "lang": self.lang,
                    "typedCode": code,
                }),
            )
            .await?;

        match reply {
            GraphqlReply::Blocked => Ok(AttemptOutcome::RateLimited),
            GraphqlReply::Json(value) => parse_verdict(&value),
        }
    }

    async fn fetch_solved(&self) -> Result<HashSet<ProblemId>, JudgeError> {
        debug!("fetch_solved: called");
        let reply = self
            .post_graphql("solvedQuestions", SOLVED_QUERY, json!({"filters": {"status": "AC"}}))
            .await?;

        match reply {
            GraphqlReply::Blocked => Err(JudgeError::Decode(
                "anti-bot challenge while fetching solved set".to_string(),
            )),
            GraphqlReply::Json(value) => parse_solved_set(&value),
        }
    }
}

/// Classify a 2xx response body
///
/// Anti-automation layers return HTTP 200 with an HTML challenge page
/// instead of the expected payload, so a body that fails to parse is
/// checked against known signatures before being reported as a decode
/// failure.
fn parse_graphql_body(body: &str) -> Result<GraphqlReply, JudgeError> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => Ok(GraphqlReply::Json(value)),
        Err(_) if looks_blocked(body) => {
            warn!("response matches an anti-bot signature");
            Ok(GraphqlReply::Blocked)
        }
        Err(e) => Err(JudgeError::Decode(e.to_string())),
    }
}

/// Known anti-bot challenge signatures
fn looks_blocked(body: &str) -> bool {
    static SIGNATURES: OnceLock<Regex> = OnceLock::new();
    let re = SIGNATURES.get_or_init(|| {
        Regex::new(r"(?i)cloudflare|captcha|just a moment|attention required|access denied").expect("static regex")
    });
    re.is_match(body)
}

/// Extract the verdict from a submit mutation response
fn parse_verdict(value: &serde_json::Value) -> Result<AttemptOutcome, JudgeError> {
    let verdict = value
        .pointer("/data/submitSolution/statusMsg")
        .and_then(|v| v.as_str())
        .ok_or_else(|| JudgeError::Decode("statusMsg missing from submit response".to_string()))?;
    Ok(AttemptOutcome::from_verdict(verdict))
}

/// Extract the solved problem ids from a problemset query response
fn parse_solved_set(value: &serde_json::Value) -> Result<HashSet<ProblemId>, JudgeError> {
    let questions = value
        .pointer("/data/problemsetQuestionList/questions")
        .cloned()
        .ok_or_else(|| JudgeError::Decode("question list missing from solved response".to_string()))?;
    let questions: Vec<SolvedQuestion> =
        serde_json::from_value(questions).map_err(|e| JudgeError::Decode(e.to_string()))?;

    let mut solved = HashSet::new();
    for question in questions {
        if !matches!(question.status.as_deref(), Some(s) if s.eq_ignore_ascii_case("ac")) {
            continue;
        }
        match question.frontend_question_id.parse::<ProblemId>() {
            Ok(id) => {
                solved.insert(id);
            }
            Err(_) => warn!(id = %question.frontend_question_id, "skipping non-numeric problem id"),
        }
    }
    Ok(solved)
}

/// First fenced code block of a markdown document
fn extract_code_block(markdown: &str) -> Option<String> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let re = FENCE.get_or_init(|| Regex::new(r"(?s)```[A-Za-z0-9+#]*\n(.*?)```").expect("static regex"));
    let code = re.captures(markdown)?.get(1)?.as_str().trim();
    if code.is_empty() { None } else { Some(code.to_string()) }
}
