use std::io::Write;

use anyhow::{Context, Result};
use scout_agent::{
    all_message_texts, extract_confidence_from_texts, new_agent_texts, pr_instruction_prompt,
    scoping_prompt, scoping_session_title, AgentSessionApi, ConfidenceSignal, PollObserver,
    PrPollConfig, PrPollOutcome, PrPoller, ScopingOutcome, ScopingPollConfig, ScopingPoller,
};
use scout_core::PollClock;
use scout_github_issues::{IssueLookup, RepoRef};
use tracing::info;

use crate::operator_prompt::OperatorPrompt;
use crate::render::render_panel;

const NO_CONTENT: &str = "(no content)";
const SESSION_URL_UNAVAILABLE: &str = "(session url unavailable)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Per-invocation knobs of the scope workflow.
pub struct ScopeSettings {
    pub scoping: ScopingPollConfig,
    pub pr: PrPollConfig,
    pub agent_opens_prs: bool,
    pub open_url: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// How the pull-request phase ended.
pub enum PrStep {
    Declined,
    Disabled,
    Created(String),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Summary of one scope run, mirrored on the terminal as it happens.
pub struct ScopeReport {
    pub session_id: String,
    pub scoping_matched: bool,
    pub confidence: Option<ConfidenceSignal>,
    pub pr: PrStep,
}

/// Collaborators the scope workflow drives.
pub struct ScopeWorkflow<'a> {
    pub issues: &'a dyn IssueLookup,
    pub agent: &'a dyn AgentSessionApi,
    pub clock: &'a dyn PollClock,
    pub prompt: &'a mut dyn OperatorPrompt,
    pub progress: &'a mut dyn PollObserver,
    pub settings: ScopeSettings,
}

impl ScopeWorkflow<'_> {
    /// Fetch, scope, report confidence, then optionally ask the agent for a PR.
    pub fn run(&mut self, repo: &RepoRef, number: u64, out: &mut dyn Write) -> Result<ScopeReport> {
        let issue = self
            .issues
            .get_issue(repo, number)
            .with_context(|| format!("failed to fetch issue #{number} from {repo}"))?;
        writeln!(
            out,
            "{}",
            render_panel("Issue", &format!("Scoping issue #{number}\n{}", issue.title))
        )?;

        let slug = repo.as_slug();
        let repo_url = repo.html_url();
        let session = self
            .agent
            .create_session(
                &scoping_prompt(&repo_url, &issue.title, issue.body_text()),
                &scoping_session_title(&slug, number),
            )
            .context("failed to create agent session")?;
        writeln!(out, "New agent session: {} • {}", session.session_id, session.title)?;
        if self.settings.open_url {
            if let Some(url) = session.url.as_deref() {
                writeln!(out, "Session: {url}")?;
            }
        }

        let initial = self
            .agent
            .get_session(&session.session_id)
            .context("failed to read the new agent session")?;
        let baseline_len = initial.message_count();
        info!(session_id = %session.session_id, baseline_len, "captured message baseline");

        let scoping = ScopingPoller::new(self.agent, self.clock, self.settings.scoping)
            .poll(&session.session_id, baseline_len, initial)
            .context("failed while waiting for the scoping report")?;
        write_scoping(out, number, &scoping, baseline_len)?;

        let confidence = extract_confidence_from_texts(&scoping.texts).or_else(|| {
            extract_confidence_from_texts(&all_message_texts(&scoping.snapshot.messages))
        });
        writeln!(out, "\n{}", confidence_line(confidence.as_ref()))?;

        let mut report = ScopeReport {
            session_id: session.session_id.clone(),
            scoping_matched: scoping.matched(),
            confidence,
            pr: PrStep::Declined,
        };

        let question = format!("Create a PR for issue #{number}? [y/N]: ");
        if !self.prompt.confirm(&question)? {
            writeln!(out, "Skipped PR creation.")?;
            return Ok(report);
        }

        if !self.settings.agent_opens_prs {
            writeln!(
                out,
                "DEVIN_USE_GH_APP=false: not asking the agent to open a PR.\n\
                 Enable DEVIN_USE_GH_APP=true (or --agent-opens-prs) to let the agent open PRs \
                 through its GitHub integration, or open the PR yourself from the session."
            )?;
            report.pr = PrStep::Disabled;
            return Ok(report);
        }

        self.agent
            .send_message(&session.session_id, &pr_instruction_prompt(&repo_url, number))
            .context("failed to send the PR instruction")?;

        let outcome = PrPoller::new(self.agent, self.clock, self.settings.pr)
            .poll(&session.session_id, 0, &mut *self.progress)
            .context("failed while waiting for a pull request")?;
        match outcome {
            PrPollOutcome::Found { url, .. } => {
                writeln!(out, "{}", render_panel("PR created", &url))?;
                report.pr = PrStep::Created(url);
            }
            PrPollOutcome::TimedOut => {
                let session_url = session
                    .url
                    .as_deref()
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or(SESSION_URL_UNAVAILABLE);
                writeln!(
                    out,
                    "{}",
                    render_panel(
                        "PR pending",
                        &format!(
                            "No PR URL detected yet.\n\
                             You can monitor progress in the agent session:\n{session_url}"
                        ),
                    )
                )?;
                report.pr = PrStep::NotFound;
            }
        }
        Ok(report)
    }
}

fn write_scoping(
    out: &mut dyn Write,
    number: u64,
    scoping: &ScopingOutcome,
    baseline_len: usize,
) -> Result<()> {
    writeln!(out, "\n── Scoping result for #{number} ──")?;
    if !scoping.texts.is_empty() {
        writeln!(out, "{}", render_panel("Agent scoping", &scoping.texts.join("\n\n")))?;
        return Ok(());
    }

    writeln!(out, "No scoping message yet — showing latest agent messages.")?;
    let fresh = new_agent_texts(&scoping.snapshot.messages, baseline_len);
    let latest = if fresh.is_empty() {
        scoping
            .snapshot
            .messages
            .last()
            .map(|message| message.message.clone())
            .unwrap_or_default()
    } else {
        fresh[fresh.len().saturating_sub(2)..].join("\n\n")
    };
    let body = if latest.trim().is_empty() {
        NO_CONTENT.to_string()
    } else {
        latest
    };
    writeln!(out, "{}", render_panel("Latest messages", &body))?;
    Ok(())
}

/// Confidence summary line; the color reads `-` when no signal was found.
pub fn confidence_line(signal: Option<&ConfidenceSignal>) -> String {
    match signal {
        Some(ConfidenceSignal {
            level,
            rationale: Some(why),
        }) => format!("Confidence: {level} — {why}"),
        Some(ConfidenceSignal { level, .. }) => format!("Confidence: {level}"),
        None => "Confidence: -".to_string(),
    }
}
