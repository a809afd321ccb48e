//! Interactive line-oriented shell over the session and analysis controllers.

use crate::commands::{Command, HELP, parse_command};
use anyhow::Result;
use resume_screen::analysis::{
    AnalysisCoordinator, AnalysisResult, EligibilitySync, EligibleHistoryItem, ResumeFile,
    SelectedFile, select_pdfs,
};
use resume_screen::notify::{self, Notification};
use resume_screen::ports::{IdentityProvider, ScoringService};
use resume_screen::session::{SessionController, SessionSettings, SessionState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;

/// How the shell was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Through the sign-in screen. An existing session this process did not
    /// create is treated as a password-reset landing.
    SignIn,
    /// Straight to the dashboard, resuming any stored session.
    Dashboard,
}

/// Output of one command.
#[derive(Debug, Default)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

pub struct Shell {
    session: SessionController,
    analysis: AnalysisCoordinator,
    eligibility: Arc<EligibilitySync>,
    notices: UnboundedReceiver<Notification>,
    job_description: String,
    files: Vec<ResumeFile>,
}

impl Shell {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        scoring: Arc<dyn ScoringService>,
        settings: SessionSettings,
    ) -> Self {
        let (notifier, notices) = notify::channel();
        let eligibility = Arc::new(EligibilitySync::new(scoring.clone()));
        let session =
            SessionController::new(identity, eligibility.clone(), notifier.clone(), settings);
        let analysis = AnalysisCoordinator::new(scoring, eligibility.clone(), notifier);

        Self {
            session,
            analysis,
            eligibility,
            notices,
            job_description: String::new(),
            files: Vec::new(),
        }
    }

    /// Resolve the initial session state.
    pub async fn start(&mut self, entry: Entry) -> SessionState {
        match entry {
            Entry::SignIn => self.session.probe().await,
            Entry::Dashboard => self.session.restore().await,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Parse and run one input line.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        match parse_command(line) {
            Ok(command) => self.execute(command).await,
            Err(err) => Reply::default().line(err.to_string()),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        let reply = match command {
            Command::Login { email, password } => {
                let outcome = self.session.login(&email, &password).await;
                self.report(outcome, Reply::default())
            }
            Command::SignUp {
                email,
                password,
                confirm,
            } => {
                let outcome = self.session.sign_up(&email, &password, &confirm).await;
                self.report(outcome, Reply::default())
            }
            Command::Forgot { email } => {
                let outcome = self.session.request_password_reset(&email).await;
                self.report(outcome, Reply::default())
            }
            Command::NewPassword { password, confirm } => {
                let outcome = self.session.update_password(&password, &confirm).await;
                self.report(outcome, Reply::default())
            }
            Command::Logout => {
                let outcome = self.session.sign_out().await;
                if outcome.is_ok() {
                    self.analysis.clear().await;
                    self.job_description.clear();
                    self.files.clear();
                }
                self.report(outcome, Reply::default())
            }
            Command::JobDescription(text) => {
                self.job_description = text;
                Reply::default().line("Job description set.")
            }
            Command::Select(paths) => self.select(&paths).await,
            Command::Files => self.list_files(),
            Command::Analyze => self.analyze().await,
            Command::Results => {
                let results = self.analysis.results().await;
                render_results(&results, Reply::default())
            }
            Command::History => {
                let history = self.eligibility.history().await;
                render_history(&history, Reply::default())
            }
            Command::Refresh => match self.signed_in_email() {
                Some(email) => {
                    let history = self.eligibility.refresh(&email).await;
                    render_history(&history, Reply::default())
                }
                None => Reply::default().line("Sign in first."),
            },
            Command::Status => self.status(),
            Command::Help => Reply::default().line(HELP),
            Command::Quit => {
                self.session.teardown();
                Reply {
                    quit: true,
                    ..Reply::default()
                }
            }
        };

        self.with_notices(reply)
    }

    /// Drive the shell until `quit` or end of input.
    pub async fn run<R, W>(mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let banner = self.with_notices(Reply::default().line(format!("Session: {}", self.state())));
        write_lines(&mut output, &banner.lines).await?;

        loop {
            output
                .write_all(format!("{}> ", self.state().label()).as_bytes())
                .await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                self.session.teardown();
                break;
            };

            let reply = self.handle_line(&line).await;
            write_lines(&mut output, &reply.lines).await?;
            if reply.quit {
                break;
            }
        }

        Ok(())
    }

    fn signed_in_email(&self) -> Option<String> {
        match self.session.state() {
            SessionState::Authenticated { email } => Some(email),
            _ => None,
        }
    }

    async fn select(&mut self, paths: &[PathBuf]) -> Reply {
        let mut reply = Reply::default();
        let mut selection = Vec::with_capacity(paths.len());

        for path in paths {
            match read_selected(path).await {
                Ok(file) => selection.push(file),
                Err(e) => reply = reply.line(format!("Cannot read {}: {e}", path.display())),
            }
        }

        let offered = selection.len();
        self.files = select_pdfs(selection);
        let skipped = offered - self.files.len();
        if skipped > 0 {
            reply = reply.line(format!("Skipped {skipped} non-PDF file(s)."));
        }
        reply.line(format!("{} file(s) selected.", self.files.len()))
    }

    fn list_files(&self) -> Reply {
        if self.files.is_empty() {
            return Reply::default().line("No files selected.");
        }
        self.files
            .iter()
            .fold(Reply::default(), |reply, file| {
                reply.line(format!("  {} ({} bytes)", file.name(), file.bytes().len()))
            })
    }

    async fn analyze(&mut self) -> Reply {
        let Some(email) = self.signed_in_email() else {
            return Reply::default().line("Sign in first.");
        };

        match self
            .analysis
            .submit(&self.job_description, &self.files, &email)
            .await
        {
            Ok(results) => render_results(&results, Reply::default()),
            Err(e) => {
                tracing::debug!(error = %e, "analysis not completed");
                Reply::default()
            }
        }
    }

    fn status(&self) -> Reply {
        let mut reply = Reply::default().line(format!("Session: {}", self.session.state()));
        let cooldown = self.session.cooldown_remaining();
        if cooldown > 0 {
            reply = reply.line(format!("Password reset available in {cooldown}s"));
        }
        let jd = if self.job_description.trim().is_empty() {
            "(none)".to_string()
        } else {
            format!("{} chars", self.job_description.chars().count())
        };
        reply
            .line(format!("Job description: {jd}"))
            .line(format!("Files selected: {}", self.files.len()))
    }

    /// Errors from the controllers are already surfaced as notices.
    fn report<T>(&self, outcome: resume_screen::ClientResult<T>, reply: Reply) -> Reply {
        if let Err(e) = outcome {
            tracing::debug!(error = %e, "command rejected");
        }
        reply
    }

    fn with_notices(&mut self, mut reply: Reply) -> Reply {
        let mut notices = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            notices.push(notice.to_string());
        }
        // Notices describe what just happened, so they lead.
        notices.append(&mut reply.lines);
        reply.lines = notices;
        reply
    }
}

/// Read a file and guess its media type from the extension.
async fn read_selected(path: &Path) -> std::io::Result<SelectedFile> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = mime_guess::from_path(path).first_or_octet_stream();

    Ok(SelectedFile::new(name, media_type.essence_str(), bytes))
}

fn render_results(results: &[AnalysisResult], reply: Reply) -> Reply {
    if results.is_empty() {
        return reply.line("No results.");
    }
    results.iter().fold(reply, |reply, result| {
        let mut line = format!(
            "  {:<28} {:<13} {:>6.2}%",
            result.resume_name,
            result.status.to_string(),
            result.match_score
        );
        if !result.matched_skills.is_empty() {
            let skills: Vec<&str> = result.matched_skills.iter().map(String::as_str).collect();
            line.push_str(&format!("  skills: {}", skills.join(", ")));
        }
        if let Some(url) = &result.file_url {
            line.push_str(&format!("  {url}"));
        }
        reply.line(line)
    })
}

fn render_history(history: &[EligibleHistoryItem], reply: Reply) -> Reply {
    if history.is_empty() {
        return reply.line("No eligible resumes yet.");
    }
    history.iter().fold(reply, |reply, item| {
        let mut line = format!(
            "  #{:<6} {:<28} {:>6.2}%",
            item.id.to_string(),
            item.resume_name,
            item.match_score
        );
        if let Some(url) = &item.file_url {
            line.push_str(&format!("  {url}"));
        }
        reply.line(line)
    })
}

async fn write_lines<W: AsyncWrite + Unpin>(output: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
    }
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use resume_screen::analysis::AnalysisRequest;
    use resume_screen::ports::{ProviderResult, ScoringResult, Session};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Identity {
        session: Mutex<Option<Session>>,
    }

    #[async_trait]
    impl IdentityProvider for Identity {
        async fn sign_up(&self, _email: &str, _password: &str) -> ProviderResult<()> {
            Ok(())
        }

        async fn sign_in_with_password(&self, email: &str, _password: &str) -> ProviderResult<Session> {
            let session = Session::new(email);
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(session)
        }

        async fn get_session(&self) -> ProviderResult<Option<Session>> {
            Ok(self.session.lock().unwrap().clone())
        }

        async fn reset_password_for_email(&self, _email: &str, _redirect: &str) -> ProviderResult<()> {
            Ok(())
        }

        async fn update_password(&self, _password: &str) -> ProviderResult<()> {
            Ok(())
        }

        async fn sign_out(&self) -> ProviderResult<()> {
            *self.session.lock().unwrap() = None;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Scoring {
        submitted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScoringService for Scoring {
        async fn analyze(&self, request: &AnalysisRequest) -> ScoringResult<Value> {
            let names: Vec<String> = request.files.iter().map(|f| f.name().to_string()).collect();
            self.submitted.lock().unwrap().extend(names.clone());
            let results: Vec<Value> = names
                .iter()
                .map(|name| {
                    json!({
                        "resume_name": name,
                        "status": "ELIGIBLE",
                        "matched_skills": ["Rust"],
                        "match_score": 75.5,
                    })
                })
                .collect();
            Ok(json!({ "results": results }))
        }

        async fn eligible(&self, _email: &str) -> ScoringResult<Value> {
            Ok(json!({"eligible_resumes": [{"id": 3, "resume_name": "alice.pdf", "match_score": 75.5}]}))
        }
    }

    fn shell() -> (Shell, Arc<Scoring>) {
        let scoring = Arc::new(Scoring::default());
        let shell = Shell::new(
            Arc::new(Identity::default()),
            scoring.clone(),
            SessionSettings::default(),
        );
        (shell, scoring)
    }

    fn write_pdf(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();
        path
    }

    #[tokio::test]
    async fn test_analyze_requires_sign_in() {
        let (mut shell, scoring) = shell();
        shell.start(Entry::SignIn).await;

        let reply = shell.handle_line("analyze").await;

        assert_eq!(reply.lines, vec!["Sign in first."]);
        assert!(scoring.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_select_keeps_only_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(dir.path(), "alice.pdf");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, b"hello").unwrap();
        let (mut shell, _) = shell();

        let reply = shell
            .execute(Command::Select(vec![pdf, txt, dir.path().join("missing.pdf")]))
            .await;

        assert!(reply.lines.iter().any(|l| l.starts_with("Cannot read")));
        assert!(reply.lines.contains(&"Skipped 1 non-PDF file(s).".to_string()));
        assert_eq!(reply.lines.last().unwrap(), "1 file(s) selected.");
    }

    #[tokio::test]
    async fn test_full_screening_round() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(dir.path(), "alice.pdf");
        let (mut shell, scoring) = shell();
        shell.start(Entry::SignIn).await;

        shell.handle_line("login hr@example.com hunter22").await;
        shell.handle_line("jd Rust engineer").await;
        shell.execute(Command::Select(vec![pdf])).await;
        let reply = shell.handle_line("analyze").await;

        assert_eq!(*scoring.submitted.lock().unwrap(), vec!["alice.pdf"]);
        assert!(reply.lines.iter().any(|l| l.contains("alice.pdf") && l.contains("75.50%")));
        assert!(reply.lines.iter().any(|l| l.contains("skills: Rust")));

        let history = shell.handle_line("history").await;
        assert!(history.lines.iter().any(|l| l.contains("#3")));
    }

    #[tokio::test]
    async fn test_logout_clears_screening_state() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(dir.path(), "alice.pdf");
        let (mut shell, _) = shell();
        shell.handle_line("login hr@example.com hunter22").await;
        shell.handle_line("jd Rust engineer").await;
        shell.execute(Command::Select(vec![pdf])).await;
        shell.handle_line("analyze").await;

        shell.handle_line("logout").await;

        assert_eq!(shell.state(), SessionState::Anonymous);
        assert_eq!(shell.handle_line("results").await.lines, vec!["No results."]);
        assert_eq!(shell.handle_line("files").await.lines, vec!["No files selected."]);
    }

    #[tokio::test]
    async fn test_rejections_are_reported_as_notices() {
        let (mut shell, _) = shell();

        let reply = shell.handle_line("signup hr@example.com a b").await;

        assert_eq!(reply.lines.len(), 1);
        assert!(reply.lines[0].contains("error"));
        assert!(reply.lines[0].contains("Passwords must match"));
    }

    #[tokio::test]
    async fn test_run_stops_at_quit() {
        let (shell, _) = shell();
        let input = tokio::io::BufReader::new(&b"status\nquit\nstatus\n"[..]);
        let mut output = Vec::new();

        shell.run(input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Session: ").count(), 2);
    }
}
