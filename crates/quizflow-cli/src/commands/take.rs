//! The `quizflow take` command.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use quizflow_client::{create_backend, load_config_from, ClientConfig};
use quizflow_core::model::RemoteId;
use quizflow_core::quiz_file::{load_quiz_file, validate_questions};
use quizflow_core::session::{QuizSession, SessionSeed, SessionState, Transition};
use quizflow_core::traits::{GenerateRequest, Level, QuizBackend, ResumeRequest};

const HELP: &str =
    "Enter an option number to toggle it, n for next, p for previous, q to quit.";

#[derive(Args, Debug)]
pub struct TakeArgs {
    /// Play a local quiz JSON file (no autosave)
    #[arg(long, conflicts_with_all = ["domain", "resume_id", "resume"])]
    pub file: Option<PathBuf>,

    /// Quiz topic
    #[arg(long)]
    pub domain: Option<String>,

    /// Quiz sub-topic
    #[arg(long)]
    pub sub_domain: Option<String>,

    /// Difficulty: easy, medium, hard
    #[arg(long)]
    pub level: Option<Level>,

    /// Number of questions to generate (1-20)
    #[arg(long)]
    pub count: Option<u32>,

    /// Resume the saved quiz for --domain/--sub-domain instead of generating
    #[arg(long)]
    pub resume: bool,

    /// Resume a saved quiz by id
    #[arg(long, conflicts_with = "resume")]
    pub resume_id: Option<String>,

    /// Save the results JSON to this path
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: TakeArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let (seed, backend) = prepare(&args, &config).await?;

    let mut session = QuizSession::start(seed, backend, &config.session_config());
    if let SessionState::Unavailable(reason) = session.state() {
        anyhow::bail!("quiz unavailable: {reason}");
    }
    debug!(
        quiz_id = ?session.quiz_id(),
        remote = session.is_remote(),
        questions = session.len(),
        "session ready"
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    match drive(&mut session, stdin, &mut stdout).await? {
        Outcome::Finished => {
            let results = session.complete().await?;
            super::review::write_text(&results, &mut stdout)?;
            if let Some(path) = &args.save {
                results.save_json(path)?;
                eprintln!("Results saved to: {}", path.display());
            }
        }
        Outcome::Quit => {
            let resume_id = session
                .is_remote()
                .then(|| session.quiz_id().cloned())
                .flatten();
            session.abandon();
            writeln!(stdout, "Quiz left unfinished.")?;
            if let Some(id) = resume_id {
                writeln!(stdout, "Resume later with: quizflow take --resume-id {id}")?;
            }
        }
    }

    Ok(())
}

/// Build the session seed and, for remote quizzes, the backend.
async fn prepare(
    args: &TakeArgs,
    config: &ClientConfig,
) -> Result<(SessionSeed, Option<Arc<dyn QuizBackend>>)> {
    if let Some(file) = &args.file {
        let quiz = load_quiz_file(file)?;
        for warning in validate_questions(&quiz.questions) {
            eprintln!("WARNING: {warning}");
        }
        if let Some(title) = &quiz.title {
            println!("{title}");
        }
        return Ok((quiz.into(), None));
    }

    let backend: Arc<dyn QuizBackend> = Arc::new(create_backend(config)?);

    let seed: SessionSeed = if let Some(id) = &args.resume_id {
        let request = ResumeRequest::ByQuiz {
            quiz_id: RemoteId::new(id.as_str()),
        };
        backend.resume(&request).await?.into()
    } else {
        let domain = args
            .domain
            .clone()
            .context("--domain is required unless --file or --resume-id is given")?;
        let sub_domain = args
            .sub_domain
            .clone()
            .context("--sub-domain is required unless --file or --resume-id is given")?;

        if args.resume {
            backend
                .resume(&ResumeRequest::ByTopic { domain, sub_domain })
                .await?
                .into()
        } else {
            let request = GenerateRequest {
                domain,
                sub_domain,
                number_of_questions: args.count.unwrap_or(config.default_questions),
                level: args.level.unwrap_or(config.default_level),
            };
            request.validate()?;
            eprintln!(
                "Generating {} {} questions on {} / {}...",
                request.number_of_questions, request.level, request.domain, request.sub_domain
            );
            backend.generate(&request).await?.into()
        }
    };

    Ok((seed, Some(backend)))
}

/// How the interactive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The last question was confirmed.
    Finished,
    /// The user quit or input ended.
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Toggle(usize),
    Next,
    Previous,
    Quit,
    Help,
    Invalid,
}

fn parse_input(line: &str) -> Input {
    match line.trim().to_lowercase().as_str() {
        "" | "n" | "next" => Input::Next,
        "p" | "prev" | "previous" => Input::Previous,
        "q" | "quit" | "exit" => Input::Quit,
        "?" | "h" | "help" => Input::Help,
        other => match other.parse::<usize>() {
            Ok(n) if n >= 1 => Input::Toggle(n - 1),
            _ => Input::Invalid,
        },
    }
}

/// Run the interactive loop until the quiz is finished or the user quits.
pub(crate) async fn drive<R, W>(session: &mut QuizSession, input: R, out: &mut W) -> Result<Outcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    writeln!(out, "{HELP}")?;
    render_question(session, out)?;

    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Toggle(position) => {
                let selected = session.select_option(position).map(|_| ());
                match selected {
                    Ok(()) => render_question(session, out)?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            Input::Next => match session.next() {
                Transition::Moved(_) => render_question(session, out)?,
                Transition::Blocked => writeln!(out, "Select an answer before continuing.")?,
                Transition::Finishing => return Ok(Outcome::Finished),
                Transition::Stayed => {}
            },
            Input::Previous => match session.previous() {
                Transition::Moved(_) => render_question(session, out)?,
                _ => writeln!(out, "Already at the first question.")?,
            },
            Input::Quit => return Ok(Outcome::Quit),
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Invalid => writeln!(out, "Unrecognized input. {HELP}")?,
        }
    }

    Ok(Outcome::Quit)
}

fn render_question<W: Write>(session: &QuizSession, out: &mut W) -> Result<()> {
    let (Some(index), Some(question)) = (session.current_index(), session.current_question())
    else {
        return Ok(());
    };
    let selection = session.answers().get(index);

    writeln!(out)?;
    writeln!(out, "Question {} of {}", index + 1, session.len())?;
    writeln!(out, "{}", question.prompt())?;
    let hint = if question.is_multi_select() {
        "select all that apply"
    } else {
        "select one"
    };
    writeln!(out, "({hint})")?;
    for (i, option) in question.options().iter().enumerate() {
        let mark = if selection.contains(option) { "x" } else { " " };
        writeln!(out, "  {}) [{mark}] {option}", i + 1)?;
    }
    Ok(())
}
