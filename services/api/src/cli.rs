use crate::demo::{
    run_check, run_demo, run_import_questions, run_score, CheckArgs, DemoArgs,
    ImportQuestionsArgs, ScoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use typequiz::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "typequiz",
    about = "Serve, score and inspect personality-style quizzes from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with quiz definition files offline
    Quiz {
        #[command(subcommand)]
        command: QuizCommand,
    },
    /// Walk a sample quiz through publish, scoring and event counting
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum QuizCommand {
    /// Score an answer file against a definition file
    Score(ScoreArgs),
    /// Report the issues that would block publishing a definition
    Check(CheckArgs),
    /// Convert a question CSV export into definition JSON
    ImportQuestions(ImportQuestionsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Publish the sample quiz at startup
    #[arg(long)]
    pub(crate) seed_demo: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quiz { command } => match command {
            QuizCommand::Score(args) => run_score(args),
            QuizCommand::Check(args) => run_check(args),
            QuizCommand::ImportQuestions(args) => run_import_questions(args),
        },
        Command::Demo(args) => run_demo(args),
    }
}
