use crate::infra::{read_json_file, InMemoryQuizRepository, InMemoryQuizService, InMemoryStatsStore};
use clap::Args;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use typequiz::error::AppError;
use typequiz::events::{EventKind, StatsRepository};
use typequiz::quiz::{
    validate_definition, BasicSettings, CreatorId, DraftQuestion, DraftResult, Quiz,
    QuizDefinition, QuizDraft, QuizRepository, QuizService, QuizServiceError, QuizStatus,
    QuestionCsvImporter,
};
use typequiz::scoring::{
    AnswerValue, Answers, Axis, AxisKey, ConditionOperator, Polarity, QuestionId,
    Recommendation, RecommendationCondition,
};

pub(crate) const DEMO_CREATOR: &str = "demo-creator";
pub(crate) const DEMO_SLUG: &str = "weekend-style";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// JSON object of question id to answer (-2..=2). Defaults to a built-in sample.
    #[arg(long)]
    pub(crate) answers: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Quiz definition JSON (axes, questions, resultTypes, recommendations)
    #[arg(long)]
    pub(crate) definition: PathBuf,
    /// JSON object of question id to answer (-2..=2)
    #[arg(long)]
    pub(crate) answers: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Quiz definition JSON to validate
    #[arg(long)]
    pub(crate) definition: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ImportQuestionsArgs {
    /// CSV with columns id,axis_key,a_side,weight,text,option_a,option_b
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let definition: QuizDefinition = read_json_file(&args.definition)?;
    let answers: Answers = read_json_file(&args.answers)?;

    let outcome = definition.evaluate(&answers);
    println!("Result code: {}", outcome.code);
    match definition.catalog().lookup(&outcome.code) {
        Some(result) => println!("Result type: {}", result.name),
        None => println!("Result type: none defined for this code"),
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let definition: QuizDefinition = read_json_file(&args.definition)?;
    let issues = validate_definition(&definition);
    if issues.is_empty() {
        println!(
            "Definition is publishable: {} axes, {} questions, {} result types",
            definition.axes.len(),
            definition.questions.len(),
            definition.result_types.len()
        );
        return Ok(());
    }

    println!("Definition has {} issue(s):", issues.len());
    for issue in &issues {
        println!("  - {issue}");
    }
    Err(QuizServiceError::Incomplete(issues).into())
}

pub(crate) fn run_import_questions(args: ImportQuestionsArgs) -> Result<(), AppError> {
    let questions = QuestionCsvImporter::from_path(&args.csv)?;
    println!("{}", serde_json::to_string_pretty(&questions)?);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let answers = match args.answers {
        Some(path) => read_json_file(&path)?,
        None => demo_answers(),
    };

    let stats = Arc::new(InMemoryStatsStore::default());
    let service: InMemoryQuizService =
        QuizService::new(Arc::new(InMemoryQuizRepository::default()), stats.clone());

    println!("Quiz delivery demo");
    let quiz = seed_demo_quiz(&service)?;
    println!(
        "- Published '{}' at /api/q/{} ({} questions, {} result types)",
        quiz.title,
        quiz.slug,
        quiz.definition.questions.len(),
        quiz.definition.result_types.len()
    );

    service.record_event(&quiz.id, EventKind::View)?;
    service.record_event(&quiz.id, EventKind::Start)?;

    let result = match service.score_attempt(&quiz.slug, &answers) {
        Ok(result) => result,
        Err(err) => {
            println!("  Attempt rejected: {}", err);
            return Err(err.into());
        }
    };
    service.record_event(&quiz.id, EventKind::Complete)?;

    println!("\nResult {} -> {}", result.code, result.result.name);
    if !result.result.description.is_empty() {
        println!("  {}", result.result.description);
    }
    println!("Axis breakdown:");
    for axis in &result.axes {
        println!(
            "  - {}: {} <-> {} | {:+} ({:+.3})",
            axis.key, axis.left_label, axis.right_label, axis.percent, axis.normalized
        );
    }
    if result.recommendations.is_empty() {
        println!("Recommendations: none matched");
    } else {
        println!("Recommendations:");
        for recommendation in &result.recommendations {
            println!(
                "  - [{:?}] {}",
                recommendation.priority, recommendation.title
            );
        }
    }

    match stats.daily(&quiz.id) {
        Ok(rows) => {
            for row in rows {
                println!(
                    "\nCounters for {}: {} views | {} starts | {} completes",
                    row.date, row.views, row.starts, row.completes
                );
            }
        }
        Err(err) => println!("  Counters unavailable: {}", err),
    }

    Ok(())
}

/// Import and publish the sample quiz under [`DEMO_SLUG`].
pub(crate) fn seed_demo_quiz<R, S>(service: &QuizService<R, S>) -> Result<Quiz, QuizServiceError>
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    let creator = CreatorId(DEMO_CREATOR.to_string());
    let draft = demo_draft();
    let created = service.create(&creator, &draft.title)?;
    let imported = service.import_draft(&creator, &created.id, draft)?;
    service.update_basics(
        &creator,
        &imported.id,
        BasicSettings {
            title: imported.title.clone(),
            description: None,
            slug: DEMO_SLUG.to_string(),
        },
    )?;
    service.set_status(&creator, &imported.id, QuizStatus::Public)
}

fn demo_draft() -> QuizDraft {
    let question = |text: &str, a: &str, b: &str, axis: &str, a_side: Polarity| DraftQuestion {
        text: text.to_string(),
        option_a: a.to_string(),
        option_b: b.to_string(),
        axis: AxisKey::new(axis),
        weight: None,
        a_side: Some(a_side),
    };
    let result = |code: &str, name: &str, description: &str| DraftResult {
        code: code.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    };

    QuizDraft {
        title: "Weekend Style".to_string(),
        description: "Six quick picks about your ideal weekend.".to_string(),
        axes: vec![
            Axis {
                key: AxisKey::new("E"),
                left_label: "Homebody".to_string(),
                right_label: "Explorer".to_string(),
            },
            Axis {
                key: AxisKey::new("P"),
                left_label: "Planner".to_string(),
                right_label: "Improviser".to_string(),
            },
        ],
        results: vec![
            result("00", "Cozy Planner", "A tidy list and a warm blanket."),
            result("01", "Couch Improviser", "Home base, open agenda."),
            result("10", "Trip Architect", "Every outing mapped in advance."),
            result("11", "Free Roamer", "Out the door without a plan."),
        ],
        questions: vec![
            question("Saturday morning?", "Slow breakfast", "Early train", "E", Polarity::LeftIsA),
            question("Ideal evening?", "Night market", "Movie at home", "E", Polarity::RightIsA),
            question("Rainy day?", "Stay in", "Museum hop", "E", Polarity::LeftIsA),
            question("Weekend plans?", "Booked ahead", "Decided on the spot", "P", Polarity::LeftIsA),
            question("New restaurant?", "Walk in", "Read reviews first", "P", Polarity::RightIsA),
            question("Packing?", "Checklist", "Whatever fits", "P", Polarity::LeftIsA),
        ],
        recommendations: vec![
            Recommendation {
                id: "day-trip".to_string(),
                title: "Pick a day trip within two hours".to_string(),
                description: None,
                url: None,
                priority: 2,
                conditions: vec![RecommendationCondition {
                    axis_key: AxisKey::new("E"),
                    threshold: 25,
                    operator: ConditionOperator::Gte,
                }],
            },
            Recommendation {
                id: "home-reset".to_string(),
                title: "Plan a slow home reset".to_string(),
                description: Some("Clean sheets, one recipe, no alarms.".to_string()),
                url: None,
                priority: 1,
                conditions: vec![RecommendationCondition {
                    axis_key: AxisKey::new("E"),
                    threshold: -25,
                    operator: ConditionOperator::Lte,
                }],
            },
            Recommendation {
                id: "notebook".to_string(),
                title: "Keep a weekend notebook".to_string(),
                description: None,
                url: None,
                priority: 0,
                conditions: Vec::new(),
            },
        ],
    }
}

fn demo_answers() -> Answers {
    HashMap::from([
        (QuestionId::new("q-1"), AnswerValue::LeanB),
        (QuestionId::new("q-2"), AnswerValue::StronglyA),
        (QuestionId::new("q-3"), AnswerValue::Neutral),
        (QuestionId::new("q-4"), AnswerValue::StronglyB),
        (QuestionId::new("q-5"), AnswerValue::LeanA),
        (QuestionId::new("q-6"), AnswerValue::LeanB),
    ])
}
