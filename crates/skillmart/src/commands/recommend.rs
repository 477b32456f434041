//! Recommendation handlers.

use tabled::Tabled;

use skillmart_core::{Command as CoreCommand, CommandResult, EntityId, Recommendation, TrainingStatus};

use crate::cli::{GlobalOpts, RecommendArgs, RecommendCommand};
use crate::error::CliError;
use crate::output;

use super::{Backend, util};

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Course")]
    course: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Why")]
    reason: String,
}

impl From<&Recommendation> for RecommendationRow {
    fn from(r: &Recommendation) -> Self {
        Self {
            course: r.course_id.to_string(),
            title: r.display_title(),
            score: format!("{:.2}", r.score),
            reason: r.reason.clone().unwrap_or_default(),
        }
    }
}

fn training_detail(t: &TrainingStatus) -> String {
    let mut pairs = vec![("State", t.state.to_string())];
    if let Some(progress) = t.progress {
        pairs.push(("Progress", format!("{progress:.0}%")));
    }
    if let Some(at) = t.last_trained_at {
        pairs.push(("Last trained", at.to_rfc3339()));
    }
    if let Some(ref version) = t.model_version {
        pairs.push(("Model", version.clone()));
    }
    if let Some(ref message) = t.message {
        pairs.push(("Message", message.clone()));
    }
    output::detail_lines(&pairs)
}

fn print_recommendations(recs: &[Recommendation], global: &GlobalOpts) {
    if recs.is_empty() && matches!(global.output, crate::cli::OutputFormat::Table) {
        util::notice(global, "No recommendations yet.");
        return;
    }
    let out = output::render_list(
        &global.output,
        recs,
        |r| RecommendationRow::from(r),
        |r| r.course_id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

fn print_training(status: &TrainingStatus, global: &GlobalOpts) {
    let out = output::render_single(&global.output, status, training_detail, |t| {
        t.state.to_string()
    });
    output::print_output(&out, global.quiet);
}

/// Courses similar to `course_id`. Also reachable as `courses similar`.
pub async fn similar(backend: &Backend, course_id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let session = backend.session().await?;
    let recs = util::with_spinner(
        global,
        "Finding similar courses",
        session.similar_courses(&EntityId::from(course_id)),
    )
    .await?;
    print_recommendations(&recs, global);
    Ok(())
}

pub async fn handle(
    backend: &Backend,
    args: RecommendArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RecommendCommand::ForUser { user_id } => {
            let session = backend.session().await?;
            let target = user_id.map(EntityId::from);
            let recs = util::with_spinner(
                global,
                "Loading recommendations",
                session.recommendations(target.as_ref()),
            )
            .await?;
            print_recommendations(&recs, global);
            Ok(())
        }

        RecommendCommand::Similar { course_id } => similar(backend, &course_id, global).await,

        RecommendCommand::Status => {
            let session = backend.session().await?;
            let status =
                util::with_spinner(global, "Checking model", session.training_status()).await?;
            print_training(&status, global);
            Ok(())
        }

        RecommendCommand::Train => {
            match util::with_spinner(global, "Starting training", backend.execute(CoreCommand::TrainModel))
                .await?
            {
                CommandResult::Training(status) => {
                    util::notice(global, "✓ Training requested");
                    print_training(&status, global);
                }
                _ => util::notice(global, "✓ Training requested"),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmart_core::ModelState;

    #[test]
    fn row_uses_display_title_and_two_decimals() {
        let rec = Recommendation {
            course_id: EntityId::from("c3"),
            title: Some("Async Rust".into()),
            score: 0.876,
            reason: Some("Similar to your courses".into()),
            course: None,
        };
        let row = RecommendationRow::from(&rec);
        assert_eq!(row.title, "Async Rust");
        assert_eq!(row.score, "0.88");
    }

    #[test]
    fn training_detail_skips_missing_fields() {
        let status = TrainingStatus {
            state: ModelState::Training,
            last_trained_at: None,
            progress: Some(42.0),
            message: None,
            model_version: None,
        };
        let detail = training_detail(&status);
        assert!(detail.contains("training"));
        assert!(detail.contains("42%"));
        assert!(!detail.contains("Model"));
    }
}
