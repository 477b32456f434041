//! Catalog and enrollment handlers.

use tabled::Tabled;

use skillmart_core::{Course, CourseQuery, Enrollment, EntityId};

use crate::cli::{CoursesArgs, CoursesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Backend, recommend, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct CourseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Students")]
    students: u64,
}

impl From<&Course> for CourseRow {
    fn from(c: &Course) -> Self {
        Self {
            id: c.id.to_string(),
            title: c.title.clone(),
            category: c.category.clone().unwrap_or_default(),
            level: c.level.to_string(),
            price: price_label(c),
            rating: c
                .rating
                .map(|r| format!("{r:.1} ({})", c.review_count))
                .unwrap_or_default(),
            students: c.student_count,
        }
    }
}

#[derive(Tabled)]
struct EnrollmentRow {
    #[tabled(rename = "Course")]
    course: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Enrolled")]
    enrolled: String,
}

impl From<&Enrollment> for EnrollmentRow {
    fn from(e: &Enrollment) -> Self {
        Self {
            course: e.course_ref().map(ToString::to_string).unwrap_or_default(),
            title: e.course.as_ref().map(|c| c.title.clone()).unwrap_or_default(),
            progress: format!("{:.0}%", e.progress),
            enrolled: e
                .enrolled_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

fn price_label(c: &Course) -> String {
    if c.is_free() {
        "Free".into()
    } else {
        output::money(c.price)
    }
}

fn course_detail(c: &Course) -> String {
    let mut pairs = vec![
        ("ID", c.id.to_string()),
        ("Title", c.title.clone()),
        ("Level", c.level.to_string()),
        ("Price", price_label(c)),
    ];
    if let Some(ref category) = c.category {
        pairs.push(("Category", category.clone()));
    }
    if let Some(ref name) = c.instructor_name {
        pairs.push(("Instructor", name.clone()));
    }
    if let Some(rating) = c.rating {
        pairs.push(("Rating", format!("{rating:.1} from {} reviews", c.review_count)));
    }
    pairs.push(("Students", c.student_count.to_string()));
    if let Some(ref description) = c.description {
        pairs.push(("About", description.clone()));
    }
    output::detail_lines(&pairs)
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    backend: &Backend,
    args: CoursesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CoursesCommand::List {
            category,
            level,
            search,
        } => {
            let query = CourseQuery {
                category,
                level,
                search,
            };
            let session = backend.session().await?;
            let courses = util::with_spinner(global, "Loading courses", session.courses(&query)).await?;
            print_courses(&courses, global);
            Ok(())
        }

        CoursesCommand::Get { id } => {
            let session = backend.session().await?;
            let course = util::with_spinner(
                global,
                "Loading course",
                session.course(&EntityId::from(id)),
            )
            .await?;
            let out = output::render_single(&global.output, &course, course_detail, |c| {
                c.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CoursesCommand::Similar { id } => recommend::similar(backend, &id, global).await,

        CoursesCommand::Mine => {
            let session = backend.session().await?;
            let courses =
                util::with_spinner(global, "Loading your courses", session.instructor_courses())
                    .await?;
            print_courses(&courses, global);
            Ok(())
        }
    }
}

pub async fn enrollments(backend: &Backend, global: &GlobalOpts) -> Result<(), CliError> {
    let session = backend.session().await?;
    let enrollments =
        util::with_spinner(global, "Loading enrollments", session.enrollments()).await?;
    let out = output::render_list(
        &global.output,
        &enrollments,
        |e| EnrollmentRow::from(e),
        |e| e.course_ref().map(ToString::to_string).unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_courses(courses: &[Course], global: &GlobalOpts) {
    let out = output::render_list(&global.output, courses, |c| CourseRow::from(c), |c| {
        c.id.to_string()
    });
    output::print_output(&out, global.quiet);
}
