//! Admin dashboard handlers.

use tabled::Tabled;

use skillmart_core::{AdminDashboard, AdminStats, Analytics, RevenueStats};

use crate::cli::{AdminArgs, AdminCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{Backend, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "New users")]
    users: u64,
    #[tabled(rename = "Enrollments")]
    enrollments: u64,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Courses")]
    count: u64,
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    period: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Orders")]
    orders: u64,
}

#[derive(Tabled)]
struct TopCourseRow {
    #[tabled(rename = "Course")]
    course: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Sales")]
    sales: u64,
}

// ── Renderers ───────────────────────────────────────────────────────

fn stats_detail(s: &AdminStats) -> String {
    output::detail_lines(&[
        ("Users", s.total_users.to_string()),
        ("Students", s.total_students.to_string()),
        ("Instructors", s.total_instructors.to_string()),
        ("Courses", s.total_courses.to_string()),
        ("Enrollments", s.total_enrollments.to_string()),
        ("Revenue", output::money(s.total_revenue)),
    ])
}

/// User growth and enrollment trends are joined on their period labels,
/// keeping the order growth reports them in.
fn trend_rows(a: &Analytics) -> Vec<TrendRow> {
    let mut rows: Vec<TrendRow> = a
        .user_growth
        .iter()
        .map(|p| TrendRow {
            period: p.period.clone(),
            users: p.count,
            enrollments: 0,
        })
        .collect();
    for point in &a.enrollment_trends {
        match rows.iter_mut().find(|r| r.period == point.period) {
            Some(row) => row.enrollments = point.count,
            None => rows.push(TrendRow {
                period: point.period.clone(),
                users: 0,
                enrollments: point.count,
            }),
        }
    }
    rows
}

fn analytics_detail(a: &Analytics) -> String {
    let mut sections = Vec::new();
    let trends = trend_rows(a);
    if !trends.is_empty() {
        sections.push(output::render_table(&trends));
    }
    let categories: Vec<CategoryRow> = a
        .popular_categories
        .iter()
        .map(|c| CategoryRow {
            category: c.category.clone(),
            count: c.count,
        })
        .collect();
    if !categories.is_empty() {
        sections.push(format!("Popular categories\n{}", output::render_table(&categories)));
    }
    if sections.is_empty() {
        return "No analytics data yet.".into();
    }
    sections.join("\n\n")
}

fn revenue_detail(r: &RevenueStats) -> String {
    let mut sections = vec![output::detail_lines(&[
        ("Total revenue", output::money(r.total_revenue)),
        (
            "Best month",
            r.best_month().map_or_else(
                || "-".to_owned(),
                |m| format!("{} ({})", m.period, output::money(m.revenue)),
            ),
        ),
    ])];
    let months: Vec<MonthRow> = r
        .monthly
        .iter()
        .map(|m| MonthRow {
            period: m.period.clone(),
            revenue: output::money(m.revenue),
            orders: m.orders,
        })
        .collect();
    if !months.is_empty() {
        sections.push(output::render_table(&months));
    }
    let top: Vec<TopCourseRow> = r
        .top_courses
        .iter()
        .map(|c| TopCourseRow {
            course: c.title.clone().unwrap_or_else(|| c.course_id.to_string()),
            revenue: output::money(c.revenue),
            sales: c.sales,
        })
        .collect();
    if !top.is_empty() {
        sections.push(format!("Top courses\n{}", output::render_table(&top)));
    }
    sections.join("\n\n")
}

fn dashboard_detail(d: &AdminDashboard) -> String {
    [
        stats_detail(&d.stats),
        analytics_detail(&d.analytics),
        revenue_detail(&d.revenue),
    ]
    .join("\n\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(backend: &Backend, args: AdminArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = backend.session().await?;

    let out = match args.command {
        AdminCommand::Stats => {
            let stats = util::with_spinner(global, "Loading stats", session.admin_stats()).await?;
            output::render_single(&global.output, &stats, stats_detail, |s| {
                s.total_users.to_string()
            })
        }
        AdminCommand::Analytics => {
            let analytics =
                util::with_spinner(global, "Loading analytics", session.analytics()).await?;
            output::render_single(&global.output, &analytics, analytics_detail, |a| {
                a.popular_categories
                    .iter()
                    .map(|c| c.category.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        AdminCommand::Revenue => {
            let revenue =
                util::with_spinner(global, "Loading revenue", session.revenue_stats()).await?;
            output::render_single(&global.output, &revenue, revenue_detail, |r| {
                r.total_revenue.to_string()
            })
        }
        AdminCommand::Dashboard => {
            // All three reads or nothing.
            let dashboard =
                util::with_spinner(global, "Loading dashboard", session.admin_dashboard()).await?;
            match global.output {
                OutputFormat::Plain => dashboard.stats.total_users.to_string(),
                _ => output::render_single(&global.output, &dashboard, dashboard_detail, |_| {
                    String::new()
                }),
            }
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
