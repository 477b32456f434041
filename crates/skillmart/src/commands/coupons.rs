//! Instructor coupon handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use skillmart_core::model::filter_and_sort;
use skillmart_core::{
    Command as CoreCommand, CommandResult, Coupon, CouponFilter, CouponSort, CouponStatus,
    CreateCouponRequest, EntityId, UpdateCouponRequest,
};

use crate::cli::{CouponSortArg, CouponStatusArg, CouponsArgs, CouponsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Backend, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CouponRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Discount")]
    discount: String,
    #[tabled(rename = "Uses")]
    uses: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl CouponRow {
    fn new(c: &Coupon, now: DateTime<Utc>, color: bool) -> Self {
        Self {
            id: c.id.to_string(),
            code: c.code.clone(),
            discount: format!("{}%", c.discount_percentage),
            uses: format!("{}/{}", c.used_count, c.max_uses),
            expires: c.expiry.format("%Y-%m-%d %H:%M").to_string(),
            status: output::coupon_status(c.status_at(now), color),
        }
    }
}

/// JSON/YAML shape: the stored coupon plus its status at render time.
#[derive(Serialize)]
struct CouponView<'a> {
    #[serde(flatten)]
    coupon: &'a Coupon,
    status: CouponStatus,
    remaining_uses: u32,
}

impl<'a> CouponView<'a> {
    fn new(coupon: &'a Coupon, now: DateTime<Utc>) -> Self {
        Self {
            coupon,
            status: coupon.status_at(now),
            remaining_uses: coupon.remaining_uses(),
        }
    }
}

fn coupon_detail(c: &Coupon, now: DateTime<Utc>) -> String {
    output::detail_lines(&[
        ("ID", c.id.to_string()),
        ("Code", c.code.clone()),
        ("Discount", format!("{}%", c.discount_percentage)),
        ("Uses", format!("{} of {} ({} left)", c.used_count, c.max_uses, c.remaining_uses())),
        ("Expires", c.expiry.to_rfc3339()),
        ("Status", c.status_at(now).to_string()),
    ])
}

fn status(arg: CouponStatusArg) -> CouponStatus {
    match arg {
        CouponStatusArg::Active => CouponStatus::Active,
        CouponStatusArg::ExpiringSoon => CouponStatus::ExpiringSoon,
        CouponStatusArg::Expired => CouponStatus::Expired,
    }
}

fn sort(arg: CouponSortArg) -> CouponSort {
    match arg {
        CouponSortArg::ExpiryAsc => CouponSort::ExpiryAsc,
        CouponSortArg::ExpiryDesc => CouponSort::ExpiryDesc,
        CouponSortArg::DiscountDesc => CouponSort::DiscountDesc,
        CouponSortArg::CodeAsc => CouponSort::CodeAsc,
        CouponSortArg::UsesDesc => CouponSort::UsesDesc,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backend: &Backend,
    args: CouponsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let now = Utc::now();
    let cmd = match args.command {
        CouponsCommand::List {
            course_id,
            status: status_arg,
            search,
            sort: sort_arg,
        } => {
            let session = backend.session().await?;
            let coupons = util::with_spinner(
                global,
                "Loading coupons",
                session.coupons(&EntityId::from(course_id)),
            )
            .await?;
            let filter = CouponFilter {
                status: status_arg.map(status),
                search,
            };
            let shown: Vec<CouponView<'_>> =
                filter_and_sort(&coupons, &filter, sort(sort_arg), now)
                    .into_iter()
                    .map(|c| CouponView::new(c, now))
                    .collect();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &shown,
                |v| CouponRow::new(v.coupon, now, color),
                |v| v.coupon.code.clone(),
            );
            output::print_output(&out, global.quiet);
            return Ok(());
        }

        CouponsCommand::Create {
            course_id,
            code,
            discount,
            max_uses,
            expires,
        } => CoreCommand::CreateCoupon {
            course_id: EntityId::from(course_id),
            request: CreateCouponRequest {
                code,
                discount_percentage: discount,
                max_uses,
                expiry: util::parse_expiry(&expires)?,
            },
        },

        CouponsCommand::Update {
            course_id,
            coupon_id,
            code,
            discount,
            max_uses,
            expires,
        } => {
            let update = UpdateCouponRequest {
                code,
                discount_percentage: discount,
                max_uses,
                expiry: expires.as_deref().map(util::parse_expiry).transpose()?,
            };
            if update.is_empty() {
                return Err(CliError::InvalidInput {
                    message: "nothing to update; pass at least one field flag".into(),
                });
            }
            CoreCommand::UpdateCoupon {
                course_id: EntityId::from(course_id),
                coupon_id: EntityId::from(coupon_id),
                update,
            }
        }

        CouponsCommand::Delete {
            course_id,
            coupon_id,
        } => {
            if !util::confirm(
                &format!("Delete coupon {coupon_id}?"),
                "coupons delete",
                global.yes,
            )? {
                return Ok(());
            }
            CoreCommand::DeleteCoupon {
                course_id: EntityId::from(course_id),
                coupon_id: EntityId::from(coupon_id),
            }
        }
    };

    let name = cmd.name();
    match util::with_spinner(global, "Saving coupon", backend.execute(cmd)).await? {
        CommandResult::Coupon(coupon) => {
            util::notice(global, &format!("✓ {name}: {}", coupon.code));
            let out = output::render_single(
                &global.output,
                &CouponView::new(&coupon, now),
                |v| coupon_detail(v.coupon, now),
                |v| v.coupon.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }
        _ => util::notice(global, &format!("✓ {name}")),
    }
    Ok(())
}
