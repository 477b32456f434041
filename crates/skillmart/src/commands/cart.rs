//! Cart and checkout handlers.

use tabled::Tabled;

use skillmart_core::{Cart, CartLine, Command as CoreCommand, CommandResult, EntityId, PaymentIntent};

use crate::cli::{CartArgs, CartCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{Backend, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CartLineRow {
    #[tabled(rename = "Course")]
    course: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Coupon")]
    coupon: String,
    #[tabled(rename = "You pay")]
    pay: String,
}

impl From<&CartLine> for CartLineRow {
    fn from(l: &CartLine) -> Self {
        Self {
            course: l.course_id.to_string(),
            title: l.title.clone(),
            price: output::money(l.price),
            coupon: l
                .applied_coupon
                .as_ref()
                .map(|c| format!("{} (-{}%)", c.code, c.discount_percentage))
                .unwrap_or_default(),
            pay: output::money(l.effective_price()),
        }
    }
}

/// Lines table plus the totals exactly as the server computed them.
fn cart_detail(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".into();
    }
    let rows: Vec<CartLineRow> = cart.lines.iter().map(CartLineRow::from).collect();
    let totals = output::detail_lines(&[
        ("Subtotal", output::money(cart.totals.subtotal)),
        ("Discount", format!("-{}", output::money(cart.totals.total_discount))),
        ("Total", output::money(cart.totals.total)),
    ]);
    format!("{}\n{totals}", output::render_table(&rows))
}

fn intent_detail(intent: &PaymentIntent) -> String {
    let mut pairs = vec![
        ("Amount", format!("{} {}", output::money(intent.amount), intent.currency.to_uppercase())),
        ("Courses", intent.course_ids.len().to_string()),
        ("Client secret", intent.client_secret.clone()),
    ];
    if let Some(ref id) = intent.id {
        pairs.insert(0, ("Intent", id.clone()));
    }
    output::detail_lines(&pairs)
}

fn print_cart(cart: &Cart, global: &GlobalOpts) {
    let out = match global.output {
        // Plain lists course ids, one per line.
        OutputFormat::Plain => cart
            .lines
            .iter()
            .map(|l| l.course_id.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => output::render_single(&global.output, cart, cart_detail, |_| String::new()),
    };
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(backend: &Backend, args: CartArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cmd = match args.command {
        CartCommand::Show => {
            let session = backend.session().await?;
            let cart = util::with_spinner(global, "Loading cart", session.cart()).await?;
            print_cart(&cart, global);
            return Ok(());
        }
        CartCommand::Add { course_id } => CoreCommand::AddToCart {
            course_id: EntityId::from(course_id),
        },
        CartCommand::Remove { course_id } => CoreCommand::RemoveFromCart {
            course_id: EntityId::from(course_id),
        },
        CartCommand::Toggle { course_id } => CoreCommand::ToggleCart {
            course_id: EntityId::from(course_id),
        },
        CartCommand::ApplyCoupon { course_id, code } => CoreCommand::ApplyCoupon {
            course_id: EntityId::from(course_id),
            code,
        },
        CartCommand::Clear => {
            if !util::confirm("Remove every course from your cart?", "cart clear", global.yes)? {
                return Ok(());
            }
            CoreCommand::ClearCart
        }
        CartCommand::Checkout { currency } => CoreCommand::Checkout { currency },
    };

    let name = cmd.name();
    match util::with_spinner(global, "Updating cart", backend.execute(cmd)).await? {
        CommandResult::Cart(cart) => {
            util::notice(global, &format!("✓ {name}: {} course(s) in cart", cart.len()));
            print_cart(&cart, global);
        }
        CommandResult::PaymentIntent(intent) => {
            let out = output::render_single(&global.output, &intent, intent_detail, |i| {
                i.client_secret.clone()
            });
            output::print_output(&out, global.quiet);
        }
        other => tracing::debug!(result = ?other, "unexpected cart command result"),
    }
    Ok(())
}
