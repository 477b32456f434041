//! Clap derive structures for the `skillmart` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only clap types appear here; `build.rs` includes this file to render
//! man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// skillmart -- shop, teach and administer a SkillMart marketplace
#[derive(Debug, Parser)]
#[command(
    name = "skillmart",
    version,
    about = "Browse courses, manage your cart and coupons, and administer a SkillMart marketplace",
    long_about = "Command-line client for the SkillMart e-learning marketplace.\n\n\
        Students browse the catalog, fill a cart and check out. Instructors\n\
        manage coupons for their courses. Admins manage users, read platform\n\
        statistics and retrain the recommendation model.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "SKILLMART_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile), e.g. https://skillmart.example/api
    #[arg(long, env = "SKILLMART_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides profile and keyring)
    #[arg(long, env = "SKILLMART_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SKILLMART_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates (local development backends)
    #[arg(long, short = 'k', env = "SKILLMART_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: profile, then 30]
    #[arg(long, env = "SKILLMART_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with email and password and store the issued token
    Login(LoginArgs),

    /// Create a student or instructor account and sign in to it
    Register(RegisterArgs),

    /// Forget the stored token for the active profile
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Browse the course catalog
    #[command(alias = "c")]
    Courses(CoursesArgs),

    /// List your enrolled courses
    Enrollments,

    /// View and change your shopping cart
    Cart(CartArgs),

    /// Manage discount coupons for your courses (instructors)
    Coupons(CouponsArgs),

    /// Manage user accounts (admins)
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Platform statistics (admins)
    Admin(AdminArgs),

    /// Course recommendations and the recommendation model
    #[command(alias = "rec")]
    Recommend(RecommendArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, short = 'e')]
    pub email: String,

    /// Account type (admins are created by other admins)
    #[arg(long, value_enum, default_value = "student")]
    pub role: RoleArg,

    /// Student education
    #[arg(long)]
    pub education: Option<String>,

    /// Instructor expertise, comma separated
    #[arg(long, value_delimiter = ',')]
    pub expertise: Vec<String>,

    /// Instructor bio
    #[arg(long)]
    pub bio: Option<String>,
}

// ── Courses ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CoursesArgs {
    #[command(subcommand)]
    pub command: CoursesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CoursesCommand {
    /// List catalog courses
    #[command(alias = "ls")]
    List {
        /// Only courses in this category
        #[arg(long)]
        category: Option<String>,

        /// Only courses at this level
        #[arg(long)]
        level: Option<String>,

        /// Free-text search
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show one course
    Get {
        /// Course ID
        id: String,
    },

    /// Courses similar to the given one
    Similar {
        /// Course ID
        id: String,
    },

    /// Courses you teach (instructors)
    Mine,
}

// ── Cart ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show cart lines and totals
    Show,

    /// Add a course to the cart
    Add {
        /// Course ID
        course_id: String,
    },

    /// Remove a course from the cart
    #[command(alias = "rm")]
    Remove {
        /// Course ID
        course_id: String,
    },

    /// Add the course if absent, remove it if present
    Toggle {
        /// Course ID
        course_id: String,
    },

    /// Apply a coupon code to one cart line
    ApplyCoupon {
        /// Course ID the coupon is for
        course_id: String,

        /// Coupon code (uppercase letters and digits)
        code: String,
    },

    /// Remove every line from the cart
    Clear,

    /// Create a payment intent for the cart total
    Checkout {
        /// ISO 4217 currency code
        #[arg(long, default_value = "usd")]
        currency: String,
    },
}

// ── Coupons ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CouponStatusArg {
    Active,
    ExpiringSoon,
    Expired,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CouponSortArg {
    /// Soonest expiry first
    ExpiryAsc,
    /// Latest expiry first
    ExpiryDesc,
    /// Largest discount first
    DiscountDesc,
    /// Alphabetical by code
    CodeAsc,
    /// Most used first
    UsesDesc,
}

#[derive(Debug, Args)]
pub struct CouponsArgs {
    #[command(subcommand)]
    pub command: CouponsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CouponsCommand {
    /// List a course's coupons
    #[command(alias = "ls")]
    List {
        /// Course ID
        course_id: String,

        /// Only coupons with this derived status
        #[arg(long, value_enum)]
        status: Option<CouponStatusArg>,

        /// Case-insensitive code search
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Sort order
        #[arg(long, value_enum, default_value = "expiry-asc")]
        sort: CouponSortArg,
    },

    /// Create a coupon
    Create {
        /// Course ID
        course_id: String,

        /// Code (3-20 uppercase letters and digits)
        #[arg(long)]
        code: String,

        /// Discount percentage (1-100)
        #[arg(long, short = 'd')]
        discount: u8,

        /// Maximum number of redemptions
        #[arg(long)]
        max_uses: u32,

        /// Expiry as YYYY-MM-DD (end of that day, UTC) or RFC 3339
        #[arg(long)]
        expires: String,
    },

    /// Change a coupon
    Update {
        /// Course ID
        course_id: String,

        /// Coupon ID
        coupon_id: String,

        #[arg(long)]
        code: Option<String>,

        #[arg(long, short = 'd')]
        discount: Option<u8>,

        #[arg(long)]
        max_uses: Option<u32>,

        /// Expiry as YYYY-MM-DD or RFC 3339 (a past date ends the coupon)
        #[arg(long)]
        expires: Option<String>,
    },

    /// Delete a coupon
    #[command(alias = "rm")]
    Delete {
        /// Course ID
        course_id: String,

        /// Coupon ID
        coupon_id: String,
    },
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Student,
    Instructor,
    Admin,
}

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List accounts
    #[command(alias = "ls")]
    List {
        #[arg(long, value_enum)]
        role: Option<RoleArg>,

        /// Only active accounts
        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        /// Only deactivated accounts
        #[arg(long)]
        inactive: bool,

        /// Name or email search
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show one account
    Get {
        /// User ID
        id: String,
    },

    /// Create an account (password is prompted)
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, value_enum)]
        role: RoleArg,

        /// Student education
        #[arg(long)]
        education: Option<String>,

        /// Instructor expertise, comma separated
        #[arg(long, value_delimiter = ',')]
        expertise: Vec<String>,

        /// Instructor bio
        #[arg(long)]
        bio: Option<String>,
    },

    /// Change an account
    Update {
        /// User ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, value_enum)]
        role: Option<RoleArg>,

        #[arg(long)]
        education: Option<String>,

        #[arg(long, value_delimiter = ',')]
        expertise: Option<Vec<String>>,

        #[arg(long)]
        bio: Option<String>,
    },

    /// Delete an account
    #[command(alias = "rm")]
    Delete {
        /// User ID
        id: String,
    },

    /// Re-enable a deactivated account
    Activate {
        /// User ID
        id: String,
    },

    /// Block an account from signing in
    Deactivate {
        /// User ID
        id: String,
    },
}

// ── Admin ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Platform totals
    Stats,
    /// User growth, enrollment trends and popular categories
    Analytics,
    /// Revenue by month and top-selling courses
    Revenue,
    /// Stats, analytics and revenue together
    Dashboard,
}

// ── Recommendations ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RecommendArgs {
    #[command(subcommand)]
    pub command: RecommendCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecommendCommand {
    /// Personalized recommendations
    ForUser {
        /// User ID (defaults to the signed-in account)
        user_id: Option<String>,
    },

    /// Courses similar to the given one
    Similar {
        /// Course ID
        course_id: String,
    },

    /// Recommendation model training status (admins)
    Status,

    /// Start retraining the recommendation model (admins)
    Train,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the current configuration (secrets masked)
    Show,

    /// Set a profile value
    Set {
        /// Key: api_url, auth_mode, token_env, email, insecure, timeout, ca_cert
        key: String,

        /// Value
        value: String,
    },

    /// List profile names
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Store a bearer token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
