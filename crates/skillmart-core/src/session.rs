// ── Session ──
//
// One authenticated connection to the marketplace API plus the state
// slices fetched through it. Reads call the API directly; mutations go
// through the command channel, then re-fetch what they touched.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::SecretString;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use skillmart_api::types::{
    CouponCreate, CouponUpdate, CourseQuery, PaymentIntentRequest, UserCreate, UserQuery,
    UserUpdate,
};
use skillmart_api::{Credentials, MarketplaceClient, TlsMode, TransportConfig};

use crate::command::{Command, CommandEnvelope, CommandResult, CreateUserRequest};
use crate::config::{AuthCredentials, SessionConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    AdminDashboard, AdminStats, Analytics, Cart, CartAction, Coupon, Course, Enrollment, EntityId,
    PaymentIntent, Recommendation, RevenueStats, Role, TrainingStatus, User,
};
use crate::store::DataStore;
use crate::validate::{self, ValidationError};

const COMMAND_CHANNEL_SIZE: usize = 16;

// ── ConnectionState ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Session ──────────────────────────────────────────────────────

/// Shared context handed to every view.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Owns the HTTP client, the
/// [`DataStore`] and the command processor task.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    client: Mutex<Option<Arc<MarketplaceClient>>>,
    issued_token: Mutex<Option<SecretString>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    /// Create a session. Does NOT connect; call [`connect()`](Self::connect).
    pub fn new(config: SessionConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(SessionInner {
                config,
                store: Arc::new(DataStore::new()),
                connection_state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                client: Mutex::new(None),
                issued_token: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Build the HTTP client, authenticate, and start the command
    /// processor.
    ///
    /// With email/password credentials this logs in and keeps the issued
    /// token for the rest of the session (see [`issued_token()`](Self::issued_token)).
    /// With a token it fetches the signed-in profile, which also proves
    /// the token still works.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let client = match self.call(self.establish()).await {
            Ok(client) => client,
            Err(e) => {
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                return Err(e);
            }
        };
        *self.inner.client.lock().await = Some(Arc::new(client));

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let session = self.clone();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(command_processor_task(session, rx)));
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(url = %self.inner.config.api_url, "connected to marketplace API");
        Ok(())
    }

    async fn establish(&self) -> Result<MarketplaceClient, CoreError> {
        let config = &self.inner.config;
        let transport = build_transport(config);
        let url = config.api_url.as_str();

        match &config.auth {
            AuthCredentials::Anonymous => {
                debug!("anonymous session, catalog only");
                Ok(MarketplaceClient::new(
                    url,
                    &Credentials::Anonymous,
                    &transport,
                )?)
            }
            AuthCredentials::Token(token) => {
                let client = MarketplaceClient::new(
                    url,
                    &Credentials::Bearer {
                        token: token.clone(),
                    },
                    &transport,
                )?;
                if config.fetch_profile {
                    let me = User::from(client.me().await?);
                    debug!(user = %me.email, role = %me.role(), "token accepted");
                    self.inner.store.set_current_user(Some(me));
                }
                Ok(client)
            }
            AuthCredentials::Credentials { email, password } => {
                let anonymous = MarketplaceClient::new(url, &Credentials::Anonymous, &transport)?;
                let auth = anonymous.login(email, password).await?;
                let user = User::from(auth.user);
                debug!(user = %user.email, role = %user.role(), "login successful");
                self.inner.store.set_current_user(Some(user));

                let token = SecretString::from(auth.token);
                let client = MarketplaceClient::new(
                    url,
                    &Credentials::Bearer {
                        token: token.clone(),
                    },
                    &transport,
                )?;
                *self.inner.issued_token.lock().await = Some(token);
                Ok(client)
            }
        }
    }

    /// Create a student or instructor account without signing in first.
    ///
    /// Returns the new user and the token the backend issued for it.
    /// Admin accounts are only created by admins, through [`Command::CreateUser`].
    pub async fn register(
        config: &SessionConfig,
        request: &CreateUserRequest,
    ) -> Result<(User, SecretString), CoreError> {
        validate::validate_user_create(request).map_err(CoreError::validation)?;
        if request.profile.role() == Role::Admin {
            return Err(CoreError::validation(vec![ValidationError {
                field: "role",
                reason: "admin accounts cannot self-register".into(),
            }]));
        }

        let transport = build_transport(config);
        let client =
            MarketplaceClient::new(config.api_url.as_str(), &Credentials::Anonymous, &transport)?;
        let auth = client
            .register(&UserCreate::from(request))
            .await
            .map_err(|e| CoreError::from(e).with_timeout(config.timeout))?;
        let user = User::from(auth.user);
        info!(user = %user.email, role = %user.role(), "account registered");
        Ok((user, SecretString::from(auth.token)))
    }

    /// Stop the command processor and drop the client.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "command processor ended abnormally");
            }
        }
        drop(handles);

        *self.inner.client.lock().await = None;
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Connect, run `f`, disconnect. One CLI invocation is one of these.
    pub async fn oneshot<F, Fut, T>(config: SessionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Session) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let session = Session::new(config);
        session.connect().await?;
        let result = f(session.clone()).await;
        session.disconnect().await;
        result
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Token issued by a credentials login during [`connect()`](Self::connect).
    pub async fn issued_token(&self) -> Option<SecretString> {
        self.inner.issued_token.lock().await.clone()
    }

    pub fn current_user(&self) -> Option<Arc<User>> {
        self.inner.store.current_user()
    }

    // ── Command execution ────────────────────────────────────────

    /// Validate `cmd`, queue it, and wait for its result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        cmd.validate(Utc::now())?;
        self.require_auth(cmd.name())?;
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::SessionClosed);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::SessionClosed)?;

        rx.await.map_err(|_| CoreError::SessionClosed)?
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Catalog listing. Replaces the course slice.
    pub async fn courses(&self, query: &CourseQuery) -> Result<Vec<Course>, CoreError> {
        let client = self.client().await?;
        let courses: Vec<Course> = self
            .call(client.list_courses(query))
            .await?
            .into_iter()
            .map(Course::from)
            .collect();
        self.inner.store.replace_courses(courses.clone());
        Ok(courses)
    }

    pub async fn course(&self, id: &EntityId) -> Result<Course, CoreError> {
        let client = self.client().await?;
        let course = Course::from(self.call(client.get_course(&id.to_string())).await?);
        self.inner.store.upsert_course(course.clone());
        Ok(course)
    }

    /// Courses owned by the signed-in instructor.
    pub async fn instructor_courses(&self) -> Result<Vec<Course>, CoreError> {
        self.require_auth("instructor courses")?;
        let client = self.client().await?;
        let courses: Vec<Course> = self
            .call(client.list_instructor_courses())
            .await?
            .into_iter()
            .map(Course::from)
            .collect();
        self.inner.store.replace_courses(courses.clone());
        Ok(courses)
    }

    pub async fn cart(&self) -> Result<Cart, CoreError> {
        self.require_auth("cart")?;
        let client = self.client().await?;
        self.call(refetch_cart(&client, &self.inner.store)).await
    }

    pub async fn enrollments(&self) -> Result<Vec<Enrollment>, CoreError> {
        self.require_auth("enrollments")?;
        let client = self.client().await?;
        let enrollments: Vec<Enrollment> = self
            .call(client.list_enrollments())
            .await?
            .into_iter()
            .map(Enrollment::from)
            .collect();
        self.inner.store.replace_enrollments(enrollments.clone());
        Ok(enrollments)
    }

    pub async fn coupons(&self, course_id: &EntityId) -> Result<Vec<Coupon>, CoreError> {
        self.require_auth("coupons")?;
        let client = self.client().await?;
        self.call(refetch_coupons(&client, &self.inner.store, course_id))
            .await
    }

    pub async fn users(&self, query: &UserQuery) -> Result<Vec<User>, CoreError> {
        self.require_auth("user management")?;
        let client = self.client().await?;
        let users: Vec<User> = self
            .call(client.list_users(query))
            .await?
            .into_iter()
            .map(User::from)
            .collect();
        self.inner.store.replace_users(users.clone());
        Ok(users)
    }

    pub async fn user(&self, id: &EntityId) -> Result<User, CoreError> {
        self.require_auth("user management")?;
        let client = self.client().await?;
        let user = User::from(self.call(client.get_user(&id.to_string())).await?);
        self.inner.store.upsert_user(user.clone());
        Ok(user)
    }

    /// Stats, analytics and revenue, fetched concurrently. Fails as a
    /// whole if any of the three fails.
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, CoreError> {
        self.require_auth("admin dashboard")?;
        let client = self.client().await?;
        let (stats, analytics, revenue) = self
            .call(async {
                tokio::try_join!(
                    client.get_admin_stats(),
                    client.get_analytics(),
                    client.get_revenue_stats(),
                )
            })
            .await?;
        Ok(AdminDashboard {
            stats: stats.into(),
            analytics: analytics.into(),
            revenue: revenue.into(),
        })
    }

    pub async fn admin_stats(&self) -> Result<AdminStats, CoreError> {
        self.require_auth("admin stats")?;
        let client = self.client().await?;
        Ok(self.call(client.get_admin_stats()).await?.into())
    }

    pub async fn analytics(&self) -> Result<Analytics, CoreError> {
        self.require_auth("admin analytics")?;
        let client = self.client().await?;
        Ok(self.call(client.get_analytics()).await?.into())
    }

    pub async fn revenue_stats(&self) -> Result<RevenueStats, CoreError> {
        self.require_auth("revenue stats")?;
        let client = self.client().await?;
        Ok(self.call(client.get_revenue_stats()).await?.into())
    }

    /// Recommendations for `user_id`, or for the signed-in user.
    pub async fn recommendations(
        &self,
        user_id: Option<&EntityId>,
    ) -> Result<Vec<Recommendation>, CoreError> {
        self.require_auth("recommendations")?;
        let target = match user_id {
            Some(id) => id.clone(),
            None => self
                .current_user()
                .map(|u| u.id.clone())
                .ok_or_else(|| CoreError::NotAuthenticated {
                    action: "recommendations for the signed-in user".into(),
                })?,
        };
        let client = self.client().await?;
        Ok(self
            .call(client.get_recommendations(&target.to_string()))
            .await?
            .into_iter()
            .map(Recommendation::from)
            .collect())
    }

    pub async fn similar_courses(
        &self,
        course_id: &EntityId,
    ) -> Result<Vec<Recommendation>, CoreError> {
        let client = self.client().await?;
        Ok(self
            .call(client.get_similar_courses(&course_id.to_string()))
            .await?
            .into_iter()
            .map(Recommendation::from)
            .collect())
    }

    pub async fn training_status(&self) -> Result<TrainingStatus, CoreError> {
        self.require_auth("model training status")?;
        let client = self.client().await?;
        Ok(self.call(client.get_training_status()).await?.into())
    }

    // ── Snapshot accessors (delegate to DataStore) ───────────────

    pub fn courses_snapshot(&self) -> Arc<Vec<Arc<Course>>> {
        self.inner.store.courses_snapshot()
    }

    pub fn coupons_snapshot(&self) -> Arc<Vec<Arc<Coupon>>> {
        self.inner.store.coupons_snapshot()
    }

    pub fn users_snapshot(&self) -> Arc<Vec<Arc<User>>> {
        self.inner.store.users_snapshot()
    }

    pub fn enrollments_snapshot(&self) -> Arc<Vec<Arc<Enrollment>>> {
        self.inner.store.enrollments_snapshot()
    }

    pub fn cart_snapshot(&self) -> Option<Arc<Cart>> {
        self.inner.store.cart()
    }

    // ── Helpers ──────────────────────────────────────────────────

    async fn client(&self) -> Result<Arc<MarketplaceClient>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::SessionClosed)
    }

    /// Await a backend call, reporting timeouts with the configured limit.
    async fn call<T, E>(&self, fut: impl Future<Output = Result<T, E>>) -> Result<T, CoreError>
    where
        E: Into<CoreError>,
    {
        fut.await
            .map_err(|e| e.into().with_timeout(self.inner.config.timeout))
    }

    fn require_auth(&self, action: &str) -> Result<(), CoreError> {
        if self.inner.config.auth.is_anonymous() {
            Err(CoreError::NotAuthenticated {
                action: action.to_owned(),
            })
        } else {
            Ok(())
        }
    }
}

// ── Background task ──────────────────────────────────────────────

/// Run queued commands one at a time, so a mutation and its re-fetch
/// finish before the next mutation starts.
async fn command_processor_task(session: Session, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = session.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let name = envelope.command.name();
                let result = session.call(route_command(&session, envelope.command)).await;
                if let Err(ref e) = result {
                    debug!(command = name, error = %e, "command failed");
                }
                // The caller may have stopped waiting.
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Perform the write, then re-fetch the affected collection.
#[allow(clippy::too_many_lines)]
async fn route_command(session: &Session, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = session.client().await?;
    let store = &session.inner.store;

    match cmd {
        // ── Cart ─────────────────────────────────────────────────

        Command::AddToCart { course_id } => {
            let current = refetch_cart(&client, store).await?;
            if current.action_for(&course_id) == CartAction::Remove {
                debug!(course = %course_id, "already in cart, nothing to add");
                return Ok(CommandResult::Cart(current));
            }
            client.add_to_cart(&course_id.to_string()).await?;
            Ok(CommandResult::Cart(refetch_cart(&client, store).await?))
        }

        Command::RemoveFromCart { course_id } => {
            client.remove_from_cart(&course_id.to_string()).await?;
            Ok(CommandResult::Cart(refetch_cart(&client, store).await?))
        }

        Command::ToggleCart { course_id } => {
            let current = refetch_cart(&client, store).await?;
            match current.action_for(&course_id) {
                CartAction::Add => client.add_to_cart(&course_id.to_string()).await?,
                CartAction::Remove => client.remove_from_cart(&course_id.to_string()).await?,
            };
            Ok(CommandResult::Cart(refetch_cart(&client, store).await?))
        }

        Command::ApplyCoupon { course_id, code } => {
            client
                .apply_coupon(&course_id.to_string(), code.trim())
                .await?;
            Ok(CommandResult::Cart(refetch_cart(&client, store).await?))
        }

        Command::ClearCart => {
            client.clear_cart().await?;
            Ok(CommandResult::Cart(refetch_cart(&client, store).await?))
        }

        Command::Checkout { currency } => {
            let cart = refetch_cart(&client, store).await?;
            let amount = checkout_amount(&cart)?;
            let currency = currency.to_ascii_lowercase();
            let request = PaymentIntentRequest {
                amount,
                currency: currency.clone(),
                course_ids: cart.lines.iter().map(|l| l.course_id.to_string()).collect(),
            };
            let intent = client.create_payment_intent(&request).await?;
            info!(amount, currency = %currency, "payment intent created");
            Ok(CommandResult::PaymentIntent(PaymentIntent {
                id: intent.payment_intent_id,
                client_secret: intent.client_secret,
                amount: cart.totals.total,
                currency,
                course_ids: cart.course_ids(),
            }))
        }

        // ── Instructor coupons ───────────────────────────────────

        Command::CreateCoupon { course_id, request } => {
            let created = client
                .create_coupon(&course_id.to_string(), &CouponCreate::from(&request))
                .await?;
            refetch_coupons(&client, store, &course_id).await?;
            Ok(CommandResult::Coupon(Coupon::from(created)))
        }

        Command::UpdateCoupon {
            course_id,
            coupon_id,
            update,
        } => {
            let updated = client
                .update_coupon(
                    &course_id.to_string(),
                    &coupon_id.to_string(),
                    &CouponUpdate::from(&update),
                )
                .await?;
            refetch_coupons(&client, store, &course_id).await?;
            Ok(CommandResult::Coupon(Coupon::from(updated)))
        }

        Command::DeleteCoupon {
            course_id,
            coupon_id,
        } => {
            client
                .delete_coupon(&course_id.to_string(), &coupon_id.to_string())
                .await?;
            refetch_coupons(&client, store, &course_id).await?;
            Ok(CommandResult::Ok)
        }

        // ── User administration ──────────────────────────────────

        Command::CreateUser(request) => {
            let created = client.create_user(&UserCreate::from(&request)).await?;
            refetch_users(&client, store).await?;
            Ok(CommandResult::User(User::from(created)))
        }

        Command::UpdateUser { id, update } => {
            let needs_role = update.role.is_none()
                && (update.education.is_some() || update.expertise.is_some() || update.bio.is_some());
            if needs_role {
                let role = current_role(&client, store, &id).await?;
                validate::validate_user_update(&update, Some(role)).map_err(CoreError::validation)?;
            }
            let updated = client
                .update_user(&id.to_string(), &UserUpdate::from(&update))
                .await?;
            refetch_users(&client, store).await?;
            Ok(CommandResult::User(User::from(updated)))
        }

        Command::DeleteUser { id } => {
            client.delete_user(&id.to_string()).await?;
            refetch_users(&client, store).await?;
            Ok(CommandResult::Ok)
        }

        Command::SetUserActive { id, active } => {
            let updated = client.set_user_active(&id.to_string(), active).await?;
            refetch_users(&client, store).await?;
            Ok(CommandResult::User(User::from(updated)))
        }

        // ── Recommendation model ─────────────────────────────────

        Command::TrainModel => {
            let accepted = client.train_model().await?;
            debug!(job = ?accepted.job_id, status = ?accepted.status, "training accepted");
            let status = client.get_training_status().await?;
            Ok(CommandResult::Training(status.into()))
        }
    }
}

// ── Re-fetch helpers ─────────────────────────────────────────────

async fn refetch_cart(client: &MarketplaceClient, store: &DataStore) -> Result<Cart, CoreError> {
    let cart = Cart::from(client.get_cart().await?);
    if !cart.totals_consistent() {
        // Displayed as the server sent it; the mismatch is only logged.
        warn!(
            subtotal = %cart.totals.subtotal,
            total = %cart.totals.total,
            recomputed = %cart.recomputed_totals().total,
            "cart totals do not add up"
        );
    }
    store.set_cart(cart.clone());
    Ok(cart)
}

async fn refetch_coupons(
    client: &MarketplaceClient,
    store: &DataStore,
    course_id: &EntityId,
) -> Result<Vec<Coupon>, CoreError> {
    let coupons: Vec<Coupon> = client
        .list_coupons(&course_id.to_string())
        .await?
        .into_iter()
        .map(Coupon::from)
        .collect();
    store.replace_coupons(course_id, coupons.clone());
    Ok(coupons)
}

async fn refetch_users(client: &MarketplaceClient, store: &DataStore) -> Result<(), CoreError> {
    let users: Vec<User> = client
        .list_users(&UserQuery::default())
        .await?
        .into_iter()
        .map(User::from)
        .collect();
    store.replace_users(users);
    Ok(())
}

async fn current_role(
    client: &MarketplaceClient,
    store: &DataStore,
    id: &EntityId,
) -> Result<Role, CoreError> {
    if let Some(user) = store.user_by_id(id) {
        return Ok(user.role());
    }
    let user = User::from(client.get_user(&id.to_string()).await?);
    let role = user.role();
    store.upsert_user(user);
    Ok(role)
}

// ── Helpers ──────────────────────────────────────────────────────

/// Server total in minor units. An empty or zero-total cart has nothing
/// to charge.
fn checkout_amount(cart: &Cart) -> Result<i64, CoreError> {
    let nothing_to_pay = |reason: &str| {
        CoreError::validation(vec![ValidationError {
            field: "cart",
            reason: reason.to_owned(),
        }])
    };
    if cart.is_empty() {
        return Err(nothing_to_pay("is empty"));
    }
    if cart.totals.total <= Decimal::ZERO {
        return Err(nothing_to_pay("total is zero, nothing to charge"));
    }
    (cart.totals.total * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| CoreError::Internal(format!("cart total {} out of range", cart.totals.total)))
}

fn build_transport(config: &SessionConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        ..TransportConfig::default()
    }
    .with_timeout(config.timeout)
}
