// ── Session data store ──
//
// Thread-safe storage for everything a session has fetched. Collections
// are keyed maps with snapshot channels; the cart and the signed-in user
// are single-value `watch` slots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{Cart, Coupon, Course, Enrollment, EntityId, User};

pub struct DataStore {
    pub(crate) courses: EntityCollection<Course>,
    pub(crate) coupons: EntityCollection<Coupon>,
    pub(crate) users: EntityCollection<User>,
    pub(crate) enrollments: EntityCollection<Enrollment>,
    pub(crate) cart: watch::Sender<Option<Arc<Cart>>>,
    pub(crate) current_user: watch::Sender<Option<Arc<User>>>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (cart, _) = watch::channel(None);
        let (current_user, _) = watch::channel(None);
        let (last_refresh, _) = watch::channel(None);

        Self {
            courses: EntityCollection::new(),
            coupons: EntityCollection::new(),
            users: EntityCollection::new(),
            enrollments: EntityCollection::new(),
            cart,
            current_user,
            last_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn courses_snapshot(&self) -> Arc<Vec<Arc<Course>>> {
        self.courses.snapshot()
    }

    pub fn coupons_snapshot(&self) -> Arc<Vec<Arc<Coupon>>> {
        self.coupons.snapshot()
    }

    pub fn users_snapshot(&self) -> Arc<Vec<Arc<User>>> {
        self.users.snapshot()
    }

    pub fn enrollments_snapshot(&self) -> Arc<Vec<Arc<Enrollment>>> {
        self.enrollments.snapshot()
    }

    /// Coupons last fetched for one course.
    pub fn coupons_for_course(&self, course_id: &EntityId) -> Vec<Arc<Coupon>> {
        let prefix = coupon_scope(course_id);
        self.coupons
            .snapshot()
            .iter()
            .filter(|c| {
                self.coupons
                    .key_for(&c.id)
                    .is_some_and(|k| k.starts_with(&prefix))
            })
            .cloned()
            .collect()
    }

    /// The cart as the server last reported it.
    pub fn cart(&self) -> Option<Arc<Cart>> {
        self.cart.borrow().clone()
    }

    pub fn current_user(&self) -> Option<Arc<User>> {
        self.current_user.borrow().clone()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn user_by_id(&self, id: &EntityId) -> Option<Arc<User>> {
        self.users.get_by_id(id)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_cart(&self) -> watch::Receiver<Option<Arc<Cart>>> {
        self.cart.subscribe()
    }

    pub fn subscribe_coupons(&self) -> watch::Receiver<Arc<Vec<Arc<Coupon>>>> {
        self.coupons.subscribe()
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn coupon_count(&self) -> usize {
        self.coupons.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

pub(super) fn coupon_scope(course_id: &EntityId) -> String {
    format!("{course_id}:")
}
