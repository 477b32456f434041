// ── Applying fetched data ──
//
// Every read replaces the slice it fetched. Collections use
// upsert-then-prune so a re-fetch never passes through an empty state.

use std::sync::Arc;

use chrono::Utc;

use super::DataStore;
use super::data_store::coupon_scope;
use crate::model::{Cart, Coupon, Course, Enrollment, EntityId, User};

impl DataStore {
    fn touch(&self) {
        self.last_refresh.send_replace(Some(Utc::now()));
    }

    pub(crate) fn replace_courses(&self, courses: Vec<Course>) {
        self.courses.replace_where(
            courses
                .into_iter()
                .map(|c| (format!("course:{}", c.id), c.id.clone(), c))
                .collect(),
            |_| true,
        );
        self.touch();
    }

    pub(crate) fn upsert_course(&self, course: Course) {
        self.courses
            .upsert(format!("course:{}", course.id), course.id.clone(), course);
    }

    /// Replace the coupons of one course, leaving other courses untouched.
    pub(crate) fn replace_coupons(&self, course_id: &EntityId, coupons: Vec<Coupon>) {
        let scope = coupon_scope(course_id);
        self.coupons.replace_where(
            coupons
                .into_iter()
                .map(|c| (format!("{scope}{}", c.id), c.id.clone(), c))
                .collect(),
            |key| key.starts_with(&scope),
        );
        self.touch();
    }

    pub(crate) fn replace_users(&self, users: Vec<User>) {
        self.users.replace_where(
            users
                .into_iter()
                .map(|u| (format!("user:{}", u.id), u.id.clone(), u))
                .collect(),
            |_| true,
        );
        self.touch();
    }

    pub(crate) fn upsert_user(&self, user: User) {
        self.users
            .upsert(format!("user:{}", user.id), user.id.clone(), user);
    }

    pub(crate) fn replace_enrollments(&self, enrollments: Vec<Enrollment>) {
        self.enrollments.replace_where(
            enrollments
                .into_iter()
                .map(|e| (format!("enrollment:{}", e.id), e.id.clone(), e))
                .collect(),
            |_| true,
        );
        self.touch();
    }

    pub(crate) fn set_cart(&self, cart: Cart) {
        self.cart.send_replace(Some(Arc::new(cart)));
        self.touch();
    }

    pub(crate) fn set_current_user(&self, user: Option<User>) {
        self.current_user.send_replace(user.map(Arc::new));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::RoleProfile;
    use chrono::TimeDelta;

    fn coupon(id: &str) -> Coupon {
        Coupon {
            id: EntityId::from(id),
            code: id.to_uppercase(),
            discount_percentage: 10,
            max_uses: 5,
            used_count: 0,
            expiry: Utc::now() + TimeDelta::days(10),
            course_id: None,
            created_at: None,
        }
    }

    fn user(id: &str) -> User {
        User {
            id: EntityId::from(id),
            name: id.into(),
            email: format!("{id}@example.com"),
            active: true,
            profile: RoleProfile::Admin,
            avatar: None,
            created_at: None,
        }
    }

    #[test]
    fn coupons_are_scoped_per_course() {
        let store = DataStore::new();
        let c1 = EntityId::from("c1");
        let c2 = EntityId::from("c2");
        store.replace_coupons(&c1, vec![coupon("k1"), coupon("k2")]);
        store.replace_coupons(&c2, vec![coupon("k3")]);
        store.replace_coupons(&c1, vec![coupon("k2")]);

        let ids: Vec<String> = store
            .coupons_for_course(&c1)
            .iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(ids, ["k2"]);
        assert_eq!(store.coupons_for_course(&c2).len(), 1);
        assert_eq!(store.coupon_count(), 2);
        assert!(store.last_refresh().is_some());
    }

    #[test]
    fn replacing_users_prunes_deleted_accounts() {
        let store = DataStore::new();
        store.replace_users(vec![user("a"), user("b")]);
        store.replace_users(vec![user("b")]);
        assert_eq!(store.user_count(), 1);
        assert!(store.user_by_id(&EntityId::from("a")).is_none());
    }

    #[test]
    fn coupon_subscribers_see_the_refetched_list() {
        let store = DataStore::new();
        let mut rx = store.subscribe_coupons();
        store.replace_coupons(&EntityId::from("c1"), vec![coupon("k1")]);
        tokio_test::block_on(async {
            rx.changed().await.unwrap();
        });
        assert_eq!(rx.borrow().len(), 1);
    }

    #[test]
    fn cart_slot_notifies_subscribers() {
        let store = DataStore::new();
        let mut rx = store.subscribe_cart();
        store.set_cart(Cart::default());
        tokio_test::block_on(async {
            rx.changed().await.unwrap();
        });
        assert!(rx.borrow().as_ref().unwrap().is_empty());
    }
}
