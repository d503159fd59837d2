//! In-process store implementing both repository ports.
//!
//! Used when no database is configured and by tests. It applies the same
//! aggregate rules as the Diesel adapters: saving a user reconciles its
//! orders (orphans are deleted) and deleting a user cascades to its orders.
//! Keys are issued from monotonically increasing counters starting at 1 and
//! `find_all` returns rows in key order.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    OrderPersistenceError, OrderRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{Order, OrderId, User, UserId};

#[derive(Debug, Clone)]
struct UserRecord {
    name: String,
    email: String,
}

#[derive(Debug, Clone)]
struct OrderRecord {
    product: String,
    amount: Option<f64>,
    status: Option<String>,
    user_id: i64,
}

impl OrderRecord {
    fn from_order(order: &Order, user_id: i64) -> Self {
        Self {
            product: order.product().to_owned(),
            amount: order.amount(),
            status: order.status().map(str::to_owned),
            user_id,
        }
    }

    fn to_order(&self, id: i64) -> Order {
        Order::from_parts(
            OrderId::new(id),
            self.product.clone(),
            self.amount,
            self.status.clone(),
            UserId::new(self.user_id),
        )
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, UserRecord>,
    orders: BTreeMap<i64, OrderRecord>,
    last_user_id: i64,
    last_order_id: i64,
}

impl MemoryState {
    fn next_user_id(&mut self) -> i64 {
        self.last_user_id += 1;
        self.last_user_id
    }

    fn next_order_id(&mut self) -> i64 {
        self.last_order_id += 1;
        self.last_order_id
    }

    fn user(&self, id: i64) -> Option<User> {
        let record = self.users.get(&id)?;
        let orders = self
            .orders
            .iter()
            .filter(|(_, order)| order.user_id == id)
            .map(|(order_id, order)| order.to_order(*order_id))
            .collect();
        Some(User::from_parts(
            UserId::new(id),
            record.name.clone(),
            record.email.clone(),
            orders,
        ))
    }

    /// Reject the save before anything is written: the user row must exist
    /// when keyed and every keyed order must already belong to it.
    fn check_writable(&self, user: &User) -> Result<(), UserPersistenceError> {
        let owner = match user.id() {
            Some(id) if !self.users.contains_key(&id.get()) => {
                return Err(UserPersistenceError::missing(id.get()));
            }
            id => id.map(UserId::get),
        };
        for order_id in user.orders().iter().filter_map(Order::id) {
            let owned = self
                .orders
                .get(&order_id.get())
                .is_some_and(|record| Some(record.user_id) == owner);
            if !owned {
                return Err(UserPersistenceError::order_missing(order_id.get()));
            }
        }
        Ok(())
    }

    fn write_user(&mut self, user: &User) -> i64 {
        let record = UserRecord {
            name: user.name().to_owned(),
            email: user.email().to_owned(),
        };
        let id = user.id().map_or_else(|| self.next_user_id(), UserId::get);
        self.users.insert(id, record);
        id
    }

    fn sync_orders(&mut self, user: &User, user_id: i64) {
        let mut kept = BTreeSet::new();
        for order in user.orders() {
            let record = OrderRecord::from_order(order, user_id);
            match order.id() {
                None => {
                    let id = self.next_order_id();
                    self.orders.insert(id, record);
                    kept.insert(id);
                }
                Some(id) => {
                    if let Some(slot) = self.orders.get_mut(&id.get()) {
                        *slot = record;
                    }
                    kept.insert(id.get());
                }
            }
        }
        let before = self.orders.len();
        self.orders
            .retain(|id, order| order.user_id != user_id || kept.contains(id));
        let removed = before - self.orders.len();
        if removed > 0 {
            debug!(user_id, removed, "deleted orphaned orders");
        }
    }
}

/// Thread-safe in-memory implementation of [`UserRepository`] and
/// [`OrderRepository`].
///
/// # Examples
/// ```
/// use orders_api::domain::User;
/// use orders_api::domain::ports::UserRepository;
/// use orders_api::outbound::memory::InMemoryStore;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryStore::new();
/// let saved = store
///     .save(&User::new("John Doe", "john.doe@example.com"))
///     .await
///     .expect("saved");
/// assert_eq!(saved.id().map(|id| id.get()), Some(1));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // Every write completes before the guard drops, so poisoned state is consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock();
        Ok(state
            .users
            .keys()
            .filter_map(|id| state.user(*id))
            .collect())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().user(id.get()))
    }

    async fn exists_by_id(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.lock().users.contains_key(&id.get()))
    }

    async fn save(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut state = self.lock();
        state.check_writable(user)?;
        let user_id = state.write_user(user);
        state.sync_orders(user, user_id);
        state
            .user(user_id)
            .ok_or_else(|| UserPersistenceError::missing(user_id))
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let raw = id.get();
        let mut state = self.lock();
        state.orders.retain(|_, order| order.user_id != raw);
        state.users.remove(&raw);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Order>, OrderPersistenceError> {
        Ok(self
            .lock()
            .orders
            .iter()
            .map(|(id, order)| order.to_order(*id))
            .collect())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderPersistenceError> {
        Ok(self
            .lock()
            .orders
            .get(&id.get())
            .map(|order| order.to_order(id.get())))
    }

    async fn exists_by_id(&self, id: OrderId) -> Result<bool, OrderPersistenceError> {
        Ok(self.lock().orders.contains_key(&id.get()))
    }

    async fn save(&self, order: &Order) -> Result<Order, OrderPersistenceError> {
        let user_id = order
            .user_id()
            .map(UserId::get)
            .ok_or_else(|| OrderPersistenceError::owner_missing(0_i64))?;
        let mut state = self.lock();
        if !state.users.contains_key(&user_id) {
            return Err(OrderPersistenceError::owner_missing(user_id));
        }
        let record = OrderRecord::from_order(order, user_id);
        let id = match order.id() {
            None => state.next_order_id(),
            Some(id) if state.orders.contains_key(&id.get()) => id.get(),
            Some(id) => return Err(OrderPersistenceError::missing(id.get())),
        };
        let saved = record.to_order(id);
        state.orders.insert(id, record);
        Ok(saved)
    }

    async fn delete_by_id(&self, id: OrderId) -> Result<(), OrderPersistenceError> {
        self.lock().orders.remove(&id.get());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryStore {
        InMemoryStore::new()
    }

    async fn user_with_order(store: &InMemoryStore) -> User {
        let mut user = UserRepository::save(store, &User::new("John Doe", "john.doe@example.com"))
            .await
            .expect("user saved");
        user.add_order(Order::new("Product A", Some(100.0), Some("pending".into())));
        UserRepository::save(store, &user).await.expect("order saved")
    }

    #[rstest]
    #[tokio::test]
    async fn save_assigns_sequential_ids(store: InMemoryStore) {
        let first = UserRepository::save(&store, &User::new("A", "a@example.com"))
            .await
            .expect("first");
        let second = UserRepository::save(&store, &User::new("B", "b@example.com"))
            .await
            .expect("second");
        assert_eq!(first.id(), Some(UserId::new(1)));
        assert_eq!(second.id(), Some(UserId::new(2)));

        let all = UserRepository::find_all(&store).await.expect("list");
        let names: Vec<_> = all.iter().map(User::name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[rstest]
    #[tokio::test]
    async fn save_inserts_new_orders_with_back_reference(store: InMemoryStore) {
        let user = user_with_order(&store).await;
        let order = &user.orders()[0];
        assert_eq!(order.id(), Some(OrderId::new(1)));
        assert_eq!(order.user_id(), user.id());
    }

    #[rstest]
    #[tokio::test]
    async fn saving_unknown_id_reports_missing(store: InMemoryStore) {
        let ghost = User::from_parts(UserId::new(9), "G".into(), "g@example.com".into(), vec![]);
        let error = UserRepository::save(&store, &ghost)
            .await
            .expect_err("missing row");
        assert_eq!(error, UserPersistenceError::missing(9_i64));
    }

    #[rstest]
    #[tokio::test]
    async fn saving_another_users_order_is_rejected(store: InMemoryStore) {
        let owner = user_with_order(&store).await;
        let foreign = owner.orders()[0].clone();
        let order_id = foreign.id().expect("persisted");
        let mut intruder = UserRepository::save(&store, &User::new("Eve", "eve@example.com"))
            .await
            .expect("intruder saved");
        intruder.set_name("Mallory");
        intruder.add_order(Order::from_parts(
            order_id,
            "Stolen".to_owned(),
            None,
            None,
            UserId::new(0),
        ));

        let error = UserRepository::save(&store, &intruder)
            .await
            .expect_err("foreign order");

        assert_eq!(error, UserPersistenceError::order_missing(order_id.get()));
        let order = OrderRepository::find_by_id(&store, order_id)
            .await
            .expect("lookup")
            .expect("order kept");
        assert_eq!(order, foreign);
        let intruder_id = intruder.id().expect("persisted");
        let stored = UserRepository::find_by_id(&store, intruder_id)
            .await
            .expect("lookup")
            .expect("intruder kept");
        assert_eq!(stored.name(), "Eve");
    }

    #[rstest]
    #[tokio::test]
    async fn saving_unknown_order_id_is_rejected(store: InMemoryStore) {
        let mut user = User::new("Ann", "ann@example.com");
        user.add_order(Order::from_parts(
            OrderId::new(77),
            "Lamp".to_owned(),
            None,
            None,
            UserId::new(1),
        ));

        let error = UserRepository::save(&store, &user)
            .await
            .expect_err("unknown order");

        assert_eq!(error, UserPersistenceError::order_missing(77_i64));
        assert!(UserRepository::find_all(&store).await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn delete_cascades_to_orders(store: InMemoryStore) {
        let user = user_with_order(&store).await;
        let user_id = user.id().expect("persisted");
        let order_id = user.orders()[0].id().expect("persisted");

        UserRepository::delete_by_id(&store, user_id)
            .await
            .expect("deleted");

        assert!(!UserRepository::exists_by_id(&store, user_id).await.expect("exists"));
        let order = OrderRepository::find_by_id(&store, order_id)
            .await
            .expect("lookup");
        assert!(order.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn removed_orders_are_deleted_on_save(store: InMemoryStore) {
        let mut user = user_with_order(&store).await;
        let order_id = user.orders()[0].id().expect("persisted");
        user.remove_order(order_id);

        let saved = UserRepository::save(&store, &user).await.expect("saved");

        assert!(saved.orders().is_empty());
        assert!(!OrderRepository::exists_by_id(&store, order_id).await.expect("exists"));
    }

    #[rstest]
    #[tokio::test]
    async fn profile_update_keeps_orders(store: InMemoryStore) {
        let mut user = user_with_order(&store).await;
        user.set_name("Jane Doe");

        let saved = UserRepository::save(&store, &user).await.expect("saved");

        assert_eq!(saved.name(), "Jane Doe");
        assert_eq!(saved.orders().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn order_save_requires_existing_owner(store: InMemoryStore) {
        let unattached = Order::new("Lamp", None, None);
        let error = OrderRepository::save(&store, &unattached)
            .await
            .expect_err("no owner");
        assert_eq!(error, OrderPersistenceError::owner_missing(0_i64));

        let mut dangling = Order::new("Lamp", None, None);
        dangling.set_user_id(Some(UserId::new(5)));
        let error = OrderRepository::save(&store, &dangling)
            .await
            .expect_err("owner missing");
        assert_eq!(error, OrderPersistenceError::owner_missing(5_i64));
    }

    #[rstest]
    #[tokio::test]
    async fn order_save_updates_in_place(store: InMemoryStore) {
        let user = user_with_order(&store).await;
        let mut order = user.orders()[0].clone();
        order.set_status(None);
        order.set_amount(Some(5.0));

        let saved = OrderRepository::save(&store, &order).await.expect("saved");

        assert_eq!(saved.id(), order.id());
        assert_eq!(saved.status(), None);
        let all = OrderRepository::find_all(&store).await.expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount(), Some(5.0));
    }
}
