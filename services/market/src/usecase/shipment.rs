use chrono::{DateTime, Utc};
use uuid::Uuid;

use agora_domain::access::{Method, ResourceKind};
use agora_domain::actor::Actor;
use agora_domain::pagination::PageRequest;
use agora_domain::visibility::{self, ShipmentVisibility};

use crate::domain::repository::{OrderRepository, ShipmentChanges, ShipmentRepository};
use crate::domain::types::Shipment;
use crate::error::MarketServiceError;
use crate::usecase::{ensure_admin, ensure_allowed};

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateShipmentInput {
    pub order_id: Uuid,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

pub struct CreateShipmentUseCase<S: ShipmentRepository, O: OrderRepository> {
    pub shipments: S,
    pub orders: O,
}

impl<S: ShipmentRepository, O: OrderRepository> CreateShipmentUseCase<S, O> {
    /// A consumer attaches a shipment (the delivery address) to one of their
    /// own orders; an admin may do so for any order. One shipment per order.
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateShipmentInput,
    ) -> Result<Shipment, MarketServiceError> {
        ensure_allowed(actor, Method::Post, ResourceKind::Shipments)?;
        if input.address.trim().is_empty()
            || input.city.trim().is_empty()
            || input.postal_code.trim().is_empty()
        {
            return Err(MarketServiceError::MissingData);
        }
        let order = self
            .orders
            .find_in_scope(visibility::orders(actor), input.order_id)
            .await?
            .ok_or(MarketServiceError::OrderNotFound)?;
        let shipment = Shipment {
            id: Uuid::now_v7(),
            order_id: order.id,
            address: input.address,
            city: input.city,
            state: input.state,
            postal_code: input.postal_code,
            tracking_number: None,
            shipped_at: None,
            delivered_at: None,
        };
        self.shipments.create(&shipment).await?;
        Ok(shipment)
    }
}

// ── List / Get ───────────────────────────────────────────────────────────────

pub struct ListShipmentsUseCase<S: ShipmentRepository> {
    pub shipments: S,
}

impl<S: ShipmentRepository> ListShipmentsUseCase<S> {
    pub async fn execute(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Vec<Shipment>, MarketServiceError> {
        self.shipments.list(visibility::shipments(actor), page).await
    }
}

pub struct GetShipmentUseCase<S: ShipmentRepository> {
    pub shipments: S,
}

impl<S: ShipmentRepository> GetShipmentUseCase<S> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> Result<Shipment, MarketServiceError> {
        self.shipments
            .find_in_scope(visibility::shipments(actor), id)
            .await?
            .ok_or(MarketServiceError::ShipmentNotFound)
    }
}

// ── Fulfillment update ───────────────────────────────────────────────────────

pub struct UpdateShipmentInput {
    pub tracking_number: Option<String>,
    pub mark_shipped: bool,
    pub mark_delivered: bool,
}

pub struct UpdateShipmentUseCase<S: ShipmentRepository> {
    pub shipments: S,
}

impl<S: ShipmentRepository> UpdateShipmentUseCase<S> {
    /// Admin fulfillment updates. A shipment can only be delivered once it
    /// has been shipped (in this call or an earlier one).
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateShipmentInput,
    ) -> Result<Shipment, MarketServiceError> {
        ensure_admin(actor)?;
        if input.tracking_number.is_none() && !input.mark_shipped && !input.mark_delivered {
            return Err(MarketServiceError::MissingData);
        }
        let mut shipment = self
            .shipments
            .find_in_scope(ShipmentVisibility::Everything, id)
            .await?
            .ok_or(MarketServiceError::ShipmentNotFound)?;

        let now = Utc::now();
        let shipped_at: Option<DateTime<Utc>> = if input.mark_shipped {
            Some(shipment.shipped_at.unwrap_or(now))
        } else {
            None
        };
        if input.mark_delivered && shipment.shipped_at.is_none() && shipped_at.is_none() {
            return Err(MarketServiceError::NotShipped);
        }
        let delivered_at = if input.mark_delivered { Some(now) } else { None };

        let changes = ShipmentChanges {
            tracking_number: input.tracking_number,
            shipped_at,
            delivered_at,
        };
        self.shipments.update(shipment.id, changes.clone()).await?;

        if let Some(tracking_number) = changes.tracking_number {
            shipment.tracking_number = Some(tracking_number);
        }
        if let Some(shipped_at) = changes.shipped_at {
            shipment.shipped_at = Some(shipped_at);
        }
        if let Some(delivered_at) = changes.delivered_at {
            shipment.delivered_at = Some(delivered_at);
        }
        Ok(shipment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use rust_decimal::Decimal;

    use agora_domain::role::Role;
    use agora_domain::visibility::OrderVisibility;

    use crate::domain::types::{Order, OrderLine, OrderStatus};

    struct MockShipmentRepo {
        shipment: Option<Shipment>,
        created: Mutex<Option<Shipment>>,
        updates: Mutex<Vec<ShipmentChanges>>,
        create_result_conflict: bool,
    }

    impl MockShipmentRepo {
        fn new(shipment: Option<Shipment>) -> Self {
            Self {
                shipment,
                created: Mutex::new(None),
                updates: Mutex::new(Vec::new()),
                create_result_conflict: false,
            }
        }
    }

    impl ShipmentRepository for MockShipmentRepo {
        async fn create(&self, shipment: &Shipment) -> Result<(), MarketServiceError> {
            if self.create_result_conflict {
                return Err(MarketServiceError::ShipmentExists);
            }
            *self.created.lock().unwrap() = Some(shipment.clone());
            Ok(())
        }
        async fn list(
            &self,
            _scope: ShipmentVisibility,
            _page: PageRequest,
        ) -> Result<Vec<Shipment>, MarketServiceError> {
            Ok(Vec::new())
        }
        async fn find_in_scope(
            &self,
            _scope: ShipmentVisibility,
            _id: Uuid,
        ) -> Result<Option<Shipment>, MarketServiceError> {
            Ok(self.shipment.clone())
        }
        async fn update(
            &self,
            _id: Uuid,
            changes: ShipmentChanges,
        ) -> Result<(), MarketServiceError> {
            self.updates.lock().unwrap().push(changes);
            Ok(())
        }
    }

    struct MockOrderRepo {
        order: Option<Order>,
    }

    impl OrderRepository for MockOrderRepo {
        async fn checkout(&self, _user_id: Uuid) -> Result<Order, MarketServiceError> {
            Err(MarketServiceError::EmptyCart)
        }
        async fn list(
            &self,
            _scope: OrderVisibility,
            _page: PageRequest,
        ) -> Result<Vec<Order>, MarketServiceError> {
            Ok(Vec::new())
        }
        async fn find_in_scope(
            &self,
            _scope: OrderVisibility,
            _id: Uuid,
        ) -> Result<Option<Order>, MarketServiceError> {
            Ok(self.order.clone())
        }
        async fn lines(&self, _order_id: Uuid) -> Result<Vec<OrderLine>, MarketServiceError> {
            Ok(Vec::new())
        }
        async fn update_status(
            &self,
            _id: Uuid,
            _status: OrderStatus,
        ) -> Result<(), MarketServiceError> {
            Ok(())
        }
    }

    fn some_order(user_id: Uuid) -> Order {
        Order {
            id: Uuid::now_v7(),
            user_id,
            total: Decimal::new(2500, 2),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn some_shipment() -> Shipment {
        Shipment {
            id: Uuid::now_v7(),
            order_id: Uuid::new_v4(),
            address: "1 Main St".to_owned(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            postal_code: "62701".to_owned(),
            tracking_number: None,
            shipped_at: None,
            delivered_at: None,
        }
    }

    fn create_input(order_id: Uuid) -> CreateShipmentInput {
        CreateShipmentInput {
            order_id,
            address: "1 Main St".to_owned(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            postal_code: "62701".to_owned(),
        }
    }

    #[tokio::test]
    async fn should_create_shipment_for_own_order() {
        let consumer = Actor::known(Uuid::new_v4(), Role::Consumer, true);
        let order = some_order(consumer.user_id().unwrap());
        let usecase = CreateShipmentUseCase {
            shipments: MockShipmentRepo::new(None),
            orders: MockOrderRepo { order: Some(order) },
        };
        let shipment = usecase
            .execute(&consumer, create_input(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(shipment.shipped_at.is_none());
        assert!(usecase.shipments.created.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn should_hide_foreign_order_from_shipment_creation() {
        let consumer = Actor::known(Uuid::new_v4(), Role::Consumer, true);
        let usecase = CreateShipmentUseCase {
            shipments: MockShipmentRepo::new(None),
            orders: MockOrderRepo { order: None },
        };
        let err = usecase
            .execute(&consumer, create_input(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketServiceError::OrderNotFound));
    }

    #[tokio::test]
    async fn should_surface_duplicate_shipment_conflict() {
        let consumer = Actor::known(Uuid::new_v4(), Role::Consumer, true);
        let order = some_order(consumer.user_id().unwrap());
        let mut repo = MockShipmentRepo::new(None);
        repo.create_result_conflict = true;
        let usecase = CreateShipmentUseCase {
            shipments: repo,
            orders: MockOrderRepo { order: Some(order) },
        };
        let err = usecase
            .execute(&consumer, create_input(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketServiceError::ShipmentExists));
    }

    #[tokio::test]
    async fn should_reject_delivery_before_shipping() {
        let usecase = UpdateShipmentUseCase {
            shipments: MockShipmentRepo::new(Some(some_shipment())),
        };
        let admin = Actor::known(Uuid::new_v4(), Role::Admin, true);
        let err = usecase
            .execute(
                &admin,
                Uuid::new_v4(),
                UpdateShipmentInput {
                    tracking_number: None,
                    mark_shipped: false,
                    mark_delivered: true,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MarketServiceError::NotShipped));
        assert!(usecase.shipments.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_allow_ship_and_deliver_in_one_call() {
        let usecase = UpdateShipmentUseCase {
            shipments: MockShipmentRepo::new(Some(some_shipment())),
        };
        let admin = Actor::known(Uuid::new_v4(), Role::Admin, true);
        let shipment = usecase
            .execute(
                &admin,
                Uuid::new_v4(),
                UpdateShipmentInput {
                    tracking_number: Some("TRK-1".to_owned()),
                    mark_shipped: true,
                    mark_delivered: true,
                },
            )
            .await
            .unwrap();
        assert!(shipment.shipped_at.is_some());
        assert!(shipment.delivered_at.is_some());
        assert_eq!(shipment.tracking_number.as_deref(), Some("TRK-1"));
    }

    #[tokio::test]
    async fn should_forbid_fulfillment_updates_to_consumer() {
        let usecase = UpdateShipmentUseCase {
            shipments: MockShipmentRepo::new(Some(some_shipment())),
        };
        let consumer = Actor::known(Uuid::new_v4(), Role::Consumer, true);
        let err = usecase
            .execute(
                &consumer,
                Uuid::new_v4(),
                UpdateShipmentInput {
                    tracking_number: None,
                    mark_shipped: true,
                    mark_delivered: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MarketServiceError::Forbidden));
    }
}
