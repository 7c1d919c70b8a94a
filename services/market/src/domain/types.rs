use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use agora_domain::pagination::Sort;
use agora_domain::role::{RequestedRole, Role};

/// User account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub verified: bool,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// A product listed by a wholesaler or retailer.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub stock: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A consumer's cart. One per user; survives checkout empty.
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product in a cart.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
}

/// A cart line joined with the current product price — the unit checkout
/// snapshots from.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl PricedLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Order total at checkout: Σ(price × quantity) over the cart's lines.
pub fn order_total(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(PricedLine::subtotal).sum()
}

/// Order lifecycle status. The only mutable order field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn from_str_value(v: &str) -> Option<Self> {
        match v {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Immutable order snapshot.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One line of an order. `unit_price` is copied from the product at checkout
/// and never updated.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Shipment attached to an order.
#[derive(Debug, Clone)]
pub struct Shipment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Upgrade request status. Pending is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeStatus {
    Pending,
    Approved,
    Rejected,
}

impl UpgradeStatus {
    pub fn from_str_value(v: &str) -> Option<Self> {
        match v {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A user's request to be upgraded to a trading role.
#[derive(Debug, Clone)]
pub struct UpgradeRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub requested_role: RequestedRole,
    pub business_name: Option<String>,
    pub status: UpgradeStatus,
    pub admin_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The two terminal decisions an admin can make on an upgrade request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn resulting_status(self) -> UpgradeStatus {
        match self {
            Self::Approve => UpgradeStatus::Approved,
            Self::Reject => UpgradeStatus::Rejected,
        }
    }
}

/// Sort options for product list queries.
#[derive(Debug, Clone, Copy)]
pub enum ProductSortBy {
    CreatedAt(Sort),
    Price(Sort),
}

impl Default for ProductSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl ProductSortBy {
    /// Parse the `sort-by` query value (`created-at`, `-created-at`, `price`,
    /// `-price`; leading `-` means descending).
    pub fn from_query(v: &str) -> Option<Self> {
        match v {
            "created-at" => Some(Self::CreatedAt(Sort::Asc)),
            "-created-at" => Some(Self::CreatedAt(Sort::Desc)),
            "price" => Some(Self::Price(Sort::Asc)),
            "-price" => Some(Self::Price(Sort::Desc)),
            _ => None,
        }
    }
}

/// Filters for product list queries.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Substring match on name or description.
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn should_total_priced_lines() {
        let lines = vec![
            PricedLine {
                product_id: Uuid::new_v4(),
                quantity: 2,
                unit_price: dec("10.00"),
            },
            PricedLine {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: dec("5.00"),
            },
        ];
        assert_eq!(order_total(&lines), dec("25.00"));
    }

    #[test]
    fn should_total_empty_lines_to_zero() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn should_keep_decimal_precision_in_subtotals() {
        let line = PricedLine {
            product_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: dec("19.99"),
        };
        assert_eq!(line.subtotal(), dec("59.97"));
    }

    #[test]
    fn should_round_trip_order_status() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str_value(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_str_value("refunded"), None);
    }

    #[test]
    fn should_mark_only_pending_as_non_terminal() {
        assert!(!UpgradeStatus::Pending.is_terminal());
        assert!(UpgradeStatus::Approved.is_terminal());
        assert!(UpgradeStatus::Rejected.is_terminal());
    }

    #[test]
    fn should_parse_product_sort_keys() {
        assert!(matches!(
            ProductSortBy::from_query("-price"),
            Some(ProductSortBy::Price(Sort::Desc))
        ));
        assert!(matches!(
            ProductSortBy::from_query("created-at"),
            Some(ProductSortBy::CreatedAt(Sort::Asc))
        ));
        assert!(ProductSortBy::from_query("name").is_none());
    }
}
