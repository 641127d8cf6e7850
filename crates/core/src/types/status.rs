//! Closed-set enums stored as text: order status, payment method and
//! product category.
//!
//! Each enum keeps its wire name (the exact string stored in the database and
//! sent over JSON) in one `as_str` match, and `FromStr` is the inverse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted value is not part of a closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Implements `Display`, `FromStr` and (with `postgres`) text-column `sqlx`
/// support for an enum that has `as_str` and `ALL`.
macro_rules! text_enum {
    ($name:ident, $kind:literal) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_owned(),
                    })
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<Self>()?)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

// =============================================================================
// Order status
// =============================================================================

/// Where an order is in fulfillment.
///
/// The variants are declared in lifecycle order, so the derived `Ord` is the
/// forward order `Pending < Processing < Shipped < OutForDelivery < Delivered`.
/// This system only ever creates orders as `Pending`; fulfillment advances
/// them out of band.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl OrderStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Wire name, as stored in `orders.status`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
        }
    }

    /// The progress step this status displays as.
    ///
    /// `Pending` has no stage of its own and shows as `Processing`.
    #[must_use]
    pub const fn current_step(self) -> ProgressStep {
        match self {
            Self::Pending | Self::Processing => ProgressStep::Processing,
            Self::Shipped => ProgressStep::Shipped,
            Self::OutForDelivery => ProgressStep::OutForDelivery,
            Self::Delivered => ProgressStep::Delivered,
        }
    }

    /// The four tracking steps with their display state for this status.
    #[must_use]
    pub fn progress(self) -> [StepProgress; 4] {
        let current = self.current_step();
        ProgressStep::ALL.map(|step| StepProgress {
            step,
            state: match step.cmp(&current) {
                std::cmp::Ordering::Less => StepState::Completed,
                std::cmp::Ordering::Equal => StepState::Current,
                std::cmp::Ordering::Greater => StepState::Upcoming,
            },
        })
    }
}

text_enum!(OrderStatus, "order status");

/// A visual stage on the order tracking page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProgressStep {
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl ProgressStep {
    /// Steps in display order.
    pub const ALL: [Self; 4] = [
        Self::Processing,
        Self::Shipped,
        Self::OutForDelivery,
        Self::Delivered,
    ];
}

/// How a step renders relative to the order's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Upcoming,
}

/// One step of the tracking display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub step: ProgressStep,
    pub state: StepState,
}

// =============================================================================
// Payment method
// =============================================================================

/// How the customer will pay. Payment itself happens off-band; the method
/// only selects which instructions the customer is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Bitcoin,
}

impl PaymentMethod {
    pub const ALL: [Self; 2] = [Self::BankTransfer, Self::Bitcoin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::Bitcoin => "bitcoin",
        }
    }
}

text_enum!(PaymentMethod, "payment method");

// =============================================================================
// Category
// =============================================================================

/// Product category. The catalog uses this fixed set only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Pantry")]
    Pantry,
    #[serde(rename = "Household")]
    Household,
    #[serde(rename = "Personal Care")]
    PersonalCare,
    #[serde(rename = "Garden")]
    Garden,
}

impl Category {
    pub const ALL: [Self; 4] = [
        Self::Pantry,
        Self::Household,
        Self::PersonalCare,
        Self::Garden,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pantry => "Pantry",
            Self::Household => "Household",
            Self::PersonalCare => "Personal Care",
            Self::Garden => "Garden",
        }
    }

    /// Storefront page path for this category, e.g. `/category/Personal%20Care`.
    #[must_use]
    pub fn page_path(self) -> String {
        format!("/category/{}", self.as_str().replace(' ', "%20"))
    }
}

text_enum!(Category, "category");

#[cfg(test)]
mod tests {
    use super::*;

    fn states(status: OrderStatus) -> Vec<StepState> {
        status.progress().iter().map(|p| p.state).collect()
    }

    #[test]
    fn test_status_total_order() {
        assert!(OrderStatus::Pending < OrderStatus::Processing);
        assert!(OrderStatus::Processing < OrderStatus::Shipped);
        assert!(OrderStatus::Shipped < OrderStatus::OutForDelivery);
        assert!(OrderStatus::OutForDelivery < OrderStatus::Delivered);
        let mut sorted = OrderStatus::ALL;
        sorted.sort();
        assert_eq!(sorted, OrderStatus::ALL);
    }

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(OrderStatus::default().as_str(), "pending");
    }

    #[test]
    fn test_status_wire_names() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
            let json = serde_json::to_string(&status).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_pending_and_processing_show_first_step_current() {
        use StepState::{Current, Upcoming};
        assert_eq!(
            states(OrderStatus::Pending),
            vec![Current, Upcoming, Upcoming, Upcoming]
        );
        assert_eq!(
            states(OrderStatus::Processing),
            vec![Current, Upcoming, Upcoming, Upcoming]
        );
    }

    #[test]
    fn test_intermediate_progress() {
        use StepState::{Completed, Current, Upcoming};
        assert_eq!(
            states(OrderStatus::Shipped),
            vec![Completed, Current, Upcoming, Upcoming]
        );
        assert_eq!(
            states(OrderStatus::OutForDelivery),
            vec![Completed, Completed, Current, Upcoming]
        );
    }

    #[test]
    fn test_delivered_has_no_upcoming_steps() {
        use StepState::{Completed, Current};
        let delivered = states(OrderStatus::Delivered);
        assert_eq!(delivered, vec![Completed, Completed, Completed, Current]);
        assert!(!delivered.contains(&StepState::Upcoming));
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("bitcoin".parse(), Ok(PaymentMethod::Bitcoin));
        assert_eq!("bank_transfer".parse(), Ok(PaymentMethod::BankTransfer));
        let err = "card".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.to_string(), "invalid payment method: card");
    }

    #[test]
    fn test_category_page_path() {
        assert_eq!(Category::PersonalCare.page_path(), "/category/Personal%20Care");
        assert_eq!(Category::Garden.page_path(), "/category/Garden");
        assert_eq!("Personal Care".parse(), Ok(Category::PersonalCare));
    }
}
