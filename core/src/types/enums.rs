//! Closed tag sets exchanged with the API.
//!
//! # Design
//! Every tag serializes as its variant name. Deserialization accepts the name
//! (case-insensitively) or the numeric code, since older API versions emitted
//! ordinals for some of these sets. The client never derives one tag from
//! another; transitions are requested through dedicated operations.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// A tag string that matches no variant of the target set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant, )+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )+
                }
            }

            pub fn code(&self) -> i64 {
                match self {
                    $( $name::$variant => $code, )+
                }
            }

            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct TagVisitor;

                impl<'de> Visitor<'de> for TagVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        f.write_str(concat!("a ", stringify!($name), " name or code"))
                    }

                    fn visit_str<E: de::Error>(self, v: &str) -> Result<$name, E> {
                        v.parse().map_err(E::custom)
                    }

                    fn visit_i64<E: de::Error>(self, v: i64) -> Result<$name, E> {
                        $name::from_code(v)
                            .ok_or_else(|| E::invalid_value(Unexpected::Signed(v), &self))
                    }

                    fn visit_u64<E: de::Error>(self, v: u64) -> Result<$name, E> {
                        i64::try_from(v)
                            .ok()
                            .and_then($name::from_code)
                            .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(v), &self))
                    }
                }

                deserializer.deserialize_any(TagVisitor)
            }
        }
    };
}

wire_enum! {
    /// Lifecycle state of a subscription. Owned by the server.
    pub enum SubscriptionState {
        /// Initiated in the hosted pages; no payment mode chosen yet.
        InitiatedCustomer = 0,
        /// Initiated from the back office; no payment mode chosen yet.
        InitiatedAgent = 1,
        /// Registered, starts with a delay.
        Delayed = 2,
        Running = 3,
        SuspendedCustomer = 4,
        SuspendedPaymentInfoMissing = 5,
        SuspendedPaymentDue = 6,
        SuspendedAgent = 7,
        SuspendedSystem = 8,
        /// Over, features stay accessible until the term.
        History = 9,
        Terminated = 10,
        TerminatedCustomer = 11,
        TerminatedAgent = 12,
        /// Over, features revoked.
        TerminatedRevokedCustomer = 13,
        TerminatedRevokedAgent = 14,
        Deleted = 15,
    }
}

wire_enum! {
    /// Classification of a billing ledger event.
    pub enum MoveType {
        None = 0,
        Billing = 100,
        BillingReport = 110,
        InvoiceCancelled = 120,
        SubscriptionRecurringAmount = 200,
        SubscriptionProrata = 210,
        SubscriptionUpFront = 220,
        SubscriptionTrial = 230,
        SubscriptionTermination = 240,
        SubscriptionRefundOnUpgrade = 290,
        SubscriptionChargeOnUpgrade = 295,
        FeatureProrata = 300,
        Feature = 320,
        /// Consumption feature.
        FeatureIndivisible = 340,
        /// Referral program.
        CustomerReferral = 600,
    }
}

wire_enum! {
    /// How a customer pays.
    pub enum PaymentType {
        Undefined = 0,
        ExternalCheck = 100,
        ExternalCash = 101,
        ExternalBank = 102,
        ExternalOther = 120,
        Card = 1000,
        /// SEPA.
        DirectDebit = 2000,
        Wallet = 3000,
    }
}

wire_enum! {
    /// Unit of a recurrence or trial duration.
    pub enum TimeUnit {
        Day = 0,
        Week = 1,
        Month = 2,
        Year = 3,
    }
}

wire_enum! {
    /// How a feature is gated or metered.
    pub enum FeatureType {
        OnOff = 0,
        Limitation = 1,
        Consumption = 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&SubscriptionState::SuspendedAgent).unwrap();
        assert_eq!(json, r#""SuspendedAgent""#);
        let json = serde_json::to_string(&MoveType::SubscriptionProrata).unwrap();
        assert_eq!(json, r#""SubscriptionProrata""#);
    }

    #[test]
    fn deserializes_from_name_or_code() {
        let state: SubscriptionState = serde_json::from_str(r#""Running""#).unwrap();
        assert_eq!(state, SubscriptionState::Running);
        let state: SubscriptionState = serde_json::from_str("3").unwrap();
        assert_eq!(state, SubscriptionState::Running);
        let payment: PaymentType = serde_json::from_str("2000").unwrap();
        assert_eq!(payment, PaymentType::DirectDebit);
        let unit: TimeUnit = serde_json::from_str(r#""month""#).unwrap();
        assert_eq!(unit, TimeUnit::Month);
    }

    #[test]
    fn rejects_unknown_tags() {
        assert!(serde_json::from_str::<MoveType>(r#""Refund""#).is_err());
        assert!(serde_json::from_str::<MoveType>("999").is_err());
        assert!(serde_json::from_str::<FeatureType>("-1").is_err());
        let err = "Paused".parse::<SubscriptionState>().unwrap_err();
        assert_eq!(err.kind, "SubscriptionState");
    }

    #[test]
    fn codes_and_names_map_back() {
        for v in MoveType::ALL {
            assert_eq!(MoveType::from_code(v.code()), Some(*v));
        }
        for v in SubscriptionState::ALL {
            assert_eq!(v.as_str().parse::<SubscriptionState>().unwrap(), *v);
        }
    }
}
