//! Typed catalogue of the events the POS backend broadcasts.
//!
//! The backend is loose about payloads: ids arrive as numbers, numeric
//! strings, or `null`, and several events are emitted with no argument at
//! all. Decoding here is lenient about both so a client never drops a
//! notification over a cosmetic difference. Events we do not model are kept
//! as [`ServerEvent::Other`].

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::CodecError;
use crate::packet::{SocketPacket, SocketPacketKind};

pub const TABLE_UPDATE: &str = "table-update";
pub const ORDER_UPDATE: &str = "order-update";
pub const ORDER_READY: &str = "order-ready";
pub const NEW_ORDER: &str = "new-order";
pub const NEW_NOTIFICATION: &str = "new-notification";
pub const CALL_BILL: &str = "call-bill";
pub const NEW_LINE_ORDER: &str = "new-line-order";
pub const LINE_ORDER_UPDATE: &str = "line-order-update";
pub const NEW_DELIVERY_ORDER: &str = "new-delivery-order";
pub const DELIVERY_ORDER_UPDATE: &str = "delivery-order-update";
pub const KITCHEN_UPDATE: &str = "kitchen-update";

/// Payload of `table-update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableUpdate {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl TableUpdate {
    /// The backend's "something changed, refetch everything" form.
    #[must_use]
    pub fn is_refresh(&self) -> bool {
        self.id.is_none() || self.status.as_deref() == Some("refresh")
    }
}

/// Payload of `order-ready`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReady {
    #[serde(default, deserialize_with = "lenient_id")]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub table_name: Option<String>,
}

/// Payload of `call-bill`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallBill {
    #[serde(default)]
    pub table_name: String,
}

/// Payload of `new-line-order`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineOrder {
    #[serde(default, deserialize_with = "lenient_id")]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub deposit_amount: Option<f64>,
}

/// Payload of `line-order-update` and `delivery-order-update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    #[serde(default, deserialize_with = "lenient_id")]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A decoded server broadcast.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    TableUpdate(TableUpdate),
    OrderUpdate,
    OrderReady(OrderReady),
    NewOrder(Value),
    NewNotification(Value),
    CallBill(CallBill),
    NewLineOrder(LineOrder),
    LineOrderUpdate(OrderStatus),
    NewDeliveryOrder(Value),
    DeliveryOrderUpdate(OrderStatus),
    KitchenUpdate,
    /// Any event not listed above, passed through untouched.
    Other { name: String, data: Value },
}

impl ServerEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::TableUpdate(_) => TABLE_UPDATE,
            Self::OrderUpdate => ORDER_UPDATE,
            Self::OrderReady(_) => ORDER_READY,
            Self::NewOrder(_) => NEW_ORDER,
            Self::NewNotification(_) => NEW_NOTIFICATION,
            Self::CallBill(_) => CALL_BILL,
            Self::NewLineOrder(_) => NEW_LINE_ORDER,
            Self::LineOrderUpdate(_) => LINE_ORDER_UPDATE,
            Self::NewDeliveryOrder(_) => NEW_DELIVERY_ORDER,
            Self::DeliveryOrderUpdate(_) => DELIVERY_ORDER_UPDATE,
            Self::KitchenUpdate => KITCHEN_UPDATE,
            Self::Other { name, .. } => name,
        }
    }

    /// Whether a floor-plan view should reload its layout on this event.
    #[must_use]
    pub fn affects_floor_plan(&self) -> bool {
        matches!(self, Self::TableUpdate(_) | Self::OrderUpdate)
    }

    /// Decode from an event name and its first argument (`Null` if none).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Payload`] if a known event carries a payload of
    /// the wrong shape.
    pub fn from_parts(name: &str, data: Value) -> Result<Self, CodecError> {
        Ok(match name {
            TABLE_UPDATE => Self::TableUpdate(payload(name, data)?),
            ORDER_UPDATE => Self::OrderUpdate,
            ORDER_READY => Self::OrderReady(payload(name, data)?),
            NEW_ORDER => Self::NewOrder(data),
            NEW_NOTIFICATION => Self::NewNotification(data),
            CALL_BILL => Self::CallBill(payload(name, data)?),
            NEW_LINE_ORDER => Self::NewLineOrder(payload(name, data)?),
            LINE_ORDER_UPDATE => Self::LineOrderUpdate(payload(name, data)?),
            NEW_DELIVERY_ORDER => Self::NewDeliveryOrder(data),
            DELIVERY_ORDER_UPDATE => Self::DeliveryOrderUpdate(payload(name, data)?),
            KITCHEN_UPDATE => Self::KitchenUpdate,
            _ => Self::Other { name: name.to_owned(), data },
        })
    }

    /// Decode a Socket.IO packet. Returns `Ok(None)` for non-event packets.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedEvent`] for an event without a name and
    /// [`CodecError::Payload`] for a known event with a bad payload.
    pub fn from_packet(packet: &SocketPacket) -> Result<Option<Self>, CodecError> {
        if packet.kind != SocketPacketKind::Event {
            return Ok(None);
        }
        let (name, args) = packet.event_parts()?;
        let data = args.first().cloned().unwrap_or(Value::Null);
        Self::from_parts(name, data).map(Some)
    }

    /// Encode as a Socket.IO event packet on the default namespace.
    #[must_use]
    pub fn to_packet(&self) -> SocketPacket {
        let data = match self {
            Self::TableUpdate(p) => to_value(p),
            Self::OrderReady(p) => to_value(p),
            Self::CallBill(p) => to_value(p),
            Self::NewLineOrder(p) => to_value(p),
            Self::LineOrderUpdate(p) | Self::DeliveryOrderUpdate(p) => to_value(p),
            Self::NewOrder(v) | Self::NewNotification(v) | Self::NewDeliveryOrder(v) => Some(v.clone()),
            Self::Other { data, .. } => Some(data.clone()),
            Self::OrderUpdate | Self::KitchenUpdate => None,
        };
        SocketPacket::event(self.name(), data.into_iter().collect())
    }
}

/// Deserialize a payload struct, treating a missing argument as `{}`.
fn payload<T: DeserializeOwned>(name: &str, data: Value) -> Result<T, CodecError> {
    let data = if data.is_null() { Value::Object(Map::new()) } else { data };
    serde_json::from_value(data).map_err(|source| CodecError::Payload { event: name.to_owned(), source })
}

fn to_value<T: Serialize>(payload: &T) -> Option<Value> {
    serde_json::to_value(payload).ok()
}

/// Accept an id as a number, a numeric string, or `null`.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
