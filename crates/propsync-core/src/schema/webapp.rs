//! Built-in schema for the messaging client's account properties.

use crate::path::PropertyPath;
use crate::value::PropertyValue;

use super::descriptor::{PropertyDescriptor, ValueKind};

/// Who sees that a message was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptMode {
    Delivery = 0,
    DeliveryAndRead = 1,
}

impl ReceiptMode {
    pub const PATH: &'static str = "privacy.receipt_mode";

    pub fn to_value(self) -> PropertyValue {
        PropertyValue::from(self as i64)
    }

    pub fn from_value(value: &PropertyValue) -> Option<Self> {
        match value.as_i64()? {
            0 => Some(Self::Delivery),
            1 => Some(Self::DeliveryAndRead),
            _ => None,
        }
    }
}

/// Whether typing indicators are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingIndicatorMode {
    Off = 0,
    On = 1,
}

impl TypingIndicatorMode {
    pub const PATH: &'static str = "privacy.typing_indicator_mode";

    pub fn to_value(self) -> PropertyValue {
        PropertyValue::from(self as i64)
    }

    pub fn from_value(value: &PropertyValue) -> Option<Self> {
        match value.as_i64()? {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            _ => None,
        }
    }
}

/// The user's answer to the marketing consent prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentValue {
    NotGiven = 0,
    Given = 1,
}

impl ConsentValue {
    pub const PATH: &'static str = "privacy.marketing_consent";

    pub fn to_value(self) -> PropertyValue {
        PropertyValue::from(self as i64)
    }

    pub fn from_value(value: &PropertyValue) -> Option<Self> {
        match value.as_i64()? {
            0 => Some(Self::NotGiven),
            1 => Some(Self::Given),
            _ => None,
        }
    }
}

fn one_of(values: &[&str]) -> ValueKind {
    ValueKind::OneOf(values.iter().map(|v| PropertyValue::from(*v)).collect())
}

fn int_one_of(values: &[i64]) -> ValueKind {
    ValueKind::OneOf(values.iter().map(|v| PropertyValue::from(*v)).collect())
}

fn entry(raw: &str, descriptor: PropertyDescriptor) -> Option<(PropertyPath, PropertyDescriptor)> {
    PropertyPath::parse(raw).ok().map(|path| (path, descriptor))
}

pub(crate) fn builtin_entries() -> Vec<(PropertyPath, PropertyDescriptor)> {
    let bool_prop = || PropertyDescriptor::new(ValueKind::Bool);

    [
        entry(
            "settings.call.enable_soundless_incoming_calls",
            bool_prop().with_default(false),
        ),
        entry(
            "settings.call.enable_press_space_to_unmute",
            bool_prop().with_default(false),
        ),
        entry("settings.emoji.replace_inline", bool_prop().with_default(true)),
        entry(
            "settings.interface.theme",
            PropertyDescriptor::new(one_of(&["default", "dark"])).with_default("default"),
        ),
        entry(
            "settings.interface.view_folders",
            bool_prop().with_default(false),
        ),
        entry(
            "settings.interface.markdown_preview",
            bool_prop().with_default(true),
        ),
        entry(
            "settings.notifications",
            PropertyDescriptor::new(one_of(&["on", "obfuscate-message", "obfuscate", "none"]))
                .with_default("on"),
        ),
        entry("settings.previews.send", bool_prop().with_default(true)),
        // Unset until the user answers the consent prompt.
        entry("settings.privacy.improve_wire", bool_prop()),
        entry("settings.privacy.telemetry_sharing", bool_prop()),
        entry(
            "settings.sound.alerts",
            PropertyDescriptor::new(one_of(&["all", "some", "none"])).with_default("all"),
        ),
        entry(
            ReceiptMode::PATH,
            PropertyDescriptor::new(int_one_of(&[0, 1])).with_default(ReceiptMode::Delivery.to_value()),
        ),
        entry(
            ConsentValue::PATH,
            PropertyDescriptor::new(int_one_of(&[0, 1]))
                .with_default(ConsentValue::NotGiven.to_value()),
        ),
        entry(
            TypingIndicatorMode::PATH,
            PropertyDescriptor::new(int_one_of(&[0, 1]))
                .with_default(TypingIndicatorMode::On.to_value()),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
