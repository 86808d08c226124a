//! Device platform services consumed by the view-models.
//!
//! The host implements these on top of whatever the phone offers (contacts
//! API, SMS sender, mail composer, toasts). Image capture is not modelled: it
//! only ever yields a local file reference, which the host feeds to the form.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Transient user-visible messages ("toasts").
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}

/// A `Notifier` that queues messages until the host drains them.
#[derive(Debug, Default)]
pub struct NoticeLog {
    messages: RefCell<Vec<String>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn drain(&self) -> Vec<String> {
        self.messages.borrow_mut().drain(..).collect()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// An address-book entry as the platform reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Result reported by the SMS sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsStatus {
    Sent,
    NotSent,
}

/// A pre-filled mail composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub html: String,
}

pub trait DeviceServices {
    /// Every contact on the device. Fails with `PermissionDenied` when the
    /// user refuses access.
    fn contacts(&self) -> Result<Vec<Contact>, PlatformError>;

    fn sms_available(&self) -> bool;

    fn send_sms(&self, recipients: &[String], body: &str) -> Result<SmsStatus, PlatformError>;

    /// Open the mail composer pre-filled with `draft`.
    fn compose_email(&self, draft: &EmailDraft) -> Result<(), PlatformError>;
}

impl<D: DeviceServices + ?Sized> DeviceServices for &D {
    fn contacts(&self) -> Result<Vec<Contact>, PlatformError> {
        (**self).contacts()
    }

    fn sms_available(&self) -> bool {
        (**self).sms_available()
    }

    fn send_sms(&self, recipients: &[String], body: &str) -> Result<SmsStatus, PlatformError> {
        (**self).send_sms(recipients, body)
    }

    fn compose_email(&self, draft: &EmailDraft) -> Result<(), PlatformError> {
        (**self).compose_email(draft)
    }
}
