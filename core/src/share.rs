//! Sharing a todo with a contact over SMS or email.
//!
//! Two steps: `open_channel` fetches the todo and the contact list the user
//! picks from, `send_to` dispatches to the picked contact. Picking a contact
//! that has no destination for the channel is a silent no-op.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{PlatformError, ShareError};
use crate::message::{email_body, email_html, sms_body, EMAIL_SUBJECT};
use crate::platform::{Contact, DeviceServices, EmailDraft, Notifier, SmsStatus};
use crate::store::RemoteStore;
use crate::types::TodoItem;

/// Most contacts offered for selection.
pub const CONTACT_LIMIT: usize = 50;

pub const SHARE_FAILED: &str = "Failed to share todo to contacts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Sms,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The dispatcher accepted the message.
    Sent,
    /// The contact has no phone number (SMS) or address (email).
    Skipped,
}

struct PendingShare {
    todo: TodoItem,
    channel: Channel,
    contacts: Vec<Contact>,
}

pub struct ShareFlow<S, D, N> {
    store: S,
    device: D,
    notifier: N,
    pending: Option<PendingShare>,
}

impl<S: RemoteStore, D: DeviceServices, N: Notifier> ShareFlow<S, D, N> {
    pub fn new(store: S, device: D, notifier: N) -> Self {
        Self {
            store,
            device,
            notifier,
            pending: None,
        }
    }

    /// Resolve the todo and return the contacts to choose from: those with
    /// at least one phone number, capped at `CONTACT_LIMIT`.
    pub fn open_channel(&mut self, todo_id: Uuid, channel: Channel) -> Result<&[Contact], ShareError> {
        self.pending = None;
        let todo = self.store.get_by_id(todo_id).map_err(|err| {
            warn!(%todo_id, error = %err, "cannot share: todo fetch failed");
            self.notifier.notify(SHARE_FAILED);
            ShareError::from(err)
        })?;
        let contacts = self.device.contacts().map_err(|err| {
            warn!(%todo_id, error = %err, "cannot share: contacts unavailable");
            self.notifier.notify(SHARE_FAILED);
            match err {
                PlatformError::PermissionDenied => ShareError::PermissionDenied,
                other => ShareError::Dispatch(other.to_string()),
            }
        })?;
        let contacts: Vec<Contact> = contacts
            .into_iter()
            .filter(|c| !c.phone_numbers.is_empty())
            .take(CONTACT_LIMIT)
            .collect();
        debug!(%todo_id, ?channel, offered = contacts.len(), "share channel opened");

        let pending = self.pending.insert(PendingShare {
            todo,
            channel,
            contacts,
        });
        Ok(&pending.contacts)
    }

    /// Contacts offered by the open share, empty when none is open.
    pub fn contacts(&self) -> &[Contact] {
        self.pending.as_ref().map(|p| p.contacts.as_slice()).unwrap_or(&[])
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Dismiss the contact picker without sending.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Send the todo to `contact` over the open channel. Closes the share
    /// whatever the result.
    pub fn send_to(&mut self, contact: &Contact) -> Result<ShareOutcome, ShareError> {
        let pending = self.pending.take().ok_or(ShareError::NotOpen)?;
        match pending.channel {
            Channel::Sms => self.send_sms(&pending.todo, contact),
            Channel::Email => self.send_email(&pending.todo, contact),
        }
    }

    fn send_sms(&self, todo: &TodoItem, contact: &Contact) -> Result<ShareOutcome, ShareError> {
        let Some(number) = contact.phone_numbers.first() else {
            debug!(contact = %contact.name, "no phone number; nothing sent");
            return Ok(ShareOutcome::Skipped);
        };
        if !self.device.sms_available() {
            warn!("SMS is not available on this device");
            return Err(ShareError::ChannelUnavailable("sms"));
        }
        match self.device.send_sms(std::slice::from_ref(number), &sms_body(todo)) {
            Ok(SmsStatus::Sent) => {
                info!(id = %todo.id, "todo shared by SMS");
                Ok(ShareOutcome::Sent)
            }
            Ok(SmsStatus::NotSent) => {
                warn!(id = %todo.id, "SMS was not sent");
                Err(ShareError::Dispatch("Failed to send SMS".to_string()))
            }
            Err(PlatformError::SmsUnavailable) => Err(ShareError::ChannelUnavailable("sms")),
            Err(err) => {
                warn!(id = %todo.id, error = %err, "SMS dispatch failed");
                Err(ShareError::Dispatch(err.to_string()))
            }
        }
    }

    fn send_email(&self, todo: &TodoItem, contact: &Contact) -> Result<ShareOutcome, ShareError> {
        let Some(address) = contact.emails.first() else {
            debug!(contact = %contact.name, "no email address; nothing sent");
            return Ok(ShareOutcome::Skipped);
        };
        let draft = EmailDraft {
            to: address.clone(),
            subject: EMAIL_SUBJECT.to_string(),
            body: email_body(todo),
            html: email_html(todo),
        };
        self.device.compose_email(&draft).map_err(|err| {
            warn!(id = %todo.id, error = %err, "mail composer failed");
            ShareError::Dispatch(err.to_string())
        })?;
        info!(id = %todo.id, "todo shared by email");
        Ok(ShareOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::memory::MemoryStore;
    use crate::platform::NoticeLog;

    #[derive(Default)]
    struct FakeDevice {
        contacts: Vec<Contact>,
        denied: bool,
        no_sms: bool,
        sms: RefCell<Vec<(Vec<String>, String)>>,
        mails: RefCell<Vec<EmailDraft>>,
    }

    impl DeviceServices for FakeDevice {
        fn contacts(&self) -> Result<Vec<Contact>, PlatformError> {
            if self.denied {
                return Err(PlatformError::PermissionDenied);
            }
            Ok(self.contacts.clone())
        }

        fn sms_available(&self) -> bool {
            !self.no_sms
        }

        fn send_sms(&self, recipients: &[String], body: &str) -> Result<SmsStatus, PlatformError> {
            self.sms.borrow_mut().push((recipients.to_vec(), body.to_string()));
            Ok(SmsStatus::Sent)
        }

        fn compose_email(&self, draft: &EmailDraft) -> Result<(), PlatformError> {
            self.mails.borrow_mut().push(draft.clone());
            Ok(())
        }
    }

    fn contact(name: &str, phones: &[&str], emails: &[&str]) -> Contact {
        Contact {
            name: name.to_string(),
            phone_numbers: phones.iter().map(|s| s.to_string()).collect(),
            emails: emails.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn store_with_todo() -> (MemoryStore, Uuid) {
        let todo = TodoItem {
            id: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            description: None,
            is_completed: false,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            image_uri: None,
            location: None,
        };
        let id = todo.id;
        (MemoryStore::with_todos(vec![todo]), id)
    }

    #[test]
    fn contacts_without_phone_are_not_offered() {
        let (store, id) = store_with_todo();
        let device = FakeDevice {
            contacts: vec![contact("Ana", &["+1"], &[]), contact("Bo", &[], &["bo@x.io"])],
            ..FakeDevice::default()
        };
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);

        let offered = flow.open_channel(id, Channel::Sms).unwrap();
        assert_eq!(offered.len(), 1);
        assert_eq!(offered[0].name, "Ana");
    }

    #[test]
    fn contact_list_is_capped() {
        let (store, id) = store_with_todo();
        let device = FakeDevice {
            contacts: (0..80).map(|i| contact(&format!("c{i}"), &["+1"], &[])).collect(),
            ..FakeDevice::default()
        };
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);
        assert_eq!(flow.open_channel(id, Channel::Sms).unwrap().len(), CONTACT_LIMIT);
    }

    #[test]
    fn sms_goes_to_first_number() {
        let (store, id) = store_with_todo();
        let device = FakeDevice::default();
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);
        flow.open_channel(id, Channel::Sms).unwrap();

        let outcome = flow.send_to(&contact("Ana", &["+1", "+2"], &[])).unwrap();
        assert_eq!(outcome, ShareOutcome::Sent);
        let sent = device.sms.borrow();
        assert_eq!(sent[0].0, ["+1"]);
        assert!(sent[0].1.starts_with("Title: Buy milk"));
        assert!(!flow.is_open());
    }

    #[test]
    fn sms_to_contact_without_number_is_noop() {
        let (store, id) = store_with_todo();
        let device = FakeDevice::default();
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);
        flow.open_channel(id, Channel::Sms).unwrap();

        let outcome = flow.send_to(&contact("Bo", &[], &["bo@x.io"])).unwrap();
        assert_eq!(outcome, ShareOutcome::Skipped);
        assert!(device.sms.borrow().is_empty());
    }

    #[test]
    fn email_to_contact_without_address_is_noop() {
        let (store, id) = store_with_todo();
        let device = FakeDevice::default();
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);
        flow.open_channel(id, Channel::Email).unwrap();

        let outcome = flow.send_to(&contact("Ana", &["+1"], &[])).unwrap();
        assert_eq!(outcome, ShareOutcome::Skipped);
        assert!(device.mails.borrow().is_empty());
    }

    #[test]
    fn email_opens_composer_with_rendered_todo() {
        let (store, id) = store_with_todo();
        let device = FakeDevice::default();
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);
        flow.open_channel(id, Channel::Email).unwrap();

        flow.send_to(&contact("Ana", &["+1"], &["ana@x.io", "other@x.io"])).unwrap();
        let mails = device.mails.borrow();
        assert_eq!(mails[0].to, "ana@x.io");
        assert_eq!(mails[0].subject, EMAIL_SUBJECT);
        assert!(mails[0].body.contains("Completed: No"));
    }

    #[test]
    fn sms_unavailable_is_rejected() {
        let (store, id) = store_with_todo();
        let device = FakeDevice {
            no_sms: true,
            ..FakeDevice::default()
        };
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);
        flow.open_channel(id, Channel::Sms).unwrap();

        let err = flow.send_to(&contact("Ana", &["+1"], &[])).unwrap_err();
        assert!(matches!(err, ShareError::ChannelUnavailable("sms")));
    }

    #[test]
    fn permission_denied_notifies() {
        let (store, id) = store_with_todo();
        let device = FakeDevice {
            denied: true,
            ..FakeDevice::default()
        };
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);

        let err = flow.open_channel(id, Channel::Sms).unwrap_err();
        assert!(matches!(err, ShareError::PermissionDenied));
        assert_eq!(notices.messages(), [SHARE_FAILED]);
        assert!(!flow.is_open());
    }

    #[test]
    fn send_without_open_is_rejected() {
        let (store, _) = store_with_todo();
        let device = FakeDevice::default();
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);
        let err = flow.send_to(&contact("Ana", &["+1"], &[])).unwrap_err();
        assert!(matches!(err, ShareError::NotOpen));
    }

    #[test]
    fn unknown_todo_cannot_be_shared() {
        let store = MemoryStore::new();
        let device = FakeDevice::default();
        let notices = NoticeLog::new();
        let mut flow = ShareFlow::new(&store, &device, &notices);
        let err = flow.open_channel(Uuid::nil(), Channel::Email).unwrap_err();
        assert!(matches!(err, ShareError::Remote(_)));
    }
}
