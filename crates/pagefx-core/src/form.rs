//! Contact form submission feedback
//!
//! No request is made; the submit button walks through a sending and a sent
//! state before the form resets.

use std::time::Duration;

use tracing::debug;

use crate::dom::{ElementId, Page, Selector};
use crate::scheduler::{Scheduler, Task};

const SENDING_TEXT: &str = "Sending...";
const SENT_TEXT: &str = "Message Sent!";
const SEND_DELAY: Duration = Duration::from_millis(1000);
const RESTORE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Sending,
    Sent,
}

#[derive(Debug)]
pub struct ContactForm {
    form: ElementId,
    button: Option<ElementId>,
    original_text: String,
    phase: FormPhase,
}

impl ContactForm {
    /// Find `.contact-form` and its submit button
    pub fn discover(page: &dyn Page) -> Option<Self> {
        let form = page.query_one(&Selector::Class("contact-form"))?;
        let button = page
            .query_within(
                form,
                &Selector::AttrEquals {
                    tag: "button",
                    attr: "type",
                    value: "submit",
                },
            )
            .into_iter()
            .next();
        Some(Self {
            form,
            button,
            original_text: String::new(),
            phase: FormPhase::Idle,
        })
    }

    pub fn element(&self) -> ElementId {
        self.form
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Start the send sequence; ignored while one is already running
    pub fn submit(&mut self, page: &mut dyn Page, tasks: &mut Scheduler<Task>) {
        if self.phase != FormPhase::Idle {
            return;
        }
        if let Some(button) = self.button {
            self.original_text = page.text(button);
            page.set_text(button, SENDING_TEXT);
            page.set_attr(button, "disabled", "");
        }
        tasks.schedule(SEND_DELAY, Task::FormSent { form: self.form });
        self.phase = FormPhase::Sending;
        debug!("Contact form sending");
    }

    pub fn sent(&mut self, page: &mut dyn Page, tasks: &mut Scheduler<Task>) {
        if self.phase != FormPhase::Sending {
            return;
        }
        if let Some(button) = self.button {
            page.set_text(button, SENT_TEXT);
        }
        tasks.schedule(RESTORE_DELAY, Task::FormRestore { form: self.form });
        self.phase = FormPhase::Sent;
    }

    pub fn restore(&mut self, page: &mut dyn Page) {
        if self.phase != FormPhase::Sent {
            return;
        }
        if let Some(button) = self.button {
            page.set_text(button, &self.original_text);
            page.remove_attr(button, "disabled");
        }
        page.reset_form(self.form);
        self.phase = FormPhase::Idle;
        debug!("Contact form reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryPage, Mutation};

    #[test]
    fn test_submit_sequence() {
        let mut page = MemoryPage::new(800.0);
        let form = page.insert(ElementSpec::new("form").class("contact-form"), None);
        let button = page.insert(
            ElementSpec::new("button").attr("type", "submit").text("Send Message"),
            Some(form),
        );
        let mut contact = ContactForm::discover(&page).unwrap();
        let mut tasks = Scheduler::new();

        contact.submit(&mut page, &mut tasks);
        assert_eq!(page.text(button), "Sending...");
        assert!(page.attr(button, "disabled").is_some());

        // Double submit is ignored
        contact.submit(&mut page, &mut tasks);
        assert_eq!(tasks.pending(), 1);

        assert_eq!(tasks.advance(Duration::from_millis(1000)), vec![Task::FormSent { form }]);
        contact.sent(&mut page, &mut tasks);
        assert_eq!(page.text(button), "Message Sent!");

        assert!(tasks.advance(Duration::from_millis(2999)).is_empty());
        assert_eq!(tasks.advance(Duration::from_millis(3000)), vec![Task::FormRestore { form }]);
        contact.restore(&mut page);
        assert_eq!(page.text(button), "Send Message");
        assert_eq!(page.attr(button, "disabled"), None);
        assert!(page.mutations().contains(&Mutation::FormReset(form)));
        assert_eq!(contact.phase(), FormPhase::Idle);
    }

    #[test]
    fn test_missing_form() {
        let page = MemoryPage::new(800.0);
        assert!(ContactForm::discover(&page).is_none());
    }
}
