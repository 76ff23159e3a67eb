// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification events and the emails they render to.

use casebook_config::CasebookConfig;
use casebook_core::OutboundEmail;

/// Something the desk wants a person to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A customer opened a case; they receive a link to its chat.
    CaseCreated {
        to: String,
        customer_first_name: String,
        title: String,
        first_message: String,
        chat_token: String,
    },
    /// An admin invited a new agent; they receive a registration link.
    UserInvited {
        /// Invitations without an email address are not sent.
        to: Option<String>,
        user_name: String,
        register_token: String,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::CaseCreated { .. } => "case_created",
            NotificationEvent::UserInvited { .. } => "user_invited",
        }
    }

    /// Render the email for this event, or `None` when there is no recipient.
    pub fn render(&self, templates: &Templates) -> Option<OutboundEmail> {
        match self {
            NotificationEvent::CaseCreated {
                to,
                customer_first_name,
                title,
                first_message,
                chat_token,
            } => {
                let link = templates.chat_link(chat_token);
                let html_body = format!(
                    "Dear {name},<br><br>\
                     Thank you for contacting us about:<br><br>\
                     {title}<br>\
                     {message}<br><br>\
                     Follow this link to view your case chat:<br>\
                     <a href=\"{link}\">{link}</a><br><br>\
                     We will review your case and respond as soon as possible.<br><br>\
                     Best regards,<br>{signature}",
                    name = match customer_first_name.trim() {
                        "" => "customer".to_string(),
                        name => escape_html(name),
                    },
                    title = escape_html(title),
                    message = escape_html(first_message),
                    signature = escape_html(&templates.signature),
                );
                Some(OutboundEmail {
                    to: to.clone(),
                    subject: format!("Case Created: {title}"),
                    html_body,
                })
            }
            NotificationEvent::UserInvited {
                to,
                user_name,
                register_token,
            } => {
                let to = to.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
                let link = templates.register_link(register_token);
                let html_body = format!(
                    "Hello {name},<br><br>\
                     Welcome! To complete your registration, click the link below:<br>\
                     <a href=\"{link}\">{link}</a><br><br>\
                     Regards,<br>{signature}",
                    name = escape_html(user_name),
                    signature = escape_html(&templates.signature),
                );
                Some(OutboundEmail {
                    to: to.to_string(),
                    subject: "Complete Your Registration".to_string(),
                    html_body,
                })
            }
        }
    }
}

/// Link prefixes and signature used when rendering emails.
#[derive(Debug, Clone)]
pub struct Templates {
    pub customer_base_url: String,
    pub backoffice_base_url: String,
    pub signature: String,
}

impl Templates {
    pub fn from_config(config: &CasebookConfig) -> Self {
        Self {
            customer_base_url: config.links.customer_base_url.clone(),
            backoffice_base_url: config.links.backoffice_base_url.clone(),
            signature: config.service.name.clone(),
        }
    }

    pub fn chat_link(&self, chat_token: &str) -> String {
        format!(
            "{}/chat-page/{chat_token}",
            self.customer_base_url.trim_end_matches('/')
        )
    }

    pub fn register_link(&self, register_token: &str) -> String {
        format!(
            "{}/register/{register_token}",
            self.backoffice_base_url.trim_end_matches('/')
        )
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
