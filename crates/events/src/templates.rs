//! Notification templates.
//!
//! Each template renders to a subject line and an HTML body. Every value that
//! came from a client is HTML-escaped before interpolation.

use std::fmt;

use html_escape::{encode_double_quoted_attribute, encode_text};

use staffpurchase_core::lifecycle::ResponseAction;
use staffpurchase_core::roles::Role;
use staffpurchase_core::types::Timestamp;
use staffpurchase_db::models::purchase_request::PurchaseRequest;
use staffpurchase_db::models::staff::StaffAccount;

/// Portal name used in subjects and the page header.
const PORTAL_NAME: &str = "Huntsman Optics";

const DATE_FORMAT: &str = "%d/%m/%Y";

/// The notification kinds the workflow sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Designated recipient, carries the confirm/reject links.
    PurchaseRequest,
    /// Daily reminder for a still-pending request, same links.
    Reminder,
    /// Public submitter receipt.
    PurchaseRequestConfirmation,
    /// Administrative sender, after a token is redeemed.
    ResponseNotification,
    /// Administrator alert for a pending registration.
    NewRegistrationAdmin,
    /// The newly registered identity.
    RegistrationReceivedUser,
    /// The identity whose role changed.
    RoleUpdated,
}

impl Template {
    pub const fn as_str(self) -> &'static str {
        match self {
            Template::PurchaseRequest => "purchaseRequest",
            Template::Reminder => "reminder",
            Template::PurchaseRequestConfirmation => "purchaseRequestConfirmation",
            Template::ResponseNotification => "responseNotification",
            Template::NewRegistrationAdmin => "newRegistrationAdmin",
            Template::RegistrationReceivedUser => "registrationReceivedUser",
            Template::RoleUpdated => "roleUpdated",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully rendered email ready for a [`Mailer`](crate::delivery::email::Mailer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub to: String,
    pub template: Template,
    pub subject: String,
    pub html: String,
}

/// Renders templates against the public base URL of the frontend.
#[derive(Debug, Clone)]
pub struct Templates {
    base_url: String,
}

impl Templates {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/respond/{token}?action={action}`.
    pub fn response_link(&self, token: &str, action: ResponseAction) -> String {
        format!("{}/respond/{token}?action={action}", self.base_url)
    }

    pub fn purchase_request(&self, to: &str, request: &PurchaseRequest) -> RenderedEmail {
        RenderedEmail {
            to: to.to_string(),
            template: Template::PurchaseRequest,
            subject: format!(
                "New Staff Purchase Request - {} ({})",
                request.employee_name, request.store_name
            ),
            html: self.actionable_body(request, false),
        }
    }

    pub fn reminder(&self, to: &str, request: &PurchaseRequest) -> RenderedEmail {
        RenderedEmail {
            to: to.to_string(),
            template: Template::Reminder,
            subject: format!(
                "REMINDER: Action Required - Staff Purchase Request - {}",
                request.employee_name
            ),
            html: self.actionable_body(request, true),
        }
    }

    pub fn purchase_request_confirmation(
        &self,
        to: &str,
        request: &PurchaseRequest,
    ) -> RenderedEmail {
        let summary = details_table(&[
            ("Store", Some(request.store_name.as_str())),
            ("Product", Some(request.product_model.as_str())),
            ("Date", Some(format_date(request.created_at).as_str())),
        ]);
        let body = format!(
            "<p><strong>Status: Under Review</strong></p>\
             <h2>Thank you for your submission</h2>\
             <p>Hello <strong>{name}</strong>,</p>\
             <p>We have received your staff purchase request. Our administration team is \
             currently reviewing the details. You will be notified once the request has \
             been processed.</p>\
             {summary}\
             <p>This is an automated confirmation of your request receipt. No further \
             action is required at this time.</p>",
            name = encode_text(&request.employee_name),
        );
        RenderedEmail {
            to: to.to_string(),
            template: Template::PurchaseRequestConfirmation,
            subject: format!("Purchase Request Received - {PORTAL_NAME}"),
            html: page(&body),
        }
    }

    pub fn response_notification(
        &self,
        to: &str,
        request: &PurchaseRequest,
        action: ResponseAction,
        note: &str,
    ) -> RenderedEmail {
        let prefix = match action {
            ResponseAction::Confirm => "CONFIRMED",
            ResponseAction::Reject => "REJECTED",
            _ => "UPDATE",
        };
        let detail = if note.is_empty() {
            let text = match action {
                ResponseAction::Confirm => {
                    "The staff member has confirmed the details and accepted the Sight App terms."
                }
                ResponseAction::Reject => "The staff member has rejected the request.",
                _ => "The staff member has updated the request status.",
            };
            format!("<p><strong>Action Detail:</strong></p><p>{text}</p>")
        } else {
            format!(
                "<p><strong>Staff Comments</strong></p><blockquote>\"{}\"</blockquote>",
                encode_text(note)
            )
        };
        let responded = request.response_timestamp.unwrap_or(request.updated_at);
        let body = format!(
            "<p><strong>Status: {status}</strong></p>\
             <h2>Response Received</h2>\
             <p>Staff member <strong>{employee}</strong> has responded to the purchase request.</p>\
             <p><strong>Time:</strong> {time}</p>\
             {details}\
             {detail}\
             <p>Login to your Admin Dashboard to view full history and manage responses.</p>\
             <p><a href=\"{dashboard}\">Open Dashboard</a></p>",
            status = request.status,
            employee = encode_text(&request.employee_name),
            time = responded.format("%d %B %Y %H:%M UTC"),
            details = request_details(request, false),
            dashboard = encode_double_quoted_attribute(&format!("{}/dashboard", self.base_url)),
        );
        RenderedEmail {
            to: to.to_string(),
            template: Template::ResponseNotification,
            subject: format!(
                "{prefix}: Purchase Request - {} ({})",
                request.employee_name, request.store_name
            ),
            html: page(&body),
        }
    }

    pub fn new_registration_admin(
        &self,
        to: &str,
        account: &StaffAccount,
        at: Timestamp,
    ) -> RenderedEmail {
        let body = format!(
            "<h2>Action Required: Approve User</h2>\
             <p>A new staff member has registered for the portal and is waiting for role \
             assignment.</p>\
             {details}\
             <p><a href=\"{link}\">Manage Access Policies</a></p>",
            details = details_table(&[
                ("Name", Some(account.name.as_str())),
                ("Email", Some(account.email.as_str())),
                ("Time", Some(at.format("%d/%m/%Y %H:%M UTC").to_string().as_str())),
            ]),
            link = encode_double_quoted_attribute(&format!("{}/dashboard/staff", self.base_url)),
        );
        RenderedEmail {
            to: to.to_string(),
            template: Template::NewRegistrationAdmin,
            subject: "ALERT: New User Registration Pending Approval".to_string(),
            html: page(&body),
        }
    }

    pub fn registration_received_user(&self, to: &str, account: &StaffAccount) -> RenderedEmail {
        let greeting = if account.name.is_empty() {
            &account.email
        } else {
            &account.name
        };
        let body = format!(
            "<p><strong>Registration Received</strong></p>\
             <h2>We've received your request</h2>\
             <p>Hello <strong>{name}</strong>,</p>\
             <p>Your account has been successfully created and is now <strong>Pending \
             Approval</strong> by our administration team. You will receive another email \
             once your access has been granted.</p>",
            name = encode_text(greeting),
        );
        RenderedEmail {
            to: to.to_string(),
            template: Template::RegistrationReceivedUser,
            subject: format!("Registration Received - {PORTAL_NAME}"),
            html: page(&body),
        }
    }

    pub fn role_updated(
        &self,
        to: &str,
        user_name: &str,
        old_role: Role,
        new_role: Role,
        changed_by: &str,
    ) -> RenderedEmail {
        let title = new_role.title();
        let role = encode_text(&title);
        let sender = encode_text(changed_by);
        let (badge, heading, text) = if old_role == Role::Pending {
            (
                "Access Granted",
                "Welcome to the Portal",
                format!(
                    "Your registration has been approved by <strong>{sender}</strong>. You now \
                     have <strong>{role}</strong> access to the {PORTAL_NAME} Staff Portal."
                ),
            )
        } else {
            (
                "Role Updated",
                "Your Role has Changed",
                format!(
                    "Your access policy has been updated by <strong>{sender}</strong>. Your new \
                     role is <strong>{role}</strong>."
                ),
            )
        };
        let name = if user_name.is_empty() {
            "Team Member"
        } else {
            user_name
        };
        let body = format!(
            "<p><strong>{badge}</strong></p>\
             <h2>{heading}</h2>\
             <p>Hello <strong>{name}</strong>,</p>\
             <p>{text}</p>\
             <p>You can now log in and access the features assigned to your new role.</p>\
             <p><a href=\"{link}\">Go to Dashboard</a></p>",
            name = encode_text(name),
            link = encode_double_quoted_attribute(&format!("{}/dashboard", self.base_url)),
        );
        RenderedEmail {
            to: to.to_string(),
            template: Template::RoleUpdated,
            subject: format!("Access Policy Updated - {PORTAL_NAME}"),
            html: page(&body),
        }
    }

    fn actionable_body(&self, request: &PurchaseRequest, is_reminder: bool) -> String {
        let banner = if is_reminder {
            "<p><strong>Action Required: Reminder Notification</strong></p>"
        } else {
            ""
        };
        let confirm = self.response_link(&request.response_token, ResponseAction::Confirm);
        let reject = self.response_link(&request.response_token, ResponseAction::Reject);
        let body = format!(
            "{banner}\
             {details}\
             <h4>CONFIRMATION &amp; ACCEPTANCE</h4>\
             <p>By submitting this form, I confirm that:</p>\
             <ul>\
             <li>I agree to register for the Sight App using the same email address provided above.</li>\
             <li>I acknowledge that the device must remain in my possession for a minimum period of 14 months.</li>\
             <li>I request confirmation of receipt within 30 days.</li>\
             </ul>\
             <p><strong>Please confirm your details to proceed:</strong></p>\
             <p><a href=\"{confirm}\">I Confirm &amp; Agree</a></p>\
             <p><a href=\"{reject}\">Wrong details? Reject Request</a></p>\
             <p>Clicking Confirm records your legally binding acceptance of the terms mentioned above.</p>",
            details = request_details(request, true),
            confirm = encode_double_quoted_attribute(&confirm),
            reject = encode_double_quoted_attribute(&reject),
        );
        page(&body)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn format_date(at: Timestamp) -> String {
    at.format(DATE_FORMAT).to_string()
}

fn request_details(request: &PurchaseRequest, with_contacts: bool) -> String {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let contacts = |s: &str| if with_contacts { non_empty(s) } else { None };

    let rows = [
        ("Store Name", Some(request.store_name.clone())),
        ("Employee", Some(request.employee_name.clone())),
        ("Contact Email", contacts(&request.public_email)),
        ("Sight App Email", contacts(&request.email)),
        ("Product Model", Some(request.product_model.clone())),
        ("Discount", Some(request.discount.clone())),
        ("Serial Number", non_empty(&request.serial_number)),
        ("FOB", non_empty(&request.fob)),
        ("Rebate", non_empty(&request.rebate)),
        ("Order Date", Some(format_date(request.order_date))),
        ("Invoice Date", Some(format_date(request.invoice_date))),
    ];
    let borrowed: Vec<(&str, Option<&str>)> = rows
        .iter()
        .map(|(label, value)| (*label, value.as_deref()))
        .collect();
    format!("<h3>Request Details</h3>{}", details_table(&borrowed))
}

/// Two-column table; rows with `None` are omitted.
fn details_table(rows: &[(&str, Option<&str>)]) -> String {
    let mut out = String::from("<table>");
    for (label, value) in rows {
        if let Some(value) = value {
            out.push_str(&format!(
                "<tr><td>{label}</td><td><strong>{}</strong></td></tr>",
                encode_text(value)
            ));
        }
    }
    out.push_str("</table>");
    out
}

fn page(body: &str) -> String {
    format!(
        "<html><body>\
         <div style=\"max-width: 600px; margin: 0 auto; font-family: sans-serif;\">\
         <h2>Staff Purchase Request</h2>\
         {body}\
         <p style=\"font-size: 11px; color: #94a3b8;\">{PORTAL_NAME} Secure Portal</p>\
         </div></body></html>"
    )
}
