//! Emergency contacts

use serde::{Deserialize, Serialize};

/// What kind of responder a contact reaches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    /// Public emergency services
    Emergency,
    /// School security office
    Security,
    /// School nurse
    Medical,
    /// Campus emergency line
    Campus,
}

/// A named phone contact alerted on dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Display name
    pub name: String,
    /// Number as displayed, possibly formatted
    pub number: String,
    /// Responder kind
    pub kind: ContactKind,
}

impl Contact {
    /// Creates a contact
    pub fn new(name: &str, number: &str, kind: ContactKind) -> Self {
        Self {
            name: name.to_owned(),
            number: number.to_owned(),
            kind,
        }
    }

    /// The number stripped down to its digits, ready to dial
    pub fn dial_digits(&self) -> String {
        dial_digits(&self.number)
    }
}

/// Strips every non-digit character from a phone number
pub fn dial_digits(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}

/// The fixed list of contacts alerted by the controller
pub fn standard() -> Vec<Contact> {
    vec![
        Contact::new("Emergency Services", "911", ContactKind::Emergency),
        Contact::new("School Security", "(555) 123-0001", ContactKind::Security),
        Contact::new("School Nurse", "(555) 123-0002", ContactKind::Medical),
        Contact::new("Campus Emergency", "(555) 123-0003", ContactKind::Campus),
    ]
}
